//! Command results, printed as text or JSON

use std::fmt;

use metron_core::{Measurement, UnitDefinition};
use serde::Serialize;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Output {
    Conversion(ConversionReport),
    Parse {
        canonical: String,
        resolved: String,
        factor: String,
        dimensions_cancel: bool,
    },
    Dimensions(DimensionsReport),
    Estimate {
        measurement: Measurement,
        estimate: Option<String>,
    },
    Categories { categories: Vec<CategoryReport> },
    Units { units: Vec<UnitReport> },
}

#[derive(Serialize)]
pub struct ConversionReport {
    pub input: Measurement,
    pub results: Vec<Measurement>,
}

#[derive(Serialize)]
pub struct DimensionsReport {
    pub units: String,
    pub dimensions: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct CategoryReport {
    pub id: String,
    pub base_unit: String,
    pub dimensions: String,
}

#[derive(Serialize)]
pub struct UnitReport {
    pub name: String,
    pub plural: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl From<&UnitDefinition> for UnitReport {
    fn from(def: &UnitDefinition) -> Self {
        Self {
            name: def.name.clone(),
            plural: def.plural.clone(),
            abbreviation: def.abbreviation.clone(),
            aliases: def.aliases.clone(),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Conversion(report) => {
                let parts: Vec<String> = report.results.iter().map(|m| m.to_string()).collect();
                writeln!(f, "{} = {}", report.input, parts.join(" + "))
            }
            Output::Parse {
                canonical,
                resolved,
                factor,
                dimensions_cancel,
            } => {
                writeln!(f, "{canonical}")?;
                if resolved != canonical || factor != "1" {
                    writeln!(f, "resolved: {factor} {resolved}")?;
                }
                if *dimensions_cancel {
                    writeln!(f, "note: dimensions cancel")?;
                }
                Ok(())
            }
            Output::Dimensions(report) => {
                write!(f, "{}: {}", report.units, report.dimensions)?;
                match &report.category {
                    Some(category) => writeln!(f, " ({category})"),
                    None => writeln!(f),
                }
            }
            Output::Estimate {
                measurement,
                estimate,
            } => match estimate {
                Some(text) => writeln!(f, "{measurement} is {text}"),
                None => writeln!(f, "No estimates are available for {}", measurement.units()),
            },
            Output::Categories { categories } => {
                for category in categories {
                    writeln!(
                        f,
                        "{:<24} {:<18} {}",
                        category.id, category.base_unit, category.dimensions
                    )?;
                }
                Ok(())
            }
            Output::Units { units } => {
                for unit in units {
                    match &unit.abbreviation {
                        Some(abbreviation) => writeln!(f, "{} ({abbreviation})", unit.name)?,
                        None => writeln!(f, "{}", unit.name)?,
                    }
                }
                Ok(())
            }
        }
    }
}
