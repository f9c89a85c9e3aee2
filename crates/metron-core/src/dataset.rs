//! The unit dataset: categories, prefixes, units and conversion edges
//!
//! Datasets are JSON documents. Decimal quantities are written as strings so
//! no precision is lost to floating point; they may use scientific notation
//! (`"1.602176634e-19"`) and edge factors may be fractions (`"5/9"`).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::convert::{ConversionEdge, Factor};
use crate::error::{Error, Result};
use crate::types::{
    Category, DimensionVector, Estimate, Prefix, PrefixClass, UnitDefinition, UnitExpression,
};

#[cfg(feature = "bundled_units")]
const BUNDLED: &str = include_str!("../data/units.json");

/// Everything needed to build an [`Engine`](crate::Engine)
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub units: Vec<UnitDefinition>,
    pub categories: Vec<Category>,
    pub prefixes: Vec<Prefix>,
    pub conversions: Vec<ConversionEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetFile {
    #[serde(default)]
    prefixes: Vec<Prefix>,
    categories: Vec<CategoryEntry>,
    units: Vec<UnitEntry>,
    #[serde(default)]
    conversions: Vec<EdgeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryEntry {
    id: String,
    formula: String,
    base_unit: String,
    #[serde(default)]
    estimates: Vec<EstimateEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EstimateEntry {
    value: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    name: String,
    category: String,
    plural: Option<String>,
    abbreviation: Option<String>,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    prefixes: PrefixClass,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EdgeEntry {
    from: String,
    to: String,
    factor: String,
}

impl Dataset {
    /// The dataset compiled into the crate
    ///
    /// This is only available with the `bundled_units` feature.
    #[cfg(feature = "bundled_units")]
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: DatasetFile =
            serde_json::from_str(text).map_err(|e| Error::dataset(e.to_string()))?;
        file.try_into()
    }
}

impl TryFrom<DatasetFile> for Dataset {
    type Error = Error;

    fn try_from(file: DatasetFile) -> Result<Self> {
        let categories = file
            .categories
            .into_iter()
            .map(|entry| -> Result<Category> {
                let formula = UnitExpression::parse(&entry.formula)?;
                let estimates = entry
                    .estimates
                    .into_iter()
                    .map(|e| -> Result<Estimate> {
                        Ok(Estimate {
                            value: parse_decimal(&e.value)?,
                            description: e.description,
                        })
                    })
                    .collect::<Result<_>>()?;
                Ok(Category {
                    id: entry.id,
                    formula: DimensionVector::from(formula),
                    base_unit: entry.base_unit,
                    estimates,
                })
            })
            .collect::<Result<_>>()?;

        let units = file
            .units
            .into_iter()
            .map(|entry| -> Result<UnitDefinition> {
                Ok(UnitDefinition {
                    plural: entry.plural.unwrap_or_else(|| format!("{}s", entry.name)),
                    offset: entry.offset.as_deref().map(parse_decimal).transpose()?,
                    name: entry.name,
                    category: entry.category,
                    abbreviation: entry.abbreviation,
                    aliases: entry.aliases,
                    tags: entry.tags,
                    prefixes: entry.prefixes,
                    generated: false,
                })
            })
            .collect::<Result<_>>()?;

        let conversions = file
            .conversions
            .into_iter()
            .map(|entry| -> Result<ConversionEdge> {
                let factor = parse_factor(&entry.factor)?;
                Ok(ConversionEdge::new(&entry.from, &entry.to, factor))
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            units,
            categories,
            prefixes: file.prefixes,
            conversions,
        })
    }
}

/// Parse a decimal literal, allowing scientific notation
fn parse_decimal(text: &str) -> Result<Decimal> {
    let text = text.trim();
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str_exact(text)
    };
    parsed.map_err(|e| Error::dataset(format!("invalid number '{text}': {e}")))
}

/// Parse an edge factor: a decimal or a `numerator/denominator` fraction
fn parse_factor(text: &str) -> Result<Factor> {
    match text.split_once('/') {
        Some((num, den)) => Factor::new(parse_decimal(num)?, parse_decimal(den)?),
        None => Factor::from_decimal(parse_decimal(text)?),
    }
    .map_err(|_| Error::dataset(format!("invalid conversion factor '{text}'")))
}

impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal as d;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("0.0254").unwrap(), d("0.0254"));
        assert_eq!(parse_decimal("1.5e3").unwrap(), d("1500"));
        assert_eq!(parse_decimal("2e-3").unwrap(), d("0.002"));
        assert!(parse_decimal("twelve").is_err());
    }

    #[test]
    fn test_parse_factor() {
        let f = parse_factor("5/9").unwrap();
        assert_eq!(f.numerator(), d("5"));
        assert_eq!(f.denominator(), d("9"));
        assert!(parse_factor("0").is_err());
    }

    #[test]
    fn test_minimal_dataset() {
        let json = r#"{
            "categories": [
                { "id": "length", "formula": "length", "base_unit": "meter" }
            ],
            "units": [
                { "name": "meter", "category": "length", "abbreviation": "m" },
                { "name": "foot", "category": "length", "plural": "feet" }
            ],
            "conversions": [
                { "from": "foot", "to": "meter", "factor": "0.3048" }
            ]
        }"#;
        let dataset = Dataset::from_json(json).unwrap();
        assert_eq!(dataset.units[0].plural, "meters");
        assert_eq!(dataset.units[1].plural, "feet");
        assert_eq!(dataset.units[0].prefixes, PrefixClass::None);
        assert_eq!(dataset.conversions.len(), 1);
        assert!(dataset.prefixes.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{ "categories": [], "units": [], "colour": "blue" }"#;
        assert!(matches!(Dataset::from_json(json), Err(Error::InvalidDataset(_))));
    }

    #[cfg(feature = "bundled_units")]
    #[test]
    fn test_bundled_parses() {
        let dataset = Dataset::bundled().unwrap();
        assert!(dataset.units.iter().any(|u| u.name == "mile"));
        assert!(dataset.categories.iter().any(|c| c.id == "length"));
        assert_eq!(dataset.prefixes.len(), 28);
    }
}
