//! metron-cli - Command-line unit converter
//!
//! Usage:
//!   metron-cli convert 1 mile foot               # Conversion
//!   metron-cli convert 5.5 foot foot inch        # Split into several units
//!   metron-cli parse "meter^2*kilogram/second^3" # Canonical form
//!   metron-cli dimensions newton                 # Dimension vector
//!   metron-cli estimate 2 hour                   # Reference magnitude
//!   metron-cli units length                      # Unit listing

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metron_core::{Dataset, Engine, UnitExpression};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use output::{CategoryReport, ConversionReport, DimensionsReport, Output, UnitReport};

#[derive(Parser, Debug)]
#[command(name = "metron-cli")]
#[command(about = "Convert measurements between units", long_about = None)]
struct Args {
    /// Significant digits kept in results
    #[arg(short, long, global = true)]
    precision: Option<u32>,

    /// Load units from a JSON dataset instead of the bundled one
    #[arg(short, long, value_name = "FILE", global = true)]
    data: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a value; more than one target splits it (feet and inches)
    Convert {
        #[arg(allow_hyphen_values = true)]
        value: Decimal,
        from: String,
        #[arg(required = true)]
        to: Vec<String>,
    },
    /// Print the canonical form of a unit expression
    Parse { units: String },
    /// Print the dimensions and category of a unit expression
    Dimensions { units: String },
    /// Compare a measurement with familiar magnitudes
    Estimate {
        #[arg(allow_hyphen_values = true)]
        value: Decimal,
        units: String,
    },
    /// List categories, or the units of one category
    Units { category: Option<String> },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let engine = build_engine(&args)?;
    let output = run(&engine, args.command)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{output}");
    }
    Ok(())
}

fn build_engine(args: &Args) -> Result<Engine> {
    let mut builder = Engine::builder();
    if let Some(path) = &args.data {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let dataset = Dataset::from_json(&text)
            .with_context(|| format!("loading dataset {}", path.display()))?;
        builder = builder.dataset(dataset);
    }
    if let Some(precision) = args.precision {
        builder = builder.precision(precision);
    }
    let engine = builder.build().context("building unit engine")?;
    tracing::debug!(
        units = engine.catalog().len(),
        edges = engine.graph().len(),
        "engine ready"
    );
    Ok(engine)
}

fn run(engine: &Engine, command: Command) -> Result<Output> {
    match command {
        Command::Convert { value, from, to } => {
            let measurement = engine
                .measurement(value, &from)
                .with_context(|| format!("reading '{value} {from}'"))?;
            let targets: Vec<&str> = to.iter().map(String::as_str).collect();
            let parts = engine
                .convert_split(&measurement, &targets)
                .with_context(|| format!("converting '{value} {from}' to '{}'", to.join(", ")))?;
            let results = parts
                .iter()
                .map(|m| m.rounded(engine.settings()))
                .collect();
            Ok(Output::Conversion(ConversionReport {
                input: measurement,
                results,
            }))
        }
        Command::Parse { units } => {
            let parsed = UnitExpression::parse(&units)?;
            let resolved = engine.parse_units(&units)?;
            Ok(Output::Parse {
                canonical: parsed.serialize(),
                resolved: resolved.units.serialize(),
                factor: resolved.factor.to_string(),
                dimensions_cancel: resolved.dimensions_cancel,
            })
        }
        Command::Dimensions { units } => {
            let expr = UnitExpression::parse(&units)?;
            let dimensions = engine.dimensions(&expr)?;
            let category = engine.which_category(&expr)?.map(|c| c.id.clone());
            Ok(Output::Dimensions(DimensionsReport {
                units: expr.serialize(),
                dimensions: dimensions.to_string(),
                category,
            }))
        }
        Command::Estimate { value, units } => {
            let measurement = engine.measurement(value, &units)?;
            let estimate = engine.estimate(&measurement)?;
            Ok(Output::Estimate {
                measurement,
                estimate,
            })
        }
        Command::Units { category: None } => Ok(Output::Categories {
            categories: engine
                .categories()
                .iter()
                .map(|c| CategoryReport {
                    id: c.id.clone(),
                    base_unit: c.base_unit.clone(),
                    dimensions: c.formula.to_string(),
                })
                .collect(),
        }),
        Command::Units {
            category: Some(id),
        } => {
            let category = engine
                .categories()
                .get(&id)
                .with_context(|| format!("unknown category '{id}'"))?;
            let units = engine
                .units_in_category(&category.id)
                .filter(|u| !u.generated)
                .map(UnitReport::from)
                .collect();
            Ok(Output::Units { units })
        }
    }
}
