//! metron-core: measurement and unit conversion engine
//!
//! This crate parses compound unit expressions, derives their dimensions
//! and converts values between compatible units, composing conversions that
//! were never tabulated through each category's base unit.
//!
//! # Example
//!
//! ```
//! use metron_core::{decimal, Engine, UnitExpression};
//!
//! let engine = Engine::shared();
//!
//! // Conversion
//! let feet = engine
//!     .convert(decimal("1"), &"mile".parse().unwrap(), &"foot".parse().unwrap())
//!     .unwrap();
//! assert_eq!(feet, decimal("5280"));
//!
//! // Canonical unit strings
//! let units = UnitExpression::parse("meter^2*kilogram/second^3").unwrap();
//! assert_eq!(units.to_string(), "kilogram*meter^2/second^3");
//!
//! // Measurement arithmetic
//! let a = engine.measurement(decimal("3"), "mile").unwrap();
//! let b = engine.measurement(decimal("5280"), "foot").unwrap();
//! assert_eq!(a.add(&b, engine).unwrap().value(), decimal("4"));
//! ```

pub mod config;
pub mod convert;
pub mod dataset;
pub mod error;
pub mod parser;
pub mod types;

pub use config::Settings;
pub use convert::{ConversionEdge, ConversionGraph, Engine, EngineBuilder, Factor, ParsedUnits};
pub use dataset::Dataset;
pub use error::{Error, MalformedReason, Result};
pub use parser::parse_unit_expression;
pub use types::{
    Category, DimensionVector, Measurement, Prefix, PrefixClass, UnitDefinition, UnitExpression,
    Value,
};

use rust_decimal::Decimal;

/// Decimal from a literal, for tests and examples.
///
/// Panics if `s` is not a valid decimal.
pub fn decimal(s: &str) -> Decimal {
    s.parse()
        .unwrap_or_else(|_| panic!("invalid decimal literal: {s}"))
}
