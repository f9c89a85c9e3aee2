//! Value types for unit algebra and measurements

mod category;
mod dimension;
mod expression;
mod measurement;
mod prefix;
mod unit;
mod value;

pub use category::{Category, CategoryTable, Estimate};
pub use dimension::DimensionVector;
pub use expression::UnitExpression;
pub use measurement::Measurement;
pub use prefix::{Prefix, PrefixClass};
pub use unit::{ResolvedUnit, UnitCatalog, UnitDefinition};
pub use value::Value;
