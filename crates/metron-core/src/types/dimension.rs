//! Dimension vectors over the abstract base quantities

use std::fmt;
use std::ops::Neg;

use serde::{Deserialize, Serialize};

use super::UnitExpression;
use crate::error::Result;

/// A unit expression whose "units" are base quantities (`length`, `mass`,
/// `time`, ...). Only used to decide whether two unit expressions are
/// compatible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionVector(UnitExpression);

impl DimensionVector {
    /// The dimensionless vector
    pub fn dimensionless() -> Self {
        Self::default()
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.is_empty()
    }

    /// Exponent of a base quantity
    pub fn get(&self, quantity: &str) -> Option<i64> {
        self.0.get(quantity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter()
    }

    pub fn as_expression(&self) -> &UnitExpression {
        &self.0
    }

    /// Scale every exponent by `n`
    pub fn scaled(&self, n: i64) -> Result<Self> {
        self.0.powi(n).map(Self)
    }

    /// Dimensions of a product
    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.0.merged(&rhs.0).map(Self)
    }

    /// Dimensions of a quotient
    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        self.0.merged(&rhs.0.inverted()).map(Self)
    }
}

impl From<UnitExpression> for DimensionVector {
    fn from(expr: UnitExpression) -> Self {
        Self(expr)
    }
}

impl Neg for DimensionVector {
    type Output = DimensionVector;

    fn neg(self) -> Self::Output {
        Self(self.0.inverted())
    }
}

impl fmt::Display for DimensionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            f.write_str("dimensionless")
        } else {
            fmt::Display::fmt(&self.0, f)
        }
    }
}
