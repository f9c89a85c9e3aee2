//! Exact conversion factors
//!
//! A factor is kept as a fraction of two decimals so that reciprocals and
//! chains of edges stay exact until the value is finally scaled. Composing
//! `chain -> meter` (20.1168) with `meter -> foot` (1 / 0.3048) yields
//! exactly 66 instead of `65.99999...`.

use std::fmt;

use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// `1 from = numerator / denominator to`
///
/// Equality is by value: `3/1 == 6/2`. Terms are compared by
/// cross-multiplication, falling back to the stored terms when the
/// products overflow.
#[derive(Debug, Clone, Copy)]
pub struct Factor {
    numerator: Decimal,
    denominator: Decimal,
}

impl Factor {
    pub const ONE: Factor = Factor {
        numerator: Decimal::ONE,
        denominator: Decimal::ONE,
    };

    /// Fraction `numerator / denominator`. Fails on a zero term, since no
    /// unit is zero times another.
    pub fn new(numerator: Decimal, denominator: Decimal) -> Result<Self> {
        if numerator.is_zero() || denominator.is_zero() {
            return Err(Error::Overflow("zero conversion factor"));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Self::new(value, Decimal::ONE)
    }

    pub fn numerator(&self) -> Decimal {
        self.numerator
    }

    pub fn denominator(&self) -> Decimal {
        self.denominator
    }

    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    pub fn recip(self) -> Self {
        Self {
            numerator: self.denominator,
            denominator: self.numerator,
        }
    }

    pub fn checked_mul(self, rhs: Factor) -> Result<Self> {
        let numerator = self
            .numerator
            .checked_mul(rhs.numerator)
            .ok_or(Error::Overflow("factor multiplication"))?;
        let denominator = self
            .denominator
            .checked_mul(rhs.denominator)
            .ok_or(Error::Overflow("factor multiplication"))?;
        // tiny products round to zero past 28 decimal places
        if numerator.is_zero() || denominator.is_zero() {
            return Err(Error::Overflow("factor multiplication"));
        }
        Ok(Self {
            numerator,
            denominator,
        }
        .simplified())
    }

    pub fn checked_div(self, rhs: Factor) -> Result<Self> {
        self.checked_mul(rhs.recip())
    }

    /// Integer power by repeated squaring; negative exponents invert
    pub fn checked_powi(self, exponent: i64) -> Result<Self> {
        if self.is_one() {
            return Ok(Factor::ONE);
        }
        let mut base = if exponent < 0 { self.recip() } else { self };
        let mut remaining = exponent.unsigned_abs();
        let mut result = Factor::ONE;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.checked_mul(base)?;
            }
        }
        Ok(result)
    }

    /// Collapse to a single decimal (rounded to 28 significant digits)
    pub fn to_decimal(self) -> Result<Decimal> {
        self.numerator
            .checked_div(self.denominator)
            .ok_or(Error::Overflow("factor division"))
    }

    /// Scale `value` by this factor, multiplying before dividing
    pub fn apply(self, value: Decimal) -> Result<Decimal> {
        if self.is_one() {
            return Ok(value);
        }
        value
            .checked_mul(self.numerator)
            .and_then(|v| v.checked_div(self.denominator))
            .ok_or(Error::Overflow("unit conversion"))
    }

    /// Collapse whole quotients so long chains don't accumulate digits.
    /// Anything else stays a fraction: `1/0.0254` is not a finite decimal.
    fn simplified(self) -> Self {
        if self.denominator == Decimal::ONE {
            return self;
        }
        if self.numerator.checked_rem(self.denominator) != Some(Decimal::ZERO) {
            return self;
        }
        match self.numerator.checked_div(self.denominator) {
            Some(q) if q.checked_mul(self.denominator) == Some(self.numerator) => Self {
                numerator: q.normalize(),
                denominator: Decimal::ONE,
            },
            _ => self,
        }
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        let lhs = self.numerator.checked_mul(other.denominator);
        let rhs = other.numerator.checked_mul(self.denominator);
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self.numerator == other.numerator && self.denominator == other.denominator,
        }
    }
}

impl Eq for Factor {}

impl Default for Factor {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == Decimal::ONE {
            write!(f, "{}", self.numerator.normalize())
        } else {
            write!(
                f,
                "{}/{}",
                self.numerator.normalize(),
                self.denominator.normalize()
            )
        }
    }
}
