//! Core value representation

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::Measurement;
use crate::convert::Engine;
use crate::error::{Error, Result};

/// A computed value: a plain number or a quantity with units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Plain number
    Scalar(Decimal),
    /// Number with a non-empty unit expression
    Measurement(Measurement),
}

impl Value {
    /// Create a new scalar value
    pub fn scalar(n: Decimal) -> Self {
        Value::Scalar(n)
    }

    /// Get the numeric value as Decimal, ignoring units
    pub fn as_decimal(&self) -> Decimal {
        match self {
            Value::Scalar(n) => *n,
            Value::Measurement(m) => m.value(),
        }
    }

    /// Get the numeric value as f64
    pub fn as_f64(&self) -> Option<f64> {
        self.as_decimal().to_f64()
    }

    pub fn as_measurement(&self) -> Option<&Measurement> {
        match self {
            Value::Measurement(m) => Some(m),
            Value::Scalar(_) => None,
        }
    }

    /// View as a measurement; scalars have empty units
    pub fn to_measurement(&self) -> Measurement {
        match self {
            Value::Scalar(n) => Measurement::scalar(*n),
            Value::Measurement(m) => m.clone(),
        }
    }

    pub fn add(&self, rhs: &Value, engine: &Engine) -> Result<Value> {
        if let (Value::Scalar(a), Value::Scalar(b)) = (self, rhs) {
            return a
                .checked_add(*b)
                .map(Value::Scalar)
                .ok_or(Error::Overflow("addition"));
        }
        Ok(self
            .to_measurement()
            .add(&rhs.to_measurement(), engine)?
            .into_value())
    }

    pub fn subtract(&self, rhs: &Value, engine: &Engine) -> Result<Value> {
        Ok(self
            .to_measurement()
            .subtract(&rhs.to_measurement(), engine)?
            .into_value())
    }

    pub fn multiply(&self, rhs: &Value, engine: &Engine) -> Result<Value> {
        self.to_measurement().multiply(&rhs.to_measurement(), engine)
    }

    pub fn divide(&self, rhs: &Value, engine: &Engine) -> Result<Value> {
        self.to_measurement().divide(&rhs.to_measurement(), engine)
    }

    pub fn invert(&self) -> Result<Value> {
        Ok(self.to_measurement().invert()?.into_value())
    }

    /// Raise to a power. Measurements only accept integral exponents.
    pub fn power(&self, exponent: Decimal, engine: &Engine) -> Result<Value> {
        match self {
            Value::Scalar(n) => n
                .checked_powd(exponent)
                .map(Value::Scalar)
                .ok_or(Error::Overflow("power")),
            Value::Measurement(m) => {
                if !exponent.fract().is_zero() {
                    return Err(Error::NonIntegralExponent);
                }
                let exponent = exponent.to_i64().ok_or(Error::Overflow("power"))?;
                Ok(engine.power(m, exponent)?.into_value())
            }
        }
    }

    /// Remainder after dividing by `rhs`, in `rhs`'s units
    pub fn modulo(&self, rhs: &Value, engine: &Engine) -> Result<Value> {
        if let (Value::Scalar(a), Value::Scalar(b)) = (self, rhs) {
            return a
                .checked_rem(*b)
                .map(Value::Scalar)
                .ok_or(Error::Overflow("modulo"));
        }
        engine.modulo(&self.to_measurement(), &rhs.to_measurement())
    }

    /// The `n`th root. Whole roots must be positive; only scalars accept a
    /// fractional `n`.
    pub fn root(&self, n: Decimal, engine: &Engine) -> Result<Value> {
        match self {
            Value::Scalar(x) if !n.fract().is_zero() => Decimal::ONE
                .checked_div(n)
                .and_then(|exponent| x.checked_powd(exponent))
                .map(Value::Scalar)
                .ok_or(Error::Overflow("root")),
            Value::Scalar(_) => {
                let n = n.to_i64().ok_or(Error::Overflow("root"))?;
                engine.root(&self.to_measurement(), n)
            }
            Value::Measurement(m) => {
                if !n.fract().is_zero() {
                    return Err(Error::NonIntegralExponent);
                }
                let n = n.to_i64().ok_or(Error::Overflow("root"))?;
                engine.root(m, n)
            }
        }
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Scalar(n)
    }
}

impl From<Measurement> for Value {
    fn from(m: Measurement) -> Self {
        m.into_value()
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Scalar(n) => write!(f, "{}", n.normalize()),
            Value::Measurement(m) => write!(f, "{m}"),
        }
    }
}
