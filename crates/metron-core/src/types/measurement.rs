//! A value paired with its unit expression

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{UnitExpression, Value};
use crate::config::Settings;
use crate::convert::Engine;
use crate::error::{Error, Result};

/// A quantity such as `3 mile` or `9.8 meter/second^2`.
///
/// Units are expected in canonical form; build measurements from text with
/// [`Engine::measurement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    value: Decimal,
    units: UnitExpression,
}

impl Measurement {
    pub fn new(value: Decimal, units: UnitExpression) -> Self {
        Self { value, units }
    }

    /// A bare number with no units
    pub fn scalar(value: Decimal) -> Self {
        Self::new(value, UnitExpression::new())
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn units(&self) -> &UnitExpression {
        &self.units
    }

    pub fn is_scalar(&self) -> bool {
        self.units.is_empty()
    }

    /// Collapse to [`Value::Scalar`] when no units are left
    pub fn into_value(self) -> Value {
        if self.is_scalar() {
            Value::Scalar(self.value)
        } else {
            Value::Measurement(self)
        }
    }

    /// Value rounded to the working precision
    pub fn rounded(&self, settings: &Settings) -> Self {
        Self::new(settings.round(self.value), self.units.clone())
    }

    /// Sum in `self`'s units. Temperatures are treated as differences here,
    /// so no offset is applied.
    pub fn add(&self, rhs: &Measurement, engine: &Engine) -> Result<Measurement> {
        let rhs = engine.conversion_factor(&rhs.units, &self.units)?.apply(rhs.value)?;
        let value = self
            .value
            .checked_add(rhs)
            .ok_or(Error::Overflow("addition"))?;
        Ok(Self::new(value, self.units.clone()))
    }

    pub fn subtract(&self, rhs: &Measurement, engine: &Engine) -> Result<Measurement> {
        self.add(&rhs.negated(), engine)
    }

    /// Product, merging units of the same category into `self`'s units,
    /// then simplifying and cancelling what is left
    pub fn multiply(&self, rhs: &Measurement, engine: &Engine) -> Result<Value> {
        self.combine(rhs.value, &rhs.units, engine, "multiplication")
    }

    pub fn divide(&self, rhs: &Measurement, engine: &Engine) -> Result<Value> {
        if rhs.value.is_zero() {
            return Err(Error::Overflow("division by zero"));
        }
        let reciprocal = Decimal::ONE
            .checked_div(rhs.value)
            .ok_or(Error::Overflow("division"))?;
        self.combine(reciprocal, &rhs.units.inverted(), engine, "division")
    }

    fn combine(
        &self,
        value: Decimal,
        units: &UnitExpression,
        engine: &Engine,
        op: &'static str,
    ) -> Result<Value> {
        let (units, factor) = engine.combine_expressions(&self.units, units)?;
        let units = engine.simplify_units(&units)?;
        let value = self
            .value
            .checked_mul(value)
            .ok_or(Error::Overflow(op))
            .and_then(|v| factor.apply(v))?;
        engine.normalize(&Self::new(value, units))
    }

    /// Remainder in `rhs`'s units, e.g. `90 minute mod 1 hour` is `0.5 hour`
    pub fn modulo(&self, rhs: &Measurement, engine: &Engine) -> Result<Value> {
        engine.modulo(self, rhs)
    }

    /// Reciprocal value over inverted units
    pub fn invert(&self) -> Result<Measurement> {
        let value = Decimal::ONE
            .checked_div(self.value)
            .ok_or(Error::Overflow("division by zero"))?;
        Ok(Self::new(value, self.units.inverted()))
    }

    fn negated(&self) -> Measurement {
        Self::new(-self.value, self.units.clone())
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            write!(f, "{}", self.value.normalize())
        } else {
            write!(f, "{} {}", self.value.normalize(), self.units)
        }
    }
}
