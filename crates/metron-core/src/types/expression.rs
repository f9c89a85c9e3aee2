//! Compound unit expressions
//!
//! A [`UnitExpression`] maps unit names to non-zero integer exponents, so
//! `kilogram*meter^2/second^3` is `{kilogram: 1, meter: 2, second: -3}`.
//! Insertion order is preserved because unit combination picks the first
//! matching term, but equality ignores it.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser;

/// A compound unit: unit name -> signed integer exponent.
///
/// No entry ever has exponent 0 or `i64::MIN` and the unity marker is never
/// stored, so negating an exponent cannot overflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, i64>", into = "IndexMap<String, i64>")]
pub struct UnitExpression {
    terms: IndexMap<String, i64>,
}

impl UnitExpression {
    /// Reserved marker for the dimensionless unit. Serializes an empty numerator.
    pub const UNITY: &'static str = "1";

    /// Empty (unity) expression
    pub fn new() -> Self {
        Self::default()
    }

    /// A single unit raised to the first power
    pub fn unit(name: &str) -> Self {
        let mut expr = Self::new();
        if name != Self::UNITY {
            expr.terms.insert(name.to_string(), 1);
        }
        expr
    }

    /// A single unit raised to `exponent`
    pub fn with_exponent(name: &str, exponent: i64) -> Result<Self> {
        let mut expr = Self::new();
        expr.add_term(name, exponent)?;
        Ok(expr)
    }

    /// Build from `(unit, exponent)` pairs, summing repeated units
    pub fn from_terms<'a>(terms: impl IntoIterator<Item = (&'a str, i64)>) -> Result<Self> {
        let mut expr = Self::new();
        for (unit, exponent) in terms {
            expr.add_term(unit, exponent)?;
        }
        Ok(expr)
    }

    /// Parse the textual form, see [`parser::parse_unit_expression`]
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse_unit_expression(text)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Exponent of `unit`, if present
    pub fn get(&self, unit: &str) -> Option<i64> {
        self.terms.get(unit).copied()
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.terms.contains_key(unit)
    }

    /// Terms in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.terms.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The only term, if there is exactly one
    pub fn single_term(&self) -> Option<(&str, i64)> {
        if self.terms.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Add `exponent` to `unit`'s exponent, inserting or removing the entry
    /// as needed. Unity and zero exponents are ignored.
    pub fn add_term(&mut self, unit: &str, exponent: i64) -> Result<()> {
        if exponent == 0 || unit == Self::UNITY {
            return Ok(());
        }
        let current = self.get(unit).unwrap_or(0);
        let total = checked_exponent(current.checked_add(exponent))?;
        if total == 0 {
            self.terms.shift_remove(unit);
        } else {
            // an existing key keeps its position
            self.terms.insert(unit.to_string(), total);
        }
        Ok(())
    }

    /// New expression with every exponent negated
    pub fn inverted(&self) -> Self {
        let mut result = self.clone();
        result.invert();
        result
    }

    /// Negate every exponent in place
    pub fn invert(&mut self) {
        for exponent in self.terms.values_mut() {
            *exponent = -*exponent;
        }
    }

    /// Multiply every exponent by `n`
    pub fn powi(&self, n: i64) -> Result<Self> {
        let mut result = Self::new();
        if n == 0 {
            return Ok(result);
        }
        for (unit, exponent) in self.iter() {
            let scaled = checked_exponent(exponent.checked_mul(n))?;
            result.terms.insert(unit.to_string(), scaled);
        }
        Ok(result)
    }

    /// Plain exponent-wise sum. Units of the same category are *not* merged;
    /// use [`crate::Engine::combine_units`] for that.
    pub fn merged(&self, other: &Self) -> Result<Self> {
        let mut result = self.clone();
        for (unit, exponent) in other.iter() {
            result.add_term(unit, exponent)?;
        }
        Ok(result)
    }

/// Split into (numerator, denominator), both with positive exponents
    pub fn split(&self) -> (Self, Self) {
        let mut numerator = Self::new();
        let mut denominator = Self::new();
        for (unit, exponent) in self.iter() {
            if exponent > 0 {
                numerator.terms.insert(unit.to_string(), exponent);
            } else {
                denominator.terms.insert(unit.to_string(), -exponent);
            }
        }
        (numerator, denominator)
    }

    /// Canonical text: sorted numerator terms, then `/` and sorted
    /// denominator terms. An empty numerator is written as `1`.
    pub fn serialize(&self) -> String {
        let (numerator, denominator) = self.split();

        let mut text = join_sorted(&numerator);
        if text.is_empty() {
            text.push_str(Self::UNITY);
        }
        if !denominator.is_empty() {
            text.push('/');
            text.push_str(&join_sorted(&denominator));
        }
        text
    }
}

fn checked_exponent(exponent: Option<i64>) -> Result<i64> {
    exponent
        .filter(|e| *e != i64::MIN)
        .ok_or(Error::Overflow("unit exponent"))
}

fn join_sorted(expr: &UnitExpression) -> String {
    let mut terms: Vec<(&str, i64)> = expr.iter().collect();
    terms.sort_by(|a, b| a.0.cmp(b.0));
    terms
        .into_iter()
        .map(|(unit, exponent)| {
            if exponent > 1 {
                format!("{unit}^{exponent}")
            } else {
                unit.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("*")
}

impl fmt::Display for UnitExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for UnitExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<IndexMap<String, i64>> for UnitExpression {
    type Error = Error;

    fn try_from(terms: IndexMap<String, i64>) -> Result<Self> {
        Self::from_terms(terms.iter().map(|(unit, exponent)| (unit.as_str(), *exponent)))
    }
}

impl From<UnitExpression> for IndexMap<String, i64> {
    fn from(expr: UnitExpression) -> Self {
        expr.terms
    }
}
