//! Physical categories and their dimension formulas

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{DimensionVector, UnitExpression};
use crate::error::{Error, Result};

/// A reference magnitude, in the category's base unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub value: Decimal,
    pub description: String,
}

/// A physical kind of quantity with one designated base unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    /// Formula over base quantities; empty for the dimensionless category
    pub formula: DimensionVector,
    pub base_unit: String,
    /// Sorted by ascending value
    pub estimates: Vec<Estimate>,
}

impl Category {
    pub fn dimensions(&self) -> &DimensionVector {
        &self.formula
    }

    pub fn is_dimensionless(&self) -> bool {
        self.formula.is_dimensionless()
    }

    /// Largest reference magnitude not exceeding `value`
    pub fn estimate_below(&self, value: Decimal) -> Option<&Estimate> {
        self.estimates.iter().rev().find(|e| e.value <= value)
    }

    pub fn smallest_estimate(&self) -> Option<&Estimate> {
        self.estimates.first()
    }
}

/// Every category, keyed by id, in dataset order
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: IndexMap<String, Category>,
}

impl CategoryTable {
    /// Build and validate the table.
    ///
    /// Each base quantity named in a formula must itself be a category with
    /// the plain formula `quantity^1`; its base unit is the primitive unit
    /// that compound expressions reduce to.
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        let mut table = IndexMap::new();
        for mut category in categories {
            if table.contains_key(&category.id) {
                return Err(Error::dataset(format!("duplicate category '{}'", category.id)));
            }
            category
                .estimates
                .sort_by(|a: &Estimate, b: &Estimate| a.value.cmp(&b.value));
            table.insert(category.id.clone(), category);
        }

        let table = Self { categories: table };
        for category in table.categories.values() {
            for (quantity, _) in category.formula.iter() {
                let primitive = table.get(quantity).ok_or_else(|| {
                    Error::dataset(format!(
                        "category '{}' uses unknown base quantity '{quantity}'",
                        category.id
                    ))
                })?;
                if primitive.formula.as_expression() != &UnitExpression::unit(quantity) {
                    return Err(Error::dataset(format!(
                        "base quantity '{quantity}' must have the formula '{quantity}'"
                    )));
                }
            }
        }
        Ok(table)
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Category> {
        self.get(id)
            .ok_or_else(|| Error::dataset(format!("unknown category '{id}'")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories whose formula matches `dimensions`, in dataset order
    pub fn matching<'a>(
        &'a self,
        dimensions: &DimensionVector,
    ) -> impl Iterator<Item = &'a Category> + 'a {
        let dimensions = dimensions.clone();
        self.categories
            .values()
            .filter(move |c| c.formula == dimensions)
    }

    /// The category's formula written in primitive units, e.g.
    /// `force` -> `kilogram*meter/second^2`
    pub fn primitive_expression(&self, id: &str) -> Result<UnitExpression> {
        let category = self.require(id)?;
        let mut expr = UnitExpression::new();
        for (quantity, exponent) in category.formula.iter() {
            expr.add_term(&self.require(quantity)?.base_unit, exponent)?;
        }
        Ok(expr)
    }
}
