//! The conversion engine
//!
//! [`Engine`] owns the frozen unit catalog, category table and conversion
//! graph, and is passed by reference to everything that parses, converts
//! or does arithmetic on measurements.

mod factor;
mod graph;

use std::cmp::Ordering;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_decimal::prelude::*;

pub use factor::Factor;
pub use graph::{ConversionEdge, ConversionGraph, GraphStats};

use crate::config::Settings;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::{
    Category, CategoryTable, DimensionVector, Measurement, ResolvedUnit, UnitCatalog,
    UnitDefinition, UnitExpression, Value,
};

/// Catalog name of the dimensionless base unit. It is dropped from resolved
/// expressions, like the `1` marker.
pub const UNITY_UNIT: &str = "unity";

#[cfg(feature = "bundled_units")]
static SHARED: Lazy<Engine> = Lazy::new(Engine::new);

/// Copies of one unit considered when cancelling terms
const NORMALIZE_COPIES: i64 = 3;
/// Terms per side considered when cancelling; subsets grow as `2^n`
const NORMALIZE_ELEMENTS: usize = 8;

/// Result of parsing and resolving a unit string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUnits {
    /// Canonical units, with same-category terms merged
    pub units: UnitExpression,
    /// Scale picked up while merging, `1 written = factor units`
    pub factor: Factor,
    /// Some base quantity changed sign while the terms were accumulated
    pub dimensions_cancel: bool,
}

/// Immutable conversion context, built once from a [`Dataset`]
#[derive(Debug, Clone)]
pub struct Engine {
    settings: Settings,
    catalog: UnitCatalog,
    categories: CategoryTable,
    graph: ConversionGraph,
}

#[derive(Debug, Default)]
pub struct EngineBuilder {
    dataset: Option<Dataset>,
    settings: Settings,
}

impl EngineBuilder {
    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn precision(mut self, working_precision: u32) -> Self {
        self.settings.working_precision = working_precision;
        self
    }

    pub fn build(self) -> Result<Engine> {
        let dataset = match self.dataset {
            Some(dataset) => dataset,
            #[cfg(feature = "bundled_units")]
            None => Dataset::bundled()?,
            #[cfg(not(feature = "bundled_units"))]
            None => return Err(Error::dataset("no dataset configured")),
        };
        Engine::from_dataset(dataset, self.settings)
    }
}

#[cfg(feature = "bundled_units")]
impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine over the bundled dataset with default settings
    #[cfg(feature = "bundled_units")]
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("bundled unit dataset is valid")
    }

    /// Process-wide engine over the bundled dataset, built on first use
    #[cfg(feature = "bundled_units")]
    pub fn shared() -> &'static Engine {
        &SHARED
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn from_dataset(dataset: Dataset, settings: Settings) -> Result<Self> {
        let Dataset {
            units,
            categories,
            prefixes,
            conversions,
        } = dataset;

        let categories = CategoryTable::new(categories)?;
        for unit in &units {
            if categories.get(&unit.category).is_none() {
                return Err(Error::dataset(format!(
                    "unit '{}' has unknown category '{}'",
                    unit.name, unit.category
                )));
            }
        }

        let (catalog, prefixed) = UnitCatalog::build(units, &prefixes)?;
        let edges = conversions.into_iter().chain(prefixed).collect();
        let graph = ConversionGraph::build(edges, &catalog, &categories)?;

        Ok(Self {
            settings,
            catalog,
            categories,
            graph,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    /// Look up a unit token (name, plural, alias, abbreviation or prefixed form)
    pub fn resolve_unit(&self, token: &str) -> Result<ResolvedUnit> {
        self.catalog.resolve(token)
    }

    fn definition(&self, name: &str) -> Result<&UnitDefinition> {
        self.catalog
            .get(name)
            .ok_or_else(|| Error::UnknownUnit(name.to_string()))
    }

    /// Category of a canonical unit name
    pub fn category_of(&self, name: &str) -> Result<&Category> {
        self.categories.require(self.catalog.category_of(name)?)
    }

    /// Rewrite every token as its canonical unit name, without merging
    /// units of the same category
    pub fn resolve_expression(&self, expr: &UnitExpression) -> Result<UnitExpression> {
        let mut resolved = UnitExpression::new();
        for (token, exponent) in expr.iter() {
            let unit = self.resolve_unit(token)?;
            if unit.name == UNITY_UNIT {
                continue;
            }
            let exponent = exponent
                .checked_mul(unit.power)
                .ok_or(Error::Overflow("unit exponent"))?;
            resolved.add_term(&unit.name, exponent)?;
        }
        Ok(resolved)
    }

    /// Parse a unit string, resolve every token and merge terms of the
    /// same category, see [`Engine::combine_units`]
    pub fn parse_units(&self, text: &str) -> Result<ParsedUnits> {
        let resolved = self.resolve_expression(&UnitExpression::parse(text)?)?;
        let dimensions_cancel = self.dimensions_cancel(&resolved)?;
        if dimensions_cancel {
            tracing::debug!(units = %resolved, "dimensions cancel");
        }

        let (units, factor) = self.combine_expressions(&UnitExpression::new(), &resolved)?;
        Ok(ParsedUnits {
            units,
            factor,
            dimensions_cancel,
        })
    }

    /// `value` written in `units`, merged and scaled into canonical form
    pub fn measurement(&self, value: Decimal, units: &str) -> Result<Measurement> {
        let parsed = self.parse_units(units)?;
        Ok(Measurement::new(parsed.factor.apply(value)?, parsed.units))
    }

    /// Sum of every term's category formula, scaled by its exponent
    pub fn dimensions(&self, expr: &UnitExpression) -> Result<DimensionVector> {
        let mut total = DimensionVector::dimensionless();
        for (token, exponent) in expr.iter() {
            let unit = self.resolve_unit(token)?;
            let category = self.category_of(&unit.name)?;
            let exponent = exponent
                .checked_mul(unit.power)
                .ok_or(Error::Overflow("unit exponent"))?;
            total = total.checked_add(&category.formula.scaled(exponent)?)?;
        }
        Ok(total)
    }

    /// True when, accumulating term by term, some base quantity's running
    /// exponent meets a contribution of the opposite sign
    pub fn dimensions_cancel(&self, expr: &UnitExpression) -> Result<bool> {
        let mut running: HashMap<String, i64> = HashMap::new();
        for (token, exponent) in expr.iter() {
            let unit = self.resolve_unit(token)?;
            let category = self.category_of(&unit.name)?;
            for (quantity, q) in category.formula.iter() {
                let contribution = q
                    .checked_mul(exponent)
                    .and_then(|c| c.checked_mul(unit.power))
                    .ok_or(Error::Overflow("unit exponent"))?;
                let total = running.entry(quantity.to_string()).or_insert(0);
                if *total != 0 && (*total > 0) != (contribution > 0) {
                    return Ok(true);
                }
                *total = total
                    .checked_add(contribution)
                    .ok_or(Error::Overflow("unit exponent"))?;
            }
        }
        Ok(false)
    }

    /// Factor between two canonical units of the same category
    pub fn factor(&self, from: &str, to: &str) -> Result<Factor> {
        let category = self.category_of(from)?;
        if self.catalog.category_of(to)? != category.id {
            return Err(Error::IncompatibleDimension {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.graph.factor(from, to, &category.base_unit)
    }

    /// Merge `unit^exponent` into `expr`.
    ///
    /// An existing term of the same unit absorbs it; otherwise the first
    /// term of the same category absorbs it and the returned factor carries
    /// the rescaling; otherwise it becomes a new term.
    pub fn combine_units(
        &self,
        expr: &UnitExpression,
        unit: &str,
        exponent: i64,
    ) -> Result<(UnitExpression, Factor)> {
        let mut result = expr.clone();
        if unit == UNITY_UNIT || unit == UnitExpression::UNITY {
            return Ok((result, Factor::ONE));
        }
        if expr.contains(unit) {
            result.add_term(unit, exponent)?;
            return Ok((result, Factor::ONE));
        }

        let category = self.catalog.category_of(unit)?;
        for (existing, _) in expr.iter() {
            if self.catalog.category_of(existing)? == category {
                let factor = self.factor(unit, existing)?.checked_powi(exponent)?;
                result.add_term(existing, exponent)?;
                return Ok((result, factor));
            }
        }

        result.add_term(unit, exponent)?;
        Ok((result, Factor::ONE))
    }

    /// Fold every term of `rhs` into `lhs` with [`Engine::combine_units`]
    pub fn combine_expressions(
        &self,
        lhs: &UnitExpression,
        rhs: &UnitExpression,
    ) -> Result<(UnitExpression, Factor)> {
        let mut units = lhs.clone();
        let mut factor = Factor::ONE;
        for (unit, exponent) in rhs.iter() {
            let (merged, scale) = self.combine_units(&units, unit, exponent)?;
            units = merged;
            factor = factor.checked_mul(scale)?;
        }
        Ok((units, factor))
    }

    /// Convert `value` from one unit expression to another.
    ///
    /// A lone temperature scale with an offset converts affinely
    /// (0 celsius is 32 fahrenheit); everything else is multiplicative.
    #[tracing::instrument(level = "trace", skip_all, fields(from = %from, to = %to))]
    pub fn convert(
        &self,
        value: Decimal,
        from: &UnitExpression,
        to: &UnitExpression,
    ) -> Result<Decimal> {
        let source = self.resolve_expression(from)?;
        let target = self.resolve_expression(to)?;
        if source == target {
            return Ok(value);
        }

        if let Some(result) = self.convert_affine(value, &source, &target)? {
            return Ok(result);
        }

        self.resolved_factor(&source, &target, from, to)?.apply(value)
    }

    /// Multiplicative factor between two unit expressions, ignoring any
    /// temperature offset
    pub fn conversion_factor(&self, from: &UnitExpression, to: &UnitExpression) -> Result<Factor> {
        let source = self.resolve_expression(from)?;
        let target = self.resolve_expression(to)?;
        if source == target {
            return Ok(Factor::ONE);
        }
        self.resolved_factor(&source, &target, from, to)
    }

    fn convert_affine(
        &self,
        value: Decimal,
        source: &UnitExpression,
        target: &UnitExpression,
    ) -> Result<Option<Decimal>> {
        let (Some((a, 1)), Some((b, 1))) = (source.single_term(), target.single_term()) else {
            return Ok(None);
        };
        let (from, to) = (self.definition(a)?, self.definition(b)?);
        if from.category != to.category || (from.offset.is_none() && to.offset.is_none()) {
            return Ok(None);
        }

        let offset_from = from.offset.unwrap_or_default();
        let offset_to = to.offset.unwrap_or_default();
        let absolute = value
            .checked_add(offset_from)
            .ok_or(Error::Overflow("temperature conversion"))?;
        let scaled = self.factor(a, b)?.apply(absolute)?;
        tracing::trace!(from = a, to = b, "affine conversion");
        scaled
            .checked_sub(offset_to)
            .map(Some)
            .ok_or(Error::Overflow("temperature conversion"))
    }

    fn resolved_factor(
        &self,
        source: &UnitExpression,
        target: &UnitExpression,
        from: &UnitExpression,
        to: &UnitExpression,
    ) -> Result<Factor> {
        if self.dimensions(source)? != self.dimensions(target)? {
            return Err(Error::IncompatibleDimension {
                from: from.serialize(),
                to: to.serialize(),
            });
        }

        if let Some(factor) = self.paired_factor(source, target)? {
            return Ok(factor);
        }

        let (from_factor, from_primitive) = self.primitive(source)?;
        let (to_factor, to_primitive) = self.primitive(target)?;
        if from_primitive != to_primitive {
            return Err(Error::ConversionPathNotFound {
                from: from.serialize(),
                to: to.serialize(),
            });
        }
        from_factor.checked_div(to_factor)
    }

    /// Pair every source term with the first unused target term of the
    /// same category and exponent, so `mile/hour -> foot/second` only
    /// needs the two length and time edges
    fn paired_factor(
        &self,
        source: &UnitExpression,
        target: &UnitExpression,
    ) -> Result<Option<Factor>> {
        if source.len() != target.len() {
            return Ok(None);
        }

        let mut candidates = Vec::with_capacity(target.len());
        for (unit, exponent) in target.iter() {
            candidates.push(Some((unit, exponent, self.catalog.category_of(unit)?)));
        }

        let mut factor = Factor::ONE;
        for (unit, exponent) in source.iter() {
            let category = self.catalog.category_of(unit)?;
            let slot = candidates.iter_mut().find(|c| {
                matches!(c, Some((_, e, cat)) if *e == exponent && *cat == category)
            });
            let Some(Some((other, _, _))) = slot.map(Option::take) else {
                return Ok(None);
            };
            let step = self.factor(unit, other)?.checked_powi(exponent)?;
            factor = factor.checked_mul(step)?;
        }
        Ok(Some(factor))
    }

    /// Rewrite an expression in primitive units (the base units of the base
    /// quantities), returning `1 expr = factor primitive`
    fn primitive(&self, expr: &UnitExpression) -> Result<(Factor, UnitExpression)> {
        let mut factor = Factor::ONE;
        let mut primitive = UnitExpression::new();
        for (unit, exponent) in expr.iter() {
            let category = self.category_of(unit)?;
            let step = self
                .graph
                .factor(unit, &category.base_unit, &category.base_unit)?
                .checked_powi(exponent)?;
            factor = factor.checked_mul(step)?;
            let expansion = self.categories.primitive_expression(&category.id)?;
            primitive = primitive.merged(&expansion.powi(exponent)?)?;
        }
        Ok((factor, primitive))
    }

    /// Convert a measurement into the units written in `target`
    pub fn convert_to(&self, measurement: &Measurement, target: &str) -> Result<Measurement> {
        let units = self.resolve_expression(&UnitExpression::parse(target)?)?;
        let value = self.convert(measurement.value(), measurement.units(), &units)?;
        Ok(Measurement::new(value, units))
    }

    /// Express every term in its category's base unit
    pub fn reduce(&self, measurement: &Measurement) -> Result<Measurement> {
        let mut units = UnitExpression::new();
        let mut factor = Factor::ONE;
        for (unit, exponent) in self.resolve_expression(measurement.units())?.iter() {
            let base = &self.category_of(unit)?.base_unit;
            factor = factor.checked_mul(self.factor(unit, base)?.checked_powi(exponent)?)?;
            if base != UNITY_UNIT {
                units.add_term(base, exponent)?;
            }
        }
        Ok(Measurement::new(factor.apply(measurement.value())?, units))
    }

    /// Split into several units, e.g. `5.5 foot` into `5 foot, 6 inch`.
    ///
    /// Every target but the last receives the whole part of the converted
    /// value and the remainder carries on to the next target.
    pub fn convert_split(
        &self,
        measurement: &Measurement,
        targets: &[&str],
    ) -> Result<Vec<Measurement>> {
        let mut parts = Vec::with_capacity(targets.len());
        let mut remaining = measurement.clone();
        for (i, target) in targets.iter().enumerate() {
            let converted = self.convert_to(&remaining, target)?;
            if i + 1 == targets.len() {
                parts.push(converted);
                break;
            }
            let whole = converted.value().trunc();
            let rest = converted
                .value()
                .checked_sub(whole)
                .ok_or(Error::Overflow("unit split"))?;
            remaining = Measurement::new(rest, converted.units().clone());
            parts.push(Measurement::new(whole, converted.units().clone()));
        }
        Ok(parts)
    }

    /// Order two measurements after converting `rhs` into `lhs`'s units.
    /// Values within the working precision compare equal.
    pub fn compare(&self, lhs: &Measurement, rhs: &Measurement) -> Result<Ordering> {
        let rhs = self.convert(rhs.value(), rhs.units(), lhs.units())?;
        if self.settings.approx_eq(lhs.value(), rhs) {
            Ok(Ordering::Equal)
        } else {
            Ok(lhs.value().cmp(&rhs))
        }
    }

    /// Raise a measurement to an integral power
    pub fn power(&self, measurement: &Measurement, exponent: i64) -> Result<Measurement> {
        let units = measurement.units().powi(exponent)?;
        let value = measurement
            .value()
            .checked_powi(exponent)
            .ok_or(Error::Overflow("power"))?;
        Ok(Measurement::new(value, units))
    }

    /// Rewrite a product of units without changing its value.
    ///
    /// The primitive form is used only when no factor is involved, and a
    /// primitive form matching a category's formula becomes that category's
    /// base unit when it is a named SI unit: `watt*second` is `joule`, while
    /// `mile/hour` and `meter^3` stay as written.
    pub fn simplify_units(&self, units: &UnitExpression) -> Result<UnitExpression> {
        if units.is_empty() {
            return Ok(UnitExpression::new());
        }
        for (unit, _) in units.iter() {
            // temperature scales keep their offset
            if self.definition(unit)?.offset.is_some() {
                return Ok(units.clone());
            }
        }

        let (factor, primitive) = self.primitive(units)?;
        let result = if factor.is_one() {
            primitive
        } else {
            units.clone()
        };
        if result.is_empty() {
            return Ok(result);
        }

        for category in self.categories.iter() {
            if self.categories.primitive_expression(&category.id)? != result {
                continue;
            }
            let named = self.definition(&category.base_unit)?.tags.iter().any(|t| t == "SI");
            let base = UnitExpression::unit(&category.base_unit);
            if named && self.primitive(&base)?.0.is_one() {
                tracing::trace!(units = %units, base = %base, "simplified to base unit");
                return Ok(base);
            }
            break;
        }
        Ok(result)
    }

    /// Cancel numerator and denominator terms with the same dimensions,
    /// folding their conversion factor into the value.
    ///
    /// Subsets are tried smallest first, numerator outermost, with each unit
    /// counted at most three times. Empty units collapse to a scalar.
    pub fn normalize(&self, measurement: &Measurement) -> Result<Value> {
        let mut value = measurement.value();
        let mut units = measurement.units().clone();

        loop {
            let (numerator, denominator) = units.split();
            if numerator.is_empty() || denominator.is_empty() {
                break;
            }
            let Some((upper, lower)) = self.cancelling_terms(&numerator, &denominator)? else {
                break;
            };

            // the same pair matches again for as long as both sides hold it
            let repeats = [(&upper, &numerator), (&lower, &denominator)]
                .into_iter()
                .flat_map(|(subset, side)| {
                    subset
                        .iter()
                        .map(move |(unit, n)| side.get(unit).unwrap_or(0) / n)
                })
                .min()
                .unwrap_or(1)
                .max(1);

            let factor = self
                .conversion_factor(&upper, &lower)?
                .checked_powi(repeats)?;
            value = factor.apply(value)?;
            units = units
                .merged(&upper.powi(repeats)?.inverted())?
                .merged(&lower.powi(repeats)?)?;
            tracing::trace!(numerator = %upper, denominator = %lower, repeats, "cancelled terms");
        }

        Ok(Measurement::new(value, units).into_value())
    }

    /// First pair of numerator and denominator subsets with equal dimensions
    fn cancelling_terms(
        &self,
        numerator: &UnitExpression,
        denominator: &UnitExpression,
    ) -> Result<Option<(UnitExpression, UnitExpression)>> {
        let upper = self.subset_dimensions(numerator)?;
        let lower = self.subset_dimensions(denominator)?;
        for (n_units, n_dims) in &upper {
            if let Some((d_units, _)) = lower.iter().find(|(_, d_dims)| d_dims == n_dims) {
                return Ok(Some((n_units.clone(), d_units.clone())));
            }
        }
        Ok(None)
    }

    /// Every non-empty sub-product of `side` with its dimensions
    fn subset_dimensions(
        &self,
        side: &UnitExpression,
    ) -> Result<Vec<(UnitExpression, DimensionVector)>> {
        let mut elements = Vec::new();
        for (unit, exponent) in side.iter() {
            let copies = exponent.min(NORMALIZE_COPIES) as usize;
            elements.extend(std::iter::repeat(unit).take(copies));
        }
        if elements.len() > NORMALIZE_ELEMENTS {
            tracing::debug!(units = %side, "too many terms, normalizing a prefix only");
            elements.truncate(NORMALIZE_ELEMENTS);
        }

        let mut result = Vec::new();
        for indices in combinations(elements.len()) {
            let mut subset = UnitExpression::new();
            for i in indices {
                subset.add_term(elements[i], 1)?;
            }
            let dimensions = self.dimensions(&subset)?;
            result.push((subset, dimensions));
        }
        Ok(result)
    }

    /// Remainder of `lhs` divided by `rhs`, in `rhs`'s units
    pub fn modulo(&self, lhs: &Measurement, rhs: &Measurement) -> Result<Value> {
        if rhs.value().is_zero() {
            return Err(Error::Overflow("modulo by zero"));
        }
        let value = self.convert(lhs.value(), lhs.units(), rhs.units())?;
        let remainder = value
            .checked_rem(rhs.value())
            .ok_or(Error::Overflow("modulo"))?;
        self.normalize(&Measurement::new(remainder, rhs.units().clone()))
    }

    /// The `n`th root. Units whose exponents `n` doesn't divide are retried
    /// in primitive units, so `hectare` has a square root in meters.
    pub fn root(&self, measurement: &Measurement, n: i64) -> Result<Value> {
        let invalid = |units: &UnitExpression| Error::InvalidRoot {
            root: root_name(n),
            units: units.serialize(),
        };
        if n < 1 {
            return Err(invalid(measurement.units()));
        }

        let units = self.resolve_expression(measurement.units())?;
        let mut rooted = UnitExpression::new();
        for (unit, exponent) in units.iter() {
            if exponent % n != 0 {
                let (factor, primitive) = self.primitive(&units)?;
                if primitive == units {
                    return Err(invalid(&units));
                }
                tracing::trace!(units = %units, primitive = %primitive, "root in primitive units");
                let value = factor.apply(measurement.value())?;
                return self.root(&Measurement::new(value, primitive), n);
            }
            rooted.add_term(unit, exponent / n)?;
        }

        let value = nth_root(measurement.value(), n, &self.settings)?;
        self.normalize(&Measurement::new(value, rooted))
    }

    /// First category with the same dimensions as `units`
    pub fn which_category(&self, units: &UnitExpression) -> Result<Option<&Category>> {
        let dimensions = self.dimensions(units)?;
        let found = self.categories.matching(&dimensions).next();
        Ok(found)
    }

    /// Whether a measurement has the dimensions of category `id`
    pub fn is_category(&self, measurement: &Measurement, id: &str) -> Result<bool> {
        let category = self.categories.require(id)?;
        Ok(self.dimensions(measurement.units())? == category.formula)
    }

    /// Fail with `IncompatibleDimension` unless the measurement belongs to
    /// category `id`
    pub fn validate_category(&self, measurement: &Measurement, id: &str) -> Result<()> {
        if self.is_category(measurement, id)? {
            Ok(())
        } else {
            Err(Error::IncompatibleDimension {
                from: measurement.units().serialize(),
                to: id.to_string(),
            })
        }
    }

    /// Compare a measurement with the reference magnitudes of its category.
    ///
    /// Returns `None` when no category with these dimensions has any.
    pub fn estimate(&self, measurement: &Measurement) -> Result<Option<String>> {
        let dimensions = self.dimensions(measurement.units())?;
        let Some(category) = self
            .categories
            .matching(&dimensions)
            .find(|c| !c.estimates.is_empty())
        else {
            return Ok(None);
        };

        let value = self.convert(
            measurement.value(),
            measurement.units(),
            &UnitExpression::unit(&category.base_unit),
        )?;

        let (multiple, description, smaller) = match category.estimate_below(value) {
            Some(estimate) => (value.checked_div(estimate.value), &estimate.description, false),
            None => {
                let Some(smallest) = category.smallest_estimate() else {
                    return Ok(None);
                };
                (smallest.value.checked_div(value), &smallest.description, true)
            }
        };
        let multiple = multiple
            .and_then(|m| m.round_sf(3))
            .ok_or(Error::Overflow("estimate"))?
            .normalize();

        let relation = if smaller { "times smaller than" } else { "times" };
        Ok(Some(format!("approximately {multiple} {relation} {description}")))
    }

    /// Every unit of a category, in dataset order
    pub fn units_in_category<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a UnitDefinition> + 'a {
        self.catalog.units_in_category(id)
    }
}

fn root_name(n: i64) -> String {
    match n {
        2 => "square".to_string(),
        3 => "cube".to_string(),
        _ => format!("{n}th"),
    }
}

/// Real `n`th root, snapped to the working precision when that is exact
fn nth_root(value: Decimal, n: i64, settings: &Settings) -> Result<Decimal> {
    if n == 1 || value.is_zero() {
        return Ok(value);
    }
    let negative = value.is_sign_negative();
    if negative && n % 2 == 0 {
        return Err(Error::NegativeRoot);
    }

    let magnitude = value.abs();
    let root = match n {
        2 => magnitude.sqrt(),
        _ => Decimal::ONE
            .checked_div(Decimal::from(n))
            .and_then(|exponent| magnitude.checked_powd(exponent)),
    };
    let root = root.ok_or(Error::Overflow("root"))?;

    let snapped = settings.round(root);
    let root = if snapped.checked_powi(n) == Some(magnitude) {
        snapped
    } else {
        root
    };
    Ok(if negative { -root } else { root })
}

/// Index subsets of `0..len`, smallest first and each size in
/// lexicographic order
fn combinations(len: usize) -> Vec<Vec<usize>> {
    let mut all = Vec::new();
    for size in 1..=len {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            all.push(indices.clone());
            // rightmost index that can still move
            let Some(i) = (0..size).rev().find(|&i| indices[i] < len - size + i) else {
                break;
            };
            indices[i] += 1;
            for j in i + 1..size {
                indices[j] = indices[j - 1] + 1;
            }
        }
    }
    all
}
