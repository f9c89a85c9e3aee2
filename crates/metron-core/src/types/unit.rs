//! Unit definitions and the catalog that resolves unit tokens
//!
//! The catalog is built once from a [`Dataset`](crate::Dataset): every
//! prefix-eligible unit is expanded with every prefix it accepts, and each
//! name, plural, alias and abbreviation is indexed for lookup.

use std::collections::HashMap;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{Prefix, PrefixClass};
use crate::convert::ConversionEdge;
use crate::error::{Error, Result};

/// Unit metadata, immutable once the catalog is built
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDefinition {
    /// Canonical name, used in unit expressions (e.g. "meter")
    pub name: String,
    /// Category id (e.g. "length")
    pub category: String,
    pub plural: String,
    /// Short symbol (e.g. "m"), matched case-sensitively
    pub abbreviation: Option<String>,
    pub aliases: Vec<String>,
    /// Descriptive tags ("SI", "imperial", ...)
    pub tags: Vec<String>,
    pub prefixes: PrefixClass,
    /// Reading of absolute zero in this unit, negated. Only set for
    /// temperature scales whose zero is not absolute (celsius: 273.15).
    pub offset: Option<Decimal>,
    /// Synthesized from a prefix and a bare unit
    pub generated: bool,
}

/// A resolved token: `square_foot` is `foot` squared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUnit {
    pub name: String,
    pub power: i64,
}

/// Static registry of every known unit
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: IndexMap<String, UnitDefinition>,
    /// plural / alias -> canonical name
    names: HashMap<String, String>,
    /// abbreviation -> canonical name
    symbols: HashMap<String, String>,
    /// (spelling, prefix) pairs, longest spelling first
    prefix_forms: Vec<(String, PrefixForm, Prefix)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixForm {
    Name,
    Symbol,
}

const SQUARE_FORMS: [&str; 2] = ["square_", "sq_"];
const CUBIC_FORMS: [&str; 2] = ["cubic_", "cu_"];

impl UnitCatalog {
    /// Build the catalog, synthesizing every prefixed unit.
    ///
    /// Returns the catalog together with one edge per synthesized unit,
    /// `1 prefixed = base^exponent bare`.
    pub fn build(
        definitions: Vec<UnitDefinition>,
        prefixes: &[Prefix],
    ) -> Result<(Self, Vec<ConversionEdge>)> {
        let mut catalog = Self::default();

        for def in definitions {
            if catalog.units.contains_key(&def.name) {
                return Err(Error::dataset(format!("duplicate unit '{}'", def.name)));
            }
            catalog.units.insert(def.name.clone(), def);
        }

        for def in catalog.units.values() {
            if def.plural != def.name {
                catalog.names.insert(def.plural.clone(), def.name.clone());
            }
            for alias in &def.aliases {
                catalog.names.insert(alias.clone(), def.name.clone());
            }
            if let Some(abbreviation) = &def.abbreviation {
                catalog.symbols.insert(abbreviation.clone(), def.name.clone());
            }
        }

        let edges = catalog.synthesize_prefixed(prefixes)?;

        let mut forms = Vec::with_capacity(prefixes.len() * 2);
        for prefix in prefixes {
            forms.push((prefix.name.clone(), PrefixForm::Name, prefix.clone()));
            forms.push((prefix.abbreviation.clone(), PrefixForm::Symbol, prefix.clone()));
        }
        // longest first, so "da" (deca) is tried before "d" (deci)
        forms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        catalog.prefix_forms = forms;

        tracing::debug!(
            units = catalog.units.len(),
            prefixed = edges.len(),
            "built unit catalog"
        );

        Ok((catalog, edges))
    }

    fn synthesize_prefixed(&mut self, prefixes: &[Prefix]) -> Result<Vec<ConversionEdge>> {
        let mut generated = Vec::new();
        let mut edges = Vec::new();

        for def in self.units.values() {
            for prefix in prefixes.iter().filter(|p| def.prefixes.accepts(p)) {
                let name = prefix.apply_to(&def.name);
                if self.units.contains_key(&name) {
                    // the dataset spells this unit out itself
                    continue;
                }

                edges.push(ConversionEdge::new(&name, &def.name, prefix.scale()?));
                generated.push(UnitDefinition {
                    name,
                    category: def.category.clone(),
                    plural: prefix.apply_to(&def.plural),
                    abbreviation: def
                        .abbreviation
                        .as_ref()
                        .map(|a| format!("{}{a}", prefix.abbreviation)),
                    aliases: Vec::new(),
                    tags: def.tags.clone(),
                    prefixes: PrefixClass::None,
                    offset: None,
                    generated: true,
                });
            }
        }

        for def in generated {
            self.names
                .entry(def.plural.clone())
                .or_insert_with(|| def.name.clone());
            self.units.insert(def.name.clone(), def);
        }
        Ok(edges)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up a unit by canonical name
    pub fn get(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.get(name)
    }

    /// All units in dataset order, synthesized ones last
    pub fn iter(&self) -> impl Iterator<Item = &UnitDefinition> {
        self.units.values()
    }

    /// Category id of a canonical unit name
    pub fn category_of(&self, name: &str) -> Result<&str> {
        self.get(name)
            .map(|def| def.category.as_str())
            .ok_or_else(|| Error::UnknownUnit(name.to_string()))
    }

    /// Resolve a token to a canonical unit.
    ///
    /// Order: exact name, plural, alias or abbreviation; then the
    /// `square_`/`cubic_` shorthand for length units; then prefix stripping,
    /// longest prefix first.
    pub fn resolve(&self, token: &str) -> Result<ResolvedUnit> {
        if let Some(name) = self.exact(token) {
            return Ok(ResolvedUnit {
                name: name.to_string(),
                power: 1,
            });
        }

        if let Some(resolved) = self.resolve_power_shorthand(token) {
            return Ok(resolved);
        }

        if let Some(name) = self.strip_prefix(token) {
            return Ok(ResolvedUnit { name, power: 1 });
        }

        Err(Error::UnknownUnit(token.to_string()))
    }

    fn exact(&self, token: &str) -> Option<&str> {
        if let Some((name, _)) = self.units.get_key_value(token) {
            return Some(name.as_str());
        }
        self.names
            .get(token)
            .or_else(|| self.symbols.get(token))
            .map(String::as_str)
    }

    fn resolve_power_shorthand(&self, token: &str) -> Option<ResolvedUnit> {
        let forms = SQUARE_FORMS
            .iter()
            .map(|f| (*f, 2))
            .chain(CUBIC_FORMS.iter().map(|f| (*f, 3)));

        for (form, power) in forms {
            let Some(rest) = token.strip_prefix(form) else {
                continue;
            };
            let name = self
                .exact(rest)
                .map(str::to_string)
                .or_else(|| self.strip_prefix(rest))?;
            if self.get(&name)?.category == "length" {
                return Some(ResolvedUnit { name, power });
            }
        }
        None
    }

    fn strip_prefix(&self, token: &str) -> Option<String> {
        for (spelling, form, prefix) in &self.prefix_forms {
            let Some(rest) = token.strip_prefix(spelling.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let bare = match form {
                PrefixForm::Name => self
                    .units
                    .get_key_value(rest)
                    .map(|(k, _)| k)
                    .or_else(|| self.names.get(rest)),
                PrefixForm::Symbol => self.symbols.get(rest),
            };
            let Some(def) = bare.and_then(|name| self.units.get(name)) else {
                continue;
            };
            if !def.prefixes.accepts(prefix) {
                continue;
            }

            let name = prefix.apply_to(&def.name);
            if self.units.contains_key(&name) {
                tracing::trace!(token, unit = %name, "resolved prefixed unit");
                return Some(name);
            }
        }
        None
    }

    /// Every unit of a category
    pub fn units_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a UnitDefinition> + 'a {
        self.units.values().filter(move |def| def.category == category)
    }
}
