//! Conversion edges and factor lookup
//!
//! The graph is star-shaped: after [`ConversionGraph::build`] every unit
//! reachable from its category's base unit has a stored edge to it. Lookups
//! try a direct edge first so tabulated shortcuts win over composition.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use super::Factor;
use crate::error::{Error, Result};
use crate::types::{CategoryTable, UnitCatalog};

/// `1 from = factor to`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionEdge {
    pub from: String,
    pub to: String,
    pub factor: Factor,
}

impl ConversionEdge {
    pub fn new(from: &str, to: &str, factor: Factor) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            factor,
        }
    }
}

/// Summary of a built graph, for logging and the CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub tabulated: usize,
    pub derived: usize,
    pub unreachable: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionGraph {
    edges: HashMap<(String, String), Factor>,
    stats: GraphStats,
}

impl ConversionGraph {
    /// Load the tabulated edges, then derive a `unit -> base unit` edge for
    /// every unit that can reach its base unit.
    pub fn build(
        tabulated: Vec<ConversionEdge>,
        catalog: &UnitCatalog,
        categories: &CategoryTable,
    ) -> Result<Self> {
        let mut graph = Self::default();

        for edge in tabulated {
            for unit in [&edge.from, &edge.to] {
                if catalog.get(unit).is_none() {
                    return Err(Error::dataset(format!("edge references unknown unit '{unit}'")));
                }
            }
            if catalog.category_of(&edge.from)? != catalog.category_of(&edge.to)? {
                return Err(Error::dataset(format!(
                    "edge '{}' -> '{}' crosses categories",
                    edge.from, edge.to
                )));
            }
            graph.stats.tabulated += 1;
            graph.edges.insert((edge.from, edge.to), edge.factor);
        }

        for category in categories.iter() {
            graph.close_star(catalog, &category.id, &category.base_unit)?;
        }

        tracing::debug!(
            tabulated = graph.stats.tabulated,
            derived = graph.stats.derived,
            unreachable = graph.stats.unreachable,
            "built conversion graph"
        );
        Ok(graph)
    }

    /// Breadth-first walk from `base` over edges in either direction,
    /// recording how many base units one of each reached unit is worth.
    fn close_star(&mut self, catalog: &UnitCatalog, category: &str, base: &str) -> Result<()> {
        let members: HashSet<&str> = catalog
            .units_in_category(category)
            .map(|def| def.name.as_str())
            .collect();
        if !members.contains(base) {
            return Err(Error::dataset(format!(
                "base unit '{base}' of category '{category}' is not defined in it"
            )));
        }

        // unit -> [(neighbor, factor to neighbor)]
        let mut adjacency: HashMap<&str, Vec<(&str, Factor)>> = HashMap::new();
        for ((from, to), factor) in &self.edges {
            if members.contains(from.as_str()) {
                let (from, to) = (from.as_str(), to.as_str());
                adjacency.entry(from).or_default().push((to, *factor));
                adjacency.entry(to).or_default().push((from, factor.recip()));
            }
        }

        let mut worth: HashMap<&str, Factor> = HashMap::from([(base, Factor::ONE)]);
        let mut queue = VecDeque::from([base]);
        while let Some(unit) = queue.pop_front() {
            let to_base = worth[unit];
            for &(neighbor, factor) in adjacency.get(unit).into_iter().flatten() {
                if worth.contains_key(neighbor) {
                    continue;
                }
                // 1 unit = factor neighbor
                match to_base.checked_div(factor) {
                    Ok(w) => {
                        worth.insert(neighbor, w);
                        queue.push_back(neighbor);
                    }
                    Err(err) => tracing::warn!(unit = neighbor, %err, "skipping edge"),
                }
            }
        }

        let mut derived = Vec::new();
        for &unit in &members {
            match worth.get(unit) {
                Some(_) if unit == base => {}
                Some(factor) => {
                    let key = (unit.to_string(), base.to_string());
                    if !self.edges.contains_key(&key) {
                        derived.push((key, *factor));
                    }
                }
                None => {
                    tracing::warn!(unit, category, "unit has no conversion path to its base unit");
                    self.stats.unreachable += 1;
                }
            }
        }

        self.stats.derived += derived.len();
        self.edges.extend(derived);
        Ok(())
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// A stored edge or the reciprocal of the reverse edge
    pub fn direct(&self, from: &str, to: &str) -> Option<Factor> {
        if from == to {
            return Some(Factor::ONE);
        }
        let key = |a: &str, b: &str| (a.to_string(), b.to_string());
        self.edges
            .get(&key(from, to))
            .copied()
            .or_else(|| self.edges.get(&key(to, from)).map(|f| f.recip()))
    }

    /// Factor between two units of the same category: the direct edge when
    /// one exists, otherwise the composition through `base`.
    pub fn factor(&self, from: &str, to: &str, base: &str) -> Result<Factor> {
        let mut visited = HashSet::new();
        self.resolve(from, to, base, &mut visited)?
            .ok_or_else(|| Error::ConversionPathNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    fn resolve<'a>(
        &self,
        from: &'a str,
        to: &'a str,
        base: &'a str,
        visited: &mut HashSet<(&'a str, &'a str)>,
    ) -> Result<Option<Factor>> {
        if let Some(factor) = self.direct(from, to) {
            tracing::trace!(from, to, %factor, "direct edge");
            return Ok(Some(factor));
        }
        if from == base || to == base || !visited.insert((from, to)) {
            return Ok(None);
        }

        let Some(up) = self.resolve(from, base, base, visited)? else {
            return Ok(None);
        };
        let Some(down) = self.resolve(base, to, base, visited)? else {
            return Ok(None);
        };
        tracing::trace!(from, to, base, "composed through base unit");
        up.checked_mul(down).map(Some)
    }
}
