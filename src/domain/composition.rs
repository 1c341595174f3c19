//! Composition resolution: the two-hop join cost record -> subtotal links ->
//! composition lines.

use std::collections::HashMap;

use tracing::{instrument, trace};

use crate::domain::entities::{CompositionLine, SubtotalLink};
use crate::domain::units::UnitRegistry;

/// Resolve the composition lines of a cost record.
///
/// Lines are grouped by subtotal in the order the subtotals were matched,
/// keeping the input order of `lines` inside each group. An empty result
/// means no breakdown is available.
pub fn resolve_compositions(
    cost_id: &str,
    links: &[SubtotalLink],
    lines: &[CompositionLine],
) -> Vec<CompositionLine> {
    links
        .iter()
        .filter(|link| link.cost_id == cost_id)
        .flat_map(|link| lines.iter().filter(move |line| line.subtotal_id == link.id))
        .cloned()
        .collect()
}

/// Composition lines of one subtotal group.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtotalGroup {
    pub link: SubtotalLink,
    pub lines: Vec<CompositionLine>,
}

/// Pre-built index over subtotal links and composition lines.
///
/// Yields the same result as [`resolve_compositions`] without rescanning
/// both arrays on every lookup.
#[derive(Debug, Clone, Default)]
pub struct CompositionIndex {
    links: Vec<SubtotalLink>,
    lines: Vec<CompositionLine>,
    /// cost id -> positions in `links`, in input order
    links_by_cost: HashMap<String, Vec<usize>>,
    /// subtotal id -> positions in `lines`, in input order
    lines_by_subtotal: HashMap<String, Vec<usize>>,
}

impl CompositionIndex {
    #[instrument(level = "debug", skip_all, fields(links = links.len(), lines = lines.len()))]
    pub fn new(links: Vec<SubtotalLink>, lines: Vec<CompositionLine>) -> Self {
        let mut links_by_cost: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, link) in links.iter().enumerate() {
            links_by_cost.entry(link.cost_id.clone()).or_default().push(pos);
        }

        let mut lines_by_subtotal: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, line) in lines.iter().enumerate() {
            lines_by_subtotal
                .entry(line.subtotal_id.clone())
                .or_default()
                .push(pos);
        }

        Self {
            links,
            lines,
            links_by_cost,
            lines_by_subtotal,
        }
    }

    /// Subtotal links of a cost record, in input order.
    pub fn subtotals(&self, cost_id: &str) -> Vec<&SubtotalLink> {
        self.links_by_cost
            .get(cost_id)
            .map(|positions| positions.iter().map(|&p| &self.links[p]).collect())
            .unwrap_or_default()
    }

    fn lines_of(&self, subtotal_id: &str) -> impl Iterator<Item = &CompositionLine> {
        self.lines_by_subtotal
            .get(subtotal_id)
            .into_iter()
            .flatten()
            .map(|&p| &self.lines[p])
    }

    /// Flat list of composition lines for a cost record.
    pub fn resolve(&self, cost_id: &str) -> Vec<CompositionLine> {
        let resolved: Vec<CompositionLine> = self
            .subtotals(cost_id)
            .into_iter()
            .flat_map(|link| self.lines_of(&link.id))
            .cloned()
            .collect();
        trace!("resolved {} composition lines for {}", resolved.len(), cost_id);
        resolved
    }

    /// Composition lines of a cost record grouped by subtotal link.
    pub fn resolve_grouped(&self, cost_id: &str) -> Vec<SubtotalGroup> {
        self.subtotals(cost_id)
            .into_iter()
            .map(|link| SubtotalGroup {
                link: link.clone(),
                lines: self.lines_of(&link.id).cloned().collect(),
            })
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Order composition lines by the category of their unit.
///
/// Stable: lines sharing a category keep their relative order, lines whose
/// unit has no category go last.
pub fn sort_by_category(lines: &mut [CompositionLine], units: &UnitRegistry) {
    lines.sort_by(|a, b| {
        let ca = units.category(&a.unit_id);
        let cb = units.category(&b.unit_id);
        match (ca, cb) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}
