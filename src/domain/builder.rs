//! Tree builder reconstructing budget forests from flat cost records.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::{CostArena, NodeData};
use crate::domain::entities::{Budget, CostRecord};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::forest::CostNode;

/// Constructs one tree per budget from a flat record snapshot.
///
/// Parent links are resolved before any depth is assigned, so the result
/// does not depend on the order of `records`.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    strict: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// In strict mode an unresolvable parent is an error instead of
    /// falling back to the budget root, and so is a repeated record id.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Build the forest, one entry per budget in `budgets` order.
    #[instrument(
        level = "debug",
        skip_all,
        fields(records = records.len(), budgets = budgets.len())
    )]
    pub fn build_forest(
        &self,
        records: &[CostRecord],
        budgets: &[Budget],
    ) -> DomainResult<Vec<CostNode>> {
        let mut arena = CostArena::with_capacity(records.len() + budgets.len());

        let mut roots: HashMap<&str, Index> = HashMap::with_capacity(budgets.len());
        for budget in budgets {
            let idx = arena.insert_root(budget.clone());
            if roots.insert(budget.id.as_str(), idx).is_some() {
                warn!("duplicate budget id {}, records attach to the last one", budget.id);
            }
        }

        // Pass 1: identifier -> node index
        let mut index: HashMap<&str, Index> = HashMap::with_capacity(records.len());
        let mut placed: Vec<Index> = Vec::with_capacity(records.len());
        for record in records {
            if !roots.contains_key(record.budget_id.as_str()) {
                return Err(DomainError::UnknownBudget {
                    record: record.id.clone(),
                    budget: record.budget_id.clone(),
                });
            }
            if index.contains_key(record.id.as_str()) {
                if self.strict {
                    return Err(DomainError::DuplicateRecord(record.id.clone()));
                }
                warn!("duplicate record id {}, parent refs resolve to the first", record.id);
            }
            let idx = arena.insert_record(record.clone());
            index.entry(record.id.as_str()).or_insert(idx);
            placed.push(idx);
        }

        // Pass 2: link every record under its parent or its budget root
        for (record, &idx) in records.iter().zip(&placed) {
            let root = roots[record.budget_id.as_str()];
            let parent = match record.parent_id.as_deref() {
                None => root,
                Some(parent_id) => match self.resolve_parent(&arena, &index, record, parent_id) {
                    Some(parent) => parent,
                    None if self.strict => {
                        return Err(DomainError::OrphanRecord {
                            record: record.id.clone(),
                            parent: parent_id.to_string(),
                            budget: record.budget_id.clone(),
                        });
                    }
                    None => {
                        warn!(
                            "record {} has unknown parent {} in budget {}, \
                             attaching to budget root",
                            record.id, parent_id, record.budget_id
                        );
                        root
                    }
                },
            };
            arena.attach(idx, parent);
        }

        let reached = arena.assign_depths();
        debug!("reached {} of {} nodes from budget roots", reached, arena.len());

        if let Some(id) = first_unreached(&arena, records, &placed) {
            return Err(DomainError::CycleDetected(id));
        }

        Ok(arena.into_forest())
    }

    /// Parent index if it names a record of the same budget.
    fn resolve_parent(
        &self,
        arena: &CostArena,
        index: &HashMap<&str, Index>,
        record: &CostRecord,
        parent_id: &str,
    ) -> Option<Index> {
        let &parent = index.get(parent_id)?;
        match arena.get_node(parent).map(|n| &n.data) {
            Some(NodeData::Record(p)) if p.budget_id == record.budget_id => Some(parent),
            _ => None,
        }
    }
}

/// First record, in input order, that no budget root reaches.
fn first_unreached(arena: &CostArena, records: &[CostRecord], placed: &[Index]) -> Option<String> {
    if arena.unreached().next().is_none() {
        return None;
    }
    records
        .iter()
        .zip(placed)
        .find(|(_, &idx)| arena.get_node(idx).is_some_and(|n| n.depth.is_none()))
        .map(|(r, _)| r.id.clone())
}

/// Build a forest with the default (lenient) builder.
pub fn build_forest(records: &[CostRecord], budgets: &[Budget]) -> DomainResult<Vec<CostNode>> {
    TreeBuilder::new().build_forest(records, budgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NodeId;

    #[test]
    fn given_empty_input_when_building_then_returns_empty_forest() {
        let forest = build_forest(&[], &[]).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn given_budget_without_records_when_building_then_root_has_no_children() {
        let forest = build_forest(&[], &[Budget::new("B1", "Residential")]).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, NodeId::budget("B1"));
        assert_eq!(forest[0].depth, 0);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn given_two_record_cycle_when_building_then_reports_first_member() {
        let budgets = [Budget::new("B1", "Residential")];
        let records = [
            CostRecord::new("C0", None, "B1"),
            CostRecord::new("C1", Some("C2"), "B1"),
            CostRecord::new("C2", Some("C1"), "B1"),
        ];

        let err = build_forest(&records, &budgets).unwrap_err();

        assert_eq!(err, DomainError::CycleDetected("C1".to_string()));
    }
}
