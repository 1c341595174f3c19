//! Expand/collapse and selection state of one tree view.
//!
//! The state only records membership. Which nodes are actually visible is
//! derived on demand by walking the ancestor chain (see [`is_visible`] and
//! [`visible_nodes`]), so there is no cached visible set to keep in sync.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::composition::CompositionIndex;
use crate::domain::entities::{CompositionLine, NodeId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::forest::{self, CostNode};

/// Currently selected node and the compositions resolved for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub node: NodeId,
    /// Empty for budget roots and for records without a breakdown
    pub compositions: Vec<CompositionLine>,
}

/// Navigation state of a single tree view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    expanded: HashSet<NodeId>,
    selection: Option<Selection>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id` in the expanded set.
    ///
    /// Descendants keep their own membership, so they reappear expanded when
    /// this node is opened again. Returns whether the node is now expanded.
    pub fn toggle(&mut self, id: &NodeId) -> bool {
        let expanded = if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        };
        debug!("toggle {}: expanded={}", id, expanded);
        expanded
    }

    pub fn expand(&mut self, id: NodeId) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: &NodeId) {
        self.expanded.remove(id);
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded(&self) -> &HashSet<NodeId> {
        &self.expanded
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self, forest: &[CostNode]) {
        self.expanded.extend(
            forest::iter_forest(forest)
                .filter(|n| !n.is_leaf())
                .map(|n| n.id.clone()),
        );
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expand every ancestor of `id` so the node itself becomes visible.
    pub fn reveal(&mut self, forest: &[CostNode], id: &NodeId) -> DomainResult<()> {
        let path =
            forest::path_to(forest, id).ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
        let ancestors = &path[..path.len() - 1];
        self.expanded.extend(ancestors.iter().map(|n| n.id.clone()));
        Ok(())
    }

    /// Replace the selection with `node`.
    ///
    /// Cost nodes get their compositions resolved through `compositions`;
    /// budget roots have no record behind them and get an empty list.
    pub fn select(&mut self, node: &CostNode, compositions: &CompositionIndex) -> &Selection {
        let resolved = match &node.id {
            NodeId::Budget(_) => Vec::new(),
            NodeId::Cost(id) => compositions.resolve(id),
        };
        debug!("select {}: {} compositions", node.id, resolved.len());
        self.selection.insert(Selection {
            node: node.id.clone(),
            compositions: resolved,
        })
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selection.as_ref().is_some_and(|s| &s.node == id)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Drop expansion and selection, used when the forest is rebuilt.
    pub fn reset(&mut self) {
        self.expanded.clear();
        self.selection = None;
    }
}

/// A node is visible when every ancestor up to its budget root is expanded.
/// Budget roots are always visible; unknown ids are not.
pub fn is_visible(forest: &[CostNode], state: &NavigationState, id: &NodeId) -> bool {
    match forest::path_to(forest, id) {
        Some(path) => path[..path.len() - 1]
            .iter()
            .all(|ancestor| state.is_expanded(&ancestor.id)),
        None => false,
    }
}

/// Visible nodes in display order (pre-order, skipping collapsed subtrees).
pub fn visible_nodes<'a>(forest: &'a [CostNode], state: &NavigationState) -> Vec<&'a CostNode> {
    let mut visible = Vec::new();
    let mut stack: Vec<&CostNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        visible.push(node);
        if state.is_expanded(&node.id) {
            stack.extend(node.children.iter().rev());
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::build_forest;
    use crate::domain::entities::{Budget, CostRecord};

    fn forest() -> Vec<CostNode> {
        build_forest(
            &[
                CostRecord::new("C1", None, "B1"),
                CostRecord::new("C2", Some("C1"), "B1"),
                CostRecord::new("C3", Some("C2"), "B1"),
            ],
            &[Budget::new("B1", "Residential")],
        )
        .unwrap()
    }

    #[test]
    fn given_collapsed_ancestor_when_checking_visibility_then_descendant_hidden() {
        let forest = forest();
        let mut state = NavigationState::new();
        state.expand(NodeId::budget("B1"));
        state.expand(NodeId::cost("C2"));

        assert!(is_visible(&forest, &state, &NodeId::cost("C1")));
        assert!(!is_visible(&forest, &state, &NodeId::cost("C2")));
        assert!(!is_visible(&forest, &state, &NodeId::cost("C3")));

        state.toggle(&NodeId::cost("C1"));
        assert!(is_visible(&forest, &state, &NodeId::cost("C3")));
    }

    #[test]
    fn given_deep_node_when_revealing_then_ancestors_expand_but_not_node() {
        let forest = forest();
        let mut state = NavigationState::new();

        state.reveal(&forest, &NodeId::cost("C3")).unwrap();

        assert!(state.is_expanded(&NodeId::budget("B1")));
        assert!(state.is_expanded(&NodeId::cost("C2")));
        assert!(!state.is_expanded(&NodeId::cost("C3")));
        assert!(is_visible(&forest, &state, &NodeId::cost("C3")));
    }

    #[test]
    fn given_unknown_node_when_revealing_then_errors() {
        let mut state = NavigationState::new();
        let err = state.reveal(&forest(), &NodeId::cost("nope")).unwrap_err();
        assert_eq!(err, DomainError::NodeNotFound(NodeId::cost("nope")));
    }

    #[test]
    fn given_expand_all_when_listing_visible_then_shows_whole_tree() {
        let forest = forest();
        let mut state = NavigationState::new();

        state.expand_all(&forest);
        let ids: Vec<String> = visible_nodes(&forest, &state)
            .iter()
            .map(|n| n.id.to_string())
            .collect();

        assert_eq!(ids, vec!["budget:B1", "C1", "C2", "C3"]);
        // leaves are never added
        assert!(!state.is_expanded(&NodeId::cost("C3")));
    }
}
