//! Tree-positioned cost nodes and read-only queries over a built forest.

use std::fmt;

use crate::domain::entities::{Budget, CostRecord, NodeId};

/// A node of the cost forest.
///
/// Budget roots are synthetic (depth 0, no record behind them); every other
/// node carries the fields of the cost record it was built from. Children are
/// owned exclusively and kept in input order.
///
/// Construction, traversal and drop never recurse, so arbitrarily long
/// parent chains are safe. The derived `Debug` and `PartialEq` do recurse and
/// are meant for tests and small trees.
#[derive(Debug, PartialEq)]
pub struct CostNode {
    pub id: NodeId,
    /// Parent reference as found in the record (None for roots)
    pub parent_id: Option<String>,
    pub budget_id: String,
    /// Display name of the owning budget
    pub budget_name: String,
    pub numbering: String,
    pub description: String,
    pub unit_id: String,
    pub quantity: f64,
    pub unit_cost: f64,
    pub partial_cost: f64,
    pub status: String,
    pub depth: usize,
    pub children: Vec<CostNode>,
}

impl CostNode {
    /// Synthetic root for a budget.
    pub fn budget_root(budget: &Budget) -> Self {
        Self {
            id: NodeId::budget(&budget.id),
            parent_id: None,
            budget_id: budget.id.clone(),
            budget_name: budget.name.clone(),
            numbering: String::new(),
            description: budget.name.clone(),
            unit_id: String::new(),
            quantity: 0.0,
            unit_cost: 0.0,
            partial_cost: 0.0,
            status: String::new(),
            depth: 0,
            children: Vec::new(),
        }
    }

    pub fn from_record(record: CostRecord, budget_name: &str, depth: usize) -> Self {
        Self {
            id: NodeId::Cost(record.id),
            parent_id: record.parent_id,
            budget_id: record.budget_id,
            budget_name: budget_name.to_string(),
            numbering: record.numbering,
            description: record.description,
            unit_id: record.unit_id,
            quantity: record.quantity,
            unit_cost: record.unit_cost,
            partial_cost: record.partial_cost,
            status: record.status,
            depth,
            children: Vec::new(),
        }
    }

    pub fn is_budget_root(&self) -> bool {
        self.id.is_budget()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal, children left to right.
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including self.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false, a subtree contains at least its own root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Greatest depth found in this subtree.
    pub fn max_depth(&self) -> usize {
        self.iter().map(|n| n.depth).max().unwrap_or(self.depth)
    }

    /// All nodes without children, in pre-order.
    pub fn leaf_nodes(&self) -> Vec<&CostNode> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }

    pub fn find(&self, id: &NodeId) -> Option<&CostNode> {
        self.iter().find(|n| &n.id == id)
    }

    /// Chain of nodes from this node down to `id`, both ends included.
    pub fn path_to(&self, id: &NodeId) -> Option<Vec<&CostNode>> {
        // pre-order: when a node at `level` is popped, path[..level] are its ancestors
        let mut path: Vec<&CostNode> = Vec::new();
        let mut stack: Vec<(&CostNode, usize)> = vec![(self, 0)];
        while let Some((node, level)) = stack.pop() {
            path.truncate(level);
            path.push(node);
            if &node.id == id {
                return Some(path);
            }
            stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
        }
        None
    }
}

impl Drop for CostNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

impl fmt::Display for CostNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numbering.is_empty() {
            write!(f, "{}", self.description)
        } else {
            write!(f, "{} {}", self.numbering, self.description)
        }
    }
}

pub struct NodeIter<'a> {
    stack: Vec<&'a CostNode>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a CostNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Find a node anywhere in the forest.
pub fn find_node<'a>(forest: &'a [CostNode], id: &NodeId) -> Option<&'a CostNode> {
    forest.iter().find_map(|root| root.find(id))
}

/// Path from the owning budget root down to `id`.
pub fn path_to<'a>(forest: &'a [CostNode], id: &NodeId) -> Option<Vec<&'a CostNode>> {
    forest.iter().find_map(|root| root.path_to(id))
}

/// Pre-order traversal over every tree of the forest.
pub fn iter_forest(forest: &[CostNode]) -> impl Iterator<Item = &CostNode> {
    forest.iter().flat_map(CostNode::iter)
}
