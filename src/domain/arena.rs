//! Arena used as scaffolding while a forest is assembled.
//!
//! Records arrive unordered, so parent links are resolved first by index and
//! depth is assigned afterwards by walking down from the budget roots. Once
//! every node is placed the arena is drained into owned [`CostNode`] trees.

use std::collections::{HashSet, VecDeque};

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{Budget, CostRecord};
use crate::domain::forest::CostNode;

/// Data payload for arena nodes.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Synthetic budget root
    Budget(Budget),
    /// Node backed by a cost record
    Record(CostRecord),
}

/// Node in the assembly arena.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: NodeData,
    /// Index of the parent node, None for budget roots and unattached records
    pub parent: Option<Index>,
    /// Indices of child nodes, in attachment order
    pub children: Vec<Index>,
    /// Distance to the budget root, None until reached from a root
    pub depth: Option<usize>,
}

/// Arena-based forest under construction.
#[derive(Debug, Default)]
pub struct CostArena {
    arena: Arena<ArenaNode>,
    roots: Vec<Index>,
}

impl CostArena {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            roots: Vec::new(),
        }
    }

    /// Insert a budget root; roots keep their insertion order.
    pub fn insert_root(&mut self, budget: Budget) -> Index {
        let idx = self.arena.insert(ArenaNode {
            data: NodeData::Budget(budget),
            parent: None,
            children: Vec::new(),
            depth: Some(0),
        });
        self.roots.push(idx);
        idx
    }

    /// Insert a record node without linking it yet.
    pub fn insert_record(&mut self, record: CostRecord) -> Index {
        self.arena.insert(ArenaNode {
            data: NodeData::Record(record),
            parent: None,
            children: Vec::new(),
            depth: None,
        })
    }

    /// Link `child` under `parent`. Both indices must be live.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, child: Index, parent: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Assign depth breadth-first from every root.
    ///
    /// Returns the number of nodes reached. Nodes sitting on or below a
    /// parent cycle are never reached and keep `depth == None`.
    #[instrument(level = "debug", skip(self))]
    pub fn assign_depths(&mut self) -> usize {
        let mut visited: HashSet<Index> = HashSet::with_capacity(self.arena.len());
        let mut queue: VecDeque<(Index, usize)> = self.roots.iter().map(|&r| (r, 0)).collect();

        while let Some((idx, depth)) = queue.pop_front() {
            if !visited.insert(idx) {
                continue;
            }
            if let Some(node) = self.arena.get_mut(idx) {
                node.depth = Some(depth);
                for &child in &node.children {
                    queue.push_back((child, depth + 1));
                }
            }
        }
        visited.len()
    }

    /// Indices of nodes that were not reached by [`assign_depths`](Self::assign_depths).
    pub fn unreached(&self) -> impl Iterator<Item = (Index, &ArenaNode)> {
        self.arena.iter().filter(|(_, node)| node.depth.is_none())
    }

    /// Drain the arena into owned trees, one per root, in root order.
    ///
    /// Unreached nodes are discarded, callers check [`unreached`](Self::unreached) first.
    #[instrument(level = "debug", skip(self))]
    pub fn into_forest(mut self) -> Vec<CostNode> {
        let roots = std::mem::take(&mut self.roots);
        roots
            .into_iter()
            .filter_map(|root| {
                let budget_name = match self.arena.get(root).map(|n| &n.data) {
                    Some(NodeData::Budget(b)) => b.name.clone(),
                    _ => return None,
                };
                self.take_subtree(root, &budget_name)
            })
            .collect()
    }

    /// Post-order drain with an explicit stack; chains may be arbitrarily deep.
    ///
    /// A stack entry carries `None` on first visit and, once its children are
    /// scheduled, the length of `built` at that moment: everything pushed to
    /// `built` after the mark is a finished child, in order.
    fn take_subtree(&mut self, root: Index, budget_name: &str) -> Option<CostNode> {
        let mut stack: Vec<(Index, Option<usize>)> = vec![(root, None)];
        let mut built: Vec<CostNode> = Vec::new();

        while let Some((idx, mark)) = stack.pop() {
            match mark {
                None => {
                    let Some(node) = self.arena.get(idx) else {
                        continue;
                    };
                    stack.push((idx, Some(built.len())));
                    stack.extend(node.children.iter().rev().map(|&child| (child, None)));
                }
                Some(mark) => {
                    let Some(node) = self.arena.remove(idx) else {
                        continue;
                    };
                    let depth = node.depth.unwrap_or_default();
                    let mut cost_node = match node.data {
                        NodeData::Budget(budget) => CostNode::budget_root(&budget),
                        NodeData::Record(record) => {
                            CostNode::from_record(record, budget_name, depth)
                        }
                    };
                    cost_node.children = built.split_off(mark);
                    built.push(cost_node);
                }
            }
        }
        built.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_linked_chain_when_assigning_depths_then_counts_from_root() {
        let mut arena = CostArena::default();
        let root = arena.insert_root(Budget::new("B1", "Residential"));
        let a = arena.insert_record(CostRecord::new("A", None, "B1"));
        let b = arena.insert_record(CostRecord::new("B", Some("A"), "B1"));
        // link the grandchild before its parent is attached
        arena.attach(b, a);
        arena.attach(a, root);

        let reached = arena.assign_depths();

        assert_eq!(reached, 3);
        assert_eq!(arena.get_node(a).unwrap().depth, Some(1));
        assert_eq!(arena.get_node(b).unwrap().depth, Some(2));
        assert_eq!(arena.unreached().count(), 0);
    }

    #[test]
    fn given_self_loop_when_assigning_depths_then_node_stays_unreached() {
        let mut arena = CostArena::default();
        arena.insert_root(Budget::new("B1", "Residential"));
        let a = arena.insert_record(CostRecord::new("A", Some("A"), "B1"));
        arena.attach(a, a);

        arena.assign_depths();

        let unreached: Vec<_> = arena.unreached().map(|(idx, _)| idx).collect();
        assert_eq!(unreached, vec![a]);
    }

    #[test]
    fn given_built_arena_when_draining_then_returns_one_tree_per_root() {
        let mut arena = CostArena::default();
        let r1 = arena.insert_root(Budget::new("B1", "Residential"));
        arena.insert_root(Budget::new("B2", "Commercial"));
        let a = arena.insert_record(CostRecord::new("A", None, "B1"));
        arena.attach(a, r1);
        arena.assign_depths();

        let forest = arena.into_forest();

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].budget_name, "Residential");
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn given_deep_chain_when_draining_then_keeps_every_level() {
        let mut arena = CostArena::default();
        let mut parent = arena.insert_root(Budget::new("B1", "Residential"));
        for i in 0..5_000 {
            let child = arena.insert_record(CostRecord::new(format!("C{i}"), None, "B1"));
            arena.attach(child, parent);
            parent = child;
        }
        arena.assign_depths();

        let forest = arena.into_forest();

        assert_eq!(forest[0].len(), 5_001);
        assert_eq!(forest[0].max_depth(), 5_000);
    }
}
