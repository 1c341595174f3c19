/*
Rendering of the cost forest into `termtree` trees.

The renderer owns visibility: a node's children are pushed only when the node
is expanded, so descending from a budget root reproduces the ancestor-chain
rule without consulting a separate visible set.
 */
use std::fmt::Display;

use colored::Colorize;
use termtree::Tree;

use crate::cli::output::paint_level;
use crate::domain::{
    classify_with, format_currency, format_quantity, CostNode, NavigationState, NumberFormat,
    UnitRegistry,
};

/// Everything a label needs besides the node itself.
pub struct RenderContext<'a> {
    pub state: &'a NavigationState,
    pub units: &'a UnitRegistry,
    pub format: &'a NumberFormat,
    pub neutral_status: &'a str,
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self, ctx: &RenderContext<'_>) -> Tree<String>;

    /// Paint the tree as text and release it again without recursing.
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let tree = self.to_tree_string(ctx);
        let text = tree.to_string();
        release(tree);
        text
    }
}

impl TreeNodeConvert for CostNode {
    /// Built bottom-up with an explicit stack: a node's leaves are the trees
    /// pushed to `built` after its mark.
    fn to_tree_string(&self, ctx: &RenderContext<'_>) -> Tree<String> {
        let mut stack: Vec<(&CostNode, Option<usize>)> = vec![(self, None)];
        let mut built: Vec<Tree<String>> = Vec::new();

        while let Some((node, mark)) = stack.pop() {
            match mark {
                None if ctx.state.is_expanded(&node.id) && !node.is_leaf() => {
                    stack.push((node, Some(built.len())));
                    stack.extend(node.children.iter().rev().map(|child| (child, None)));
                }
                None => built.push(Tree::new(node_label(node, ctx))),
                Some(mark) => {
                    let mut tree = Tree::new(node_label(node, ctx));
                    tree.leaves = built.split_off(mark);
                    built.push(tree);
                }
            }
        }
        built
            .pop()
            .unwrap_or_else(|| Tree::new(node_label(self, ctx)))
    }
}

/// Drop a tree level by level instead of through nested `Vec` drops.
pub fn release<D: Display>(tree: Tree<D>) {
    let mut pending = vec![tree];
    while let Some(mut tree) = pending.pop() {
        pending.append(&mut tree.leaves);
    }
}

/// Disclosure marker: open, closed, or leaf.
fn marker(node: &CostNode, state: &NavigationState) -> &'static str {
    if node.is_leaf() {
        "·"
    } else if state.is_expanded(&node.id) {
        "▾"
    } else {
        "▸"
    }
}

/// One-line label of a node, colored by its level.
pub fn node_label(node: &CostNode, ctx: &RenderContext<'_>) -> String {
    let marker = marker(node, ctx.state);
    let label = if node.is_budget_root() {
        format!("{} {}", marker, node.budget_name.bold())
    } else {
        let text = format!(
            "{} {}  {} {} × {} = {}",
            marker,
            node,
            format_quantity(node.quantity, ctx.format),
            ctx.units.abbreviate(&node.unit_id),
            format_currency(node.unit_cost, ctx.format),
            format_currency(node.partial_cost, ctx.format),
        );
        let category = classify_with(node.depth, &node.status, ctx.neutral_status);
        paint_level(&text, category).to_string()
    };

    if ctx.state.is_selected(&node.id) {
        label.reversed().to_string()
    } else {
        label
    }
}
