//! Hierarchical cost-structure engine.
//!
//! Rebuilds budget forests from flat cost records, resolves the composition
//! breakdown of each cost node and tracks expand/collapse and selection state
//! for a tree view.
//!
//! Layers, inner to outer:
//! - [`domain`]: entities and the pure tree/join/navigation algorithms
//! - [`application`]: snapshot loading and tree building services
//! - [`infrastructure`]: I/O boundary traits and wiring
//! - [`cli`]: the `costtree` command line

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use domain::{
    build_forest, classify, resolve_compositions, CostNode, NavigationState, NodeId,
    UnitRegistry,
};
