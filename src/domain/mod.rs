//! Domain layer: entities and the cost-tree algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod composition;
pub mod entities;
pub mod error;
pub mod forest;
pub mod format;
pub mod level;
pub mod navigation;
pub mod units;

pub use builder::{build_forest, TreeBuilder};
pub use composition::{resolve_compositions, sort_by_category, CompositionIndex, SubtotalGroup};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use forest::{find_node, iter_forest, path_to, CostNode};
pub use format::{format_currency, format_number, format_quantity, NumberFormat};
pub use level::{classify, classify_with, LevelCategory, NEUTRAL_STATUS};
pub use navigation::{is_visible, visible_nodes, NavigationState, Selection};
pub use units::UnitRegistry;
