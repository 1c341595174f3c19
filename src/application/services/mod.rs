//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod budget;

pub use budget::{
    BudgetService, CostTree, Snapshot, TreeStats, BUDGETS_FILE, COMPOSITION_LINES_FILE,
    COST_RECORDS_FILE, SUBTOTAL_LINKS_FILE, UNITS_FILE,
};
