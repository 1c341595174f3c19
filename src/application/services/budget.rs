//! Budget snapshot service
//!
//! Loads the flat record arrays of a snapshot directory and turns them into
//! an in-memory cost tree ready for navigation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::{
    forest, Budget, CompositionIndex, CompositionLine, CostNode, CostRecord, NodeId,
    SubtotalLink, TreeBuilder, Unit, UnitRegistry,
};
use crate::infrastructure::traits::FileSystem;

pub const BUDGETS_FILE: &str = "budgets.json";
pub const COST_RECORDS_FILE: &str = "cost_records.json";
pub const SUBTOTAL_LINKS_FILE: &str = "subtotal_links.json";
pub const COMPOSITION_LINES_FILE: &str = "composition_lines.json";
pub const UNITS_FILE: &str = "units.json";

/// The flat record arrays as delivered by the data store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub budgets: Vec<Budget>,
    pub records: Vec<CostRecord>,
    pub links: Vec<SubtotalLink>,
    pub lines: Vec<CompositionLine>,
    pub units: Vec<Unit>,
}

/// Summary numbers of a built tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub budgets: usize,
    pub records: usize,
    pub max_depth: usize,
    pub leaves: usize,
    pub subtotal_links: usize,
    pub composition_lines: usize,
}

/// Built forest together with the lookups the renderer needs.
#[derive(Debug)]
pub struct CostTree {
    pub forest: Vec<CostNode>,
    pub compositions: CompositionIndex,
    pub units: UnitRegistry,
}

impl CostTree {
    pub fn find(&self, id: &NodeId) -> Option<&CostNode> {
        forest::find_node(&self.forest, id)
    }

    pub fn stats(&self) -> TreeStats {
        let nodes: Vec<&CostNode> = forest::iter_forest(&self.forest).collect();
        TreeStats {
            budgets: self.forest.len(),
            records: nodes.iter().filter(|n| !n.is_budget_root()).count(),
            max_depth: nodes.iter().map(|n| n.depth).max().unwrap_or(0),
            leaves: nodes
                .iter()
                .filter(|n| n.is_leaf() && !n.is_budget_root())
                .count(),
            subtotal_links: self.compositions.link_count(),
            composition_lines: self.compositions.line_count(),
        }
    }
}

/// Service for loading snapshots and building cost trees.
pub struct BudgetService {
    fs: Arc<dyn FileSystem>,
    strict: bool,
}

impl BudgetService {
    /// Create a new budget service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, strict: false }
    }

    /// Treat unresolvable parents as errors.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Read the record arrays from `dir`.
    ///
    /// Budgets and cost records are required; subtotal links, composition
    /// lines and units default to empty when their file is absent.
    #[instrument(level = "debug", skip(self))]
    pub fn load_snapshot(&self, dir: &Path) -> ApplicationResult<Snapshot> {
        if !self.fs.is_dir(dir) {
            return Err(ApplicationError::Snapshot {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let snapshot = Snapshot {
            budgets: self.read_array(&dir.join(BUDGETS_FILE), true)?,
            records: self.read_array(&dir.join(COST_RECORDS_FILE), true)?,
            links: self.read_array(&dir.join(SUBTOTAL_LINKS_FILE), false)?,
            lines: self.read_array(&dir.join(COMPOSITION_LINES_FILE), false)?,
            units: self.read_array(&dir.join(UNITS_FILE), false)?,
        };
        debug!(
            "snapshot: {} budgets, {} records, {} links, {} lines, {} units",
            snapshot.budgets.len(),
            snapshot.records.len(),
            snapshot.links.len(),
            snapshot.lines.len(),
            snapshot.units.len()
        );
        Ok(snapshot)
    }

    /// Build the forest and lookups from an already loaded snapshot.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, snapshot: Snapshot) -> ApplicationResult<CostTree> {
        let forest = TreeBuilder::new()
            .strict(self.strict)
            .build_forest(&snapshot.records, &snapshot.budgets)?;
        info!(
            "built {} budget trees from {} records",
            forest.len(),
            snapshot.records.len()
        );
        Ok(CostTree {
            forest,
            compositions: CompositionIndex::new(snapshot.links, snapshot.lines),
            units: UnitRegistry::new(snapshot.units),
        })
    }

    /// Load and build in one step.
    pub fn load(&self, dir: &Path) -> ApplicationResult<CostTree> {
        let snapshot = self.load_snapshot(dir)?;
        self.build(snapshot)
    }

    fn read_array<T: DeserializeOwned>(
        &self,
        path: &Path,
        required: bool,
    ) -> ApplicationResult<Vec<T>> {
        if !self.fs.is_file(path) {
            if required {
                return Err(ApplicationError::Snapshot {
                    path: PathBuf::from(path),
                    message: "missing required file".to_string(),
                });
            }
            debug!("optional snapshot file absent: {}", path.display());
            return Ok(Vec::new());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read snapshot file", path)?;
        serde_json::from_str(&content).with_snapshot_path(path)
    }
}
