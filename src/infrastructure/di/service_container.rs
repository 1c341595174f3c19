//! Service container for dependency injection
//!
//! Wires up the budget service with its dependencies.

use std::sync::Arc;

use crate::application::services::BudgetService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Snapshot loading and tree building
    pub budget_service: BudgetService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let budget_service = BudgetService::new(Arc::clone(&fs)).with_strict(settings.strict);

        Self {
            settings,
            fs,
            budget_service,
        }
    }
}
