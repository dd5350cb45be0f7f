//! In-memory state store implementation for the Flowline Platform
//!
//! This crate provides in-memory implementations of the persistence
//! contracts defined in the flowline-core crate. It is primarily useful for
//! development, testing, and simple deployments where durability across
//! restarts is not required. The execution repository enforces the
//! optimistic-concurrency save contract, so racing writers are rejected the
//! same way a database-backed adapter would reject them.

use std::sync::Arc;

pub mod repositories;
pub use repositories::{InMemoryWorkflowDefinitionRepository, InMemoryWorkflowExecutionRepository};


/// Provider bundling the in-memory repositories behind shared handles
pub struct InMemoryStateStore {
    executions: Arc<InMemoryWorkflowExecutionRepository>,
    definitions: Arc<InMemoryWorkflowDefinitionRepository>,
}

impl InMemoryStateStore {
    /// Create a new in-memory state store
    pub fn new() -> Self {
        Self {
            executions: Arc::new(InMemoryWorkflowExecutionRepository::new()),
            definitions: Arc::new(InMemoryWorkflowDefinitionRepository::new()),
        }
    }

    /// Handle to the execution repository
    pub fn execution_repository(&self) -> Arc<InMemoryWorkflowExecutionRepository> {
        self.executions.clone()
    }

    /// Handle to the definition repository
    pub fn definition_repository(&self) -> Arc<InMemoryWorkflowDefinitionRepository> {
        self.definitions.clone()
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}
