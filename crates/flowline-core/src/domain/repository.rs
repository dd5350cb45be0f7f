//! Repository traits for the Flowline engine
//!
//! This module defines the persistence contracts consumed by the engine.
//! External crates implement these traits to provide durable storage; the
//! engine only ever stores and retrieves whole-execution snapshots and never
//! expects an adapter to mutate business fields.

use async_trait::async_trait;

use super::execution::{ExecutionId, WorkflowExecution};
use super::workflow::{WorkflowDefinition, WorkflowId};
use crate::EngineError;

/// Repository for workflow executions
///
/// `save` is an upsert keyed by execution id and must be atomic per id: a
/// concurrent reader never observes a partially written record. Writes carry
/// an optimistic concurrency token — the engine bumps
/// `WorkflowExecution::version` before each save, and an implementation must
/// reject with [`EngineError::Conflict`] any write whose version is not
/// exactly one above the stored record's. External writers (e.g. a
/// cancellation applied directly to the store) must follow the same rule.
#[async_trait]
pub trait WorkflowExecutionRepository: Send + Sync {
    /// Find an execution by ID
    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, EngineError>;

    /// Save an execution snapshot
    async fn save(&self, execution: &WorkflowExecution) -> Result<(), EngineError>;

    /// List all executions of a workflow, for audit surfaces
    async fn list_for_workflow(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<WorkflowExecution>, EngineError>;
}

/// Repository for workflow definitions
///
/// Definitions are authored and edited outside the engine; the engine reads
/// them. `save` exists for hosting systems and tests.
#[async_trait]
pub trait WorkflowDefinitionRepository: Send + Sync {
    /// Find a workflow definition by ID
    async fn find_by_id(&self, id: &WorkflowId) -> Result<Option<WorkflowDefinition>, EngineError>;

    /// Find a workflow definition by ID, only if it is active
    async fn find_active_by_id(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<WorkflowDefinition>, EngineError> {
        Ok(self.find_by_id(id).await?.filter(|d| d.is_active))
    }

    /// Save a workflow definition
    async fn save(&self, definition: &WorkflowDefinition) -> Result<(), EngineError>;

    /// List all workflow definitions
    async fn list(&self) -> Result<Vec<WorkflowDefinition>, EngineError>;
}

/// Memory implementations for testing
#[cfg(feature = "testing")]
pub mod memory {
    use super::*;
    use dashmap::mapref::entry::Entry;
    use dashmap::DashMap;
    use std::sync::RwLock;

    /// In-memory execution repository backed by a concurrent map
    pub struct MemoryWorkflowExecutionRepository {
        executions: DashMap<String, WorkflowExecution>,
        workflow_index: DashMap<String, Vec<String>>,
    }

    impl MemoryWorkflowExecutionRepository {
        /// Create a new memory execution repository
        pub fn new() -> Self {
            Self {
                executions: DashMap::with_capacity(64),
                workflow_index: DashMap::with_capacity(16),
            }
        }
    }

    impl Default for MemoryWorkflowExecutionRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WorkflowExecutionRepository for MemoryWorkflowExecutionRepository {
        async fn find_by_id(
            &self,
            id: &ExecutionId,
        ) -> Result<Option<WorkflowExecution>, EngineError> {
            Ok(self.executions.get(&id.0).map(|e| e.clone()))
        }

        async fn save(&self, execution: &WorkflowExecution) -> Result<(), EngineError> {
            match self.executions.entry(execution.id.0.clone()) {
                Entry::Occupied(mut entry) => {
                    let stored_version = entry.get().version;
                    if execution.version != stored_version + 1 {
                        return Err(EngineError::Conflict(format!(
                            "stale write for execution {}: attempted version {}, stored version {}",
                            execution.id.0, execution.version, stored_version
                        )));
                    }
                    entry.insert(execution.clone());
                }
                Entry::Vacant(entry) => {
                    entry.insert(execution.clone());
                }
            }

            // Update workflow index
            let mut ids = self
                .workflow_index
                .entry(execution.workflow_id.0.clone())
                .or_default();
            if !ids.contains(&execution.id.0) {
                ids.push(execution.id.0.clone());
            }

            Ok(())
        }

        async fn list_for_workflow(
            &self,
            workflow_id: &WorkflowId,
        ) -> Result<Vec<WorkflowExecution>, EngineError> {
            let executions = if let Some(ids) = self.workflow_index.get(&workflow_id.0) {
                ids.iter()
                    .filter_map(|id| self.executions.get(id).map(|e| e.clone()))
                    .collect()
            } else {
                Vec::new()
            };

            Ok(executions)
        }
    }

    /// In-memory workflow definition repository
    pub struct MemoryWorkflowDefinitionRepository {
        definitions: RwLock<std::collections::HashMap<String, WorkflowDefinition>>,
    }

    impl MemoryWorkflowDefinitionRepository {
        /// Create a new memory definition repository
        pub fn new() -> Self {
            Self {
                definitions: RwLock::new(std::collections::HashMap::new()),
            }
        }
    }

    impl Default for MemoryWorkflowDefinitionRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WorkflowDefinitionRepository for MemoryWorkflowDefinitionRepository {
        async fn find_by_id(
            &self,
            id: &WorkflowId,
        ) -> Result<Option<WorkflowDefinition>, EngineError> {
            let definitions = self.definitions.read().map_err(|e| {
                EngineError::StateStore(format!("Failed to acquire read lock: {}", e))
            })?;

            Ok(definitions.get(&id.0).cloned())
        }

        async fn save(&self, definition: &WorkflowDefinition) -> Result<(), EngineError> {
            let mut definitions = self.definitions.write().map_err(|e| {
                EngineError::StateStore(format!("Failed to acquire write lock: {}", e))
            })?;

            definitions.insert(definition.id.0.clone(), definition.clone());

            Ok(())
        }

        async fn list(&self) -> Result<Vec<WorkflowDefinition>, EngineError> {
            let definitions = self.definitions.read().map_err(|e| {
                EngineError::StateStore(format!("Failed to acquire read lock: {}", e))
            })?;

            Ok(definitions.values().cloned().collect())
        }
    }

}
