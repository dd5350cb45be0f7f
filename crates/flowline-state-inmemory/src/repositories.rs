//! Repository implementations backed by async read-write locks

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use flowline_core::{
    EngineError, ExecutionId, WorkflowDefinition, WorkflowDefinitionRepository, WorkflowExecution,
    WorkflowExecutionRepository, WorkflowId,
};

/// In-memory workflow execution repository
///
/// Saves are compare-and-swap on the execution's version: a write whose
/// version is not exactly one above the stored record's is rejected with
/// a conflict, which is what guards two resume calls racing on the same
/// execution id.
pub struct InMemoryWorkflowExecutionRepository {
    executions: RwLock<HashMap<String, WorkflowExecution>>,
}

impl InMemoryWorkflowExecutionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            executions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored executions
    pub async fn len(&self) -> usize {
        self.executions.read().await.len()
    }

    /// Whether the repository is empty
    pub async fn is_empty(&self) -> bool {
        self.executions.read().await.is_empty()
    }
}

impl Default for InMemoryWorkflowExecutionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowExecutionRepository for InMemoryWorkflowExecutionRepository {
    async fn find_by_id(&self, id: &ExecutionId) -> Result<Option<WorkflowExecution>, EngineError> {
        let executions = self.executions.read().await;
        Ok(executions.get(&id.0).cloned())
    }

    async fn save(&self, execution: &WorkflowExecution) -> Result<(), EngineError> {
        let mut executions = self.executions.write().await;

        if let Some(stored) = executions.get(&execution.id.0) {
            if execution.version != stored.version + 1 {
                return Err(EngineError::Conflict(format!(
                    "stale write for execution {}: attempted version {}, stored version {}",
                    execution.id.0, execution.version, stored.version
                )));
            }
        }

        debug!(
            execution_id = %execution.id.0,
            version = execution.version,
            status = ?execution.status,
            "Saving execution"
        );

        executions.insert(execution.id.0.clone(), execution.clone());
        Ok(())
    }

    async fn list_for_workflow(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<WorkflowExecution>, EngineError> {
        let executions = self.executions.read().await;
        Ok(executions
            .values()
            .filter(|e| &e.workflow_id == workflow_id)
            .cloned()
            .collect())
    }
}

/// In-memory workflow definition repository
pub struct InMemoryWorkflowDefinitionRepository {
    definitions: RwLock<HashMap<String, WorkflowDefinition>>,
}

impl InMemoryWorkflowDefinitionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryWorkflowDefinitionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowDefinitionRepository for InMemoryWorkflowDefinitionRepository {
    async fn find_by_id(&self, id: &WorkflowId) -> Result<Option<WorkflowDefinition>, EngineError> {
        let definitions = self.definitions.read().await;
        Ok(definitions.get(&id.0).cloned())
    }

    async fn save(&self, definition: &WorkflowDefinition) -> Result<(), EngineError> {
        definition.validate()?;

        let mut definitions = self.definitions.write().await;
        definitions.insert(definition.id.0.clone(), definition.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorkflowDefinition>, EngineError> {
        let definitions = self.definitions.read().await;
        Ok(definitions.values().cloned().collect())
    }
}
