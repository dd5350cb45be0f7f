//! Collaborator interfaces consumed by the step executors
//!
//! The engine orchestrates steps but never implements their side effects.
//! Hosting systems supply implementations of these traits; query execution,
//! AI inference, notification delivery, and approval storage all live behind
//! them. `QueryService` implementations are expected to be tenant-scoped at
//! construction time.

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use crate::domain::execution::{ApprovalId, ExecutionId};
use crate::domain::workflow::{QueryFilter, QueryOrder};
use crate::EngineError;

/// A read request against the host data store
#[derive(Debug, Clone)]
pub struct QueryRequest {
    /// Table to read from
    pub table: String,

    /// Filters applied to the read
    pub filters: Vec<QueryFilter>,

    /// Column selection, `*` when absent
    pub select: Option<String>,

    /// Row limit
    pub limit: usize,

    /// Result ordering
    pub order_by: Option<QueryOrder>,
}

/// Read-only access to the host data store
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Execute a read and return the matching rows
    async fn query(&self, request: &QueryRequest) -> Result<Vec<Value>, EngineError>;
}

/// Text generation service
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generate text for a prompt under the given role hint
    async fn generate(&self, prompt: &str, role: &str) -> Result<String, EngineError>;
}

/// Dispatches named side-effecting functions
#[async_trait]
pub trait FunctionRegistry: Send + Sync {
    /// Call a registered function by name
    ///
    /// Fails with [`EngineError::UnregisteredFunction`] for unknown names.
    async fn call(&self, name: &str, parameters: &Value) -> Result<Value, EngineError>;
}

/// A notification addressed to one recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification title
    pub title: String,

    /// Notification body
    pub message: String,

    /// Notification kind tag (e.g. "info", "warning")
    pub kind: String,
}

/// Delivers notifications to recipients
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Send one notification to one recipient
    async fn notify(&self, recipient: &str, notification: &Notification)
        -> Result<(), EngineError>;
}

/// Stores pending approval requests
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Create a pending approval record for an execution
    async fn create_approval(
        &self,
        execution_id: &ExecutionId,
        approver_id: &str,
        data: &Value,
    ) -> Result<ApprovalId, EngineError>;
}

type WorkflowFunction =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, EngineError>> + Send + Sync>;

/// Function registry backed by a map of registered async closures
///
/// Starts empty; hosting code registers its function set at startup.
pub struct BuiltinFunctionRegistry {
    functions: RwLock<HashMap<String, WorkflowFunction>>,
}

impl BuiltinFunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            functions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a function under a name, replacing any previous registration
    pub fn register<F, Fut>(&self, name: &str, function: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, EngineError>> + Send + 'static,
    {
        let wrapped: WorkflowFunction = Arc::new(move |params| Box::pin(function(params)));

        if let Ok(mut functions) = self.functions.write() {
            functions.insert(name.to_string(), wrapped);
        }
    }

    /// Names of all registered functions
    pub fn registered_names(&self) -> Vec<String> {
        self.functions
            .read()
            .map(|functions| functions.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for BuiltinFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FunctionRegistry for BuiltinFunctionRegistry {
    async fn call(&self, name: &str, parameters: &Value) -> Result<Value, EngineError> {
        let function = {
            let functions = self.functions.read().map_err(|e| {
                EngineError::StateStore(format!("Failed to acquire read lock: {}", e))
            })?;
            functions.get(name).cloned()
        };

        match function {
            Some(function) => function(parameters.clone()).await,
            None => Err(EngineError::UnregisteredFunction(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_registry_call() {
        let registry = BuiltinFunctionRegistry::new();
        registry.register("echo", |params| async move {
            Ok(json!({"echoed": params}))
        });

        let result = registry.call("echo", &json!({"x": 1})).await.unwrap();
        assert_eq!(result["echoed"]["x"], 1);
    }

    #[tokio::test]
    async fn test_registry_unregistered() {
        let registry = BuiltinFunctionRegistry::new();

        match registry.call("send_fax", &Value::Null).await {
            Err(EngineError::UnregisteredFunction(name)) => {
                assert_eq!(name, "send_fax");
            }
            other => panic!("Expected UnregisteredFunction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_registry_replacement_and_names() {
        let registry = BuiltinFunctionRegistry::new();
        registry.register("f", |_| async move { Ok(json!(1)) });
        registry.register("f", |_| async move { Ok(json!(2)) });

        assert_eq!(registry.registered_names(), vec!["f".to_string()]);
        let result = registry.call("f", &Value::Null).await.unwrap();
        assert_eq!(result, json!(2));
    }

    #[tokio::test]
    async fn test_registry_function_error_propagates() {
        let registry = BuiltinFunctionRegistry::new();
        registry.register("boom", |_| async move {
            Err(EngineError::External("downstream unavailable".to_string()))
        });

        match registry.call("boom", &Value::Null).await {
            Err(EngineError::External(msg)) => {
                assert_eq!(msg, "downstream unavailable");
            }
            other => panic!("Expected External, got {:?}", other),
        }
    }
}
