use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{mismatched_kind, StepExecutor};
use crate::collaborators::FunctionRegistry;
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `FunctionCall` steps through the function registry
pub struct FunctionCallExecutor {
    registry: Arc<dyn FunctionRegistry>,
}

impl FunctionCallExecutor {
    /// Create a new function call executor
    pub fn new(registry: Arc<dyn FunctionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl StepExecutor for FunctionCallExecutor {
    fn step_type(&self) -> &str {
        "FunctionCall"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (function_name, parameters) = match &step.kind {
            StepKind::FunctionCall {
                function_name,
                parameters,
            } => (function_name, parameters),
            other => return Err(mismatched_kind("FunctionCall", other)),
        };

        if function_name.is_empty() {
            return Err(EngineError::StepExecution(
                "FunctionCall step requires functionName".to_string(),
            ));
        }

        let result = self.registry.call(function_name, parameters).await?;

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            function_name = %function_name,
            "FunctionCall executed"
        );

        Ok(DataPacket::new(json!({
            "functionName": function_name,
            "parameters": parameters,
            "result": result,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::BuiltinFunctionRegistry;
    use crate::domain::workflow::{StepId, WorkflowId};

    fn execution() -> WorkflowExecution {
        WorkflowExecution::new(WorkflowId("wf".to_string()), "user-1", "manual")
    }

    fn call_step(function_name: &str) -> WorkflowStep {
        WorkflowStep {
            id: StepId("call".to_string()),
            name: "Call".to_string(),
            kind: StepKind::FunctionCall {
                function_name: function_name.to_string(),
                parameters: json!({"to": "ops@example.com"}),
            },
            on_failure: None,
        }
    }

    #[tokio::test]
    async fn test_dispatches_registered_function() {
        let registry = Arc::new(BuiltinFunctionRegistry::new());
        registry.register("send_email", |params| async move {
            Ok(json!({"status": "sent", "recipient": params["to"]}))
        });
        let executor = FunctionCallExecutor::new(registry);

        let result = executor
            .execute(&call_step("send_email"), &execution())
            .await
            .unwrap();

        assert_eq!(result.as_value()["functionName"], "send_email");
        assert_eq!(result.as_value()["result"]["status"], "sent");
        assert_eq!(result.as_value()["result"]["recipient"], "ops@example.com");
    }

    #[tokio::test]
    async fn test_unregistered_function_fails() {
        let executor = FunctionCallExecutor::new(Arc::new(BuiltinFunctionRegistry::new()));

        let result = executor.execute(&call_step("create_excel"), &execution()).await;
        match result {
            Err(EngineError::UnregisteredFunction(name)) => {
                assert_eq!(name, "create_excel");
            }
            other => panic!("Expected UnregisteredFunction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_function_name_fails() {
        let executor = FunctionCallExecutor::new(Arc::new(BuiltinFunctionRegistry::new()));

        let result = executor.execute(&call_step(""), &execution()).await;
        match result {
            Err(EngineError::StepExecution(msg)) => {
                assert!(msg.contains("requires functionName"));
            }
            other => panic!("Expected StepExecution, got {:?}", other),
        }
    }
}
