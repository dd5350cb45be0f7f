use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{mismatched_kind, prior_result_data, StepExecutor};
use crate::domain::condition::ConditionEvaluator;
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `Condition` steps by evaluating an expression against a prior
/// step's result payload
///
/// A missing prior reference evaluates against null and yields false; a
/// malformed expression is a step failure.
pub struct ConditionExecutor {
    evaluator: Arc<dyn ConditionEvaluator>,
}

impl ConditionExecutor {
    /// Create a new condition executor
    pub fn new(evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self { evaluator }
    }
}

#[async_trait]
impl StepExecutor for ConditionExecutor {
    fn step_type(&self) -> &str {
        "Condition"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (condition, previous_step_data) = match &step.kind {
            StepKind::Condition {
                condition,
                previous_step_data,
            } => (condition, previous_step_data),
            other => return Err(mismatched_kind("Condition", other)),
        };

        if condition.is_empty() {
            return Err(EngineError::StepExecution(
                "Condition step requires condition expression".to_string(),
            ));
        }

        let context = previous_step_data
            .as_ref()
            .and_then(|prior_id| prior_result_data(execution, prior_id))
            .map(|packet| packet.as_value().clone())
            .unwrap_or(Value::Null);

        let outcome = self.evaluator.evaluate(condition, &context)?;

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            result = outcome,
            "Condition evaluated"
        );

        Ok(DataPacket::new(json!({
            "condition": condition,
            "result": outcome,
        })))
    }
}
