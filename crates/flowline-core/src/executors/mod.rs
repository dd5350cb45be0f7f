//! Step executors, one per step type
//!
//! Executors implement a uniform contract: given a step and an immutable
//! snapshot of the execution so far, produce a result payload or an error.
//! Timing, persistence, and `StepResult` assembly are the orchestrator's
//! responsibility; executors never mutate execution state.

use async_trait::async_trait;
use std::sync::Arc;

use crate::collaborators::{
    AiService, ApprovalStore, FunctionRegistry, NotificationService, QueryService,
};
use crate::domain::condition::{ConditionEvaluator, JmespathEvaluator};
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepId, StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

mod ai_analysis;
mod approval;
mod condition;
mod data_query;
mod function_call;
mod notification;

pub use ai_analysis::AiAnalysisExecutor;
pub use approval::ApprovalExecutor;
pub use condition::ConditionExecutor;
pub use data_query::DataQueryExecutor;
pub use function_call::FunctionCallExecutor;
pub use notification::NotificationExecutor;

/// A handler for one step type
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// The step type this executor handles
    fn step_type(&self) -> &str;

    /// Execute the step against an immutable execution snapshot
    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError>;
}

/// Result payload of a named prior step, if it produced one
pub(crate) fn prior_result_data<'a>(
    execution: &'a WorkflowExecution,
    step_id: &StepId,
) -> Option<&'a DataPacket> {
    execution
        .step_results
        .iter()
        .find(|r| &r.step_id == step_id)
        .and_then(|r| r.result.as_ref())
}

pub(crate) fn mismatched_kind(expected: &str, kind: &StepKind) -> EngineError {
    EngineError::StepExecution(format!(
        "{} executor received a {} step",
        expected,
        kind.type_name()
    ))
}

/// The full set of step executors, dispatched by step kind
pub struct ExecutorSet {
    data_query: DataQueryExecutor,
    ai_analysis: AiAnalysisExecutor,
    function_call: FunctionCallExecutor,
    approval: ApprovalExecutor,
    notification: NotificationExecutor,
    condition: ConditionExecutor,
}

impl ExecutorSet {
    /// Create an executor set over the given collaborators, with JMESPath
    /// condition evaluation
    pub fn new(
        query_service: Arc<dyn QueryService>,
        ai_service: Arc<dyn AiService>,
        function_registry: Arc<dyn FunctionRegistry>,
        notification_service: Arc<dyn NotificationService>,
        approval_store: Arc<dyn ApprovalStore>,
    ) -> Self {
        Self::with_condition_evaluator(
            query_service,
            ai_service,
            function_registry,
            notification_service,
            approval_store,
            Arc::new(JmespathEvaluator),
        )
    }

    /// Create an executor set with a custom condition evaluator
    pub fn with_condition_evaluator(
        query_service: Arc<dyn QueryService>,
        ai_service: Arc<dyn AiService>,
        function_registry: Arc<dyn FunctionRegistry>,
        notification_service: Arc<dyn NotificationService>,
        approval_store: Arc<dyn ApprovalStore>,
        condition_evaluator: Arc<dyn ConditionEvaluator>,
    ) -> Self {
        Self {
            data_query: DataQueryExecutor::new(query_service),
            ai_analysis: AiAnalysisExecutor::new(ai_service),
            function_call: FunctionCallExecutor::new(function_registry),
            approval: ApprovalExecutor::new(approval_store),
            notification: NotificationExecutor::new(notification_service),
            condition: ConditionExecutor::new(condition_evaluator),
        }
    }

    /// Resolve the executor for a step kind
    pub fn executor_for(&self, kind: &StepKind) -> &dyn StepExecutor {
        match kind {
            StepKind::DataQuery { .. } => &self.data_query,
            StepKind::AiAnalysis { .. } => &self.ai_analysis,
            StepKind::FunctionCall { .. } => &self.function_call,
            StepKind::Approval { .. } => &self.approval,
            StepKind::Notification { .. } => &self.notification,
            StepKind::Condition { .. } => &self.condition,
        }
    }
}
