use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::execution::{
    ExecutionId, ExecutionStatus, StepResult, StepStatus, WorkflowExecution,
};
use crate::domain::repository::{WorkflowDefinitionRepository, WorkflowExecutionRepository};
use crate::domain::workflow::{StepKind, WorkflowDefinition, WorkflowId, WorkflowStep};
use crate::executors::ExecutorSet;
use crate::EngineError;

/// Service for executing workflows
///
/// Drives one `WorkflowExecution` from pending to a terminal or suspended
/// status, one step at a time, checkpointing the execution record after
/// every transition. Executor errors are folded into failed step results;
/// only unknown ids, invalid resume states, and persistence failures are
/// surfaced to the caller.
pub struct WorkflowExecutionService {
    /// Repository for workflow executions
    execution_repo: Arc<dyn WorkflowExecutionRepository>,

    /// Repository for workflow definitions
    definition_repo: Arc<dyn WorkflowDefinitionRepository>,

    /// Step executors, dispatched by step kind
    executors: ExecutorSet,
}

impl WorkflowExecutionService {
    /// Create a new workflow execution service
    pub fn new(
        execution_repo: Arc<dyn WorkflowExecutionRepository>,
        definition_repo: Arc<dyn WorkflowDefinitionRepository>,
        executors: ExecutorSet,
    ) -> Self {
        Self {
            execution_repo,
            definition_repo,
            executors,
        }
    }

    /// Start a new execution of an active workflow
    ///
    /// Runs the step loop synchronously up to the first suspension or
    /// terminal status and returns the execution snapshot it reached.
    pub async fn start(
        &self,
        workflow_id: &WorkflowId,
        actor: &str,
        trigger_source: &str,
    ) -> Result<WorkflowExecution, EngineError> {
        let definition = self
            .definition_repo
            .find_active_by_id(workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.0.clone()))?;

        let mut execution = WorkflowExecution::new(workflow_id.clone(), actor, trigger_source);

        info!(
            execution_id = %execution.id.0,
            workflow_id = %workflow_id.0,
            workflow_name = %definition.name,
            trigger_source = %trigger_source,
            "Starting workflow execution"
        );

        self.persist(&mut execution).await?;

        self.run(&definition, execution, 0).await
    }

    /// Resume an execution suspended at an approval gate
    ///
    /// The approval step that triggered the suspension is not re-executed;
    /// the loop continues from the step after it.
    pub async fn resume(
        &self,
        execution_id: &ExecutionId,
        actor: &str,
    ) -> Result<WorkflowExecution, EngineError> {
        let execution = self
            .execution_repo
            .find_by_id(execution_id)
            .await?
            .ok_or_else(|| EngineError::ExecutionNotFound(execution_id.0.clone()))?;

        if execution.status != ExecutionStatus::AwaitingApproval {
            return Err(EngineError::InvalidState(format!(
                "cannot resume execution {} in status {:?}",
                execution_id.0, execution.status
            )));
        }

        let definition = self
            .definition_repo
            .find_by_id(&execution.workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(execution.workflow_id.0.clone()))?;

        info!(
            execution_id = %execution_id.0,
            workflow_id = %execution.workflow_id.0,
            resumed_by = %actor,
            "Resuming workflow execution"
        );

        let next_index = execution.current_step_index + 1;
        self.run(&definition, execution, next_index).await
    }

    /// Run the step loop from `start_index` until suspension or a terminal
    /// status
    async fn run(
        &self,
        definition: &WorkflowDefinition,
        mut execution: WorkflowExecution,
        start_index: usize,
    ) -> Result<WorkflowExecution, EngineError> {
        execution.begin_run()?;
        self.persist(&mut execution).await?;

        let mut index = start_index;
        while index < definition.steps.len() {
            let step = &definition.steps[index];

            // Checkpoint the position before executing, so a crash mid-step
            // is visible on reload
            execution.current_step_index = index;
            self.persist(&mut execution).await?;

            let result = self.execute_step(step, &execution).await;
            let failed = result.status == StepStatus::Failed;
            let step_error = result.error.clone();

            execution.record_step_result(result)?;
            self.persist(&mut execution).await?;

            if failed {
                if let Some(target_index) = step
                    .on_failure
                    .as_ref()
                    .and_then(|target| definition.step_index(target))
                {
                    debug!(
                        execution_id = %execution.id.0,
                        step_id = %step.id.0,
                        target_index,
                        "Following failure branch"
                    );
                    index = target_index;
                    continue;
                }

                let error =
                    step_error.unwrap_or_else(|| format!("step {} failed", step.id.0));
                execution.fail(error)?;
                self.persist(&mut execution).await?;

                warn!(
                    execution_id = %execution.id.0,
                    step_id = %step.id.0,
                    "Workflow execution failed"
                );
                return Ok(execution);
            }

            if matches!(step.kind, StepKind::Approval { .. }) {
                execution.suspend_for_approval()?;
                self.persist(&mut execution).await?;

                info!(
                    execution_id = %execution.id.0,
                    step_id = %step.id.0,
                    "Workflow awaiting approval"
                );
                return Ok(execution);
            }

            index += 1;
        }

        execution.complete()?;
        self.persist(&mut execution).await?;

        info!(
            execution_id = %execution.id.0,
            steps_executed = execution.step_results.len(),
            "Workflow execution completed"
        );

        Ok(execution)
    }

    /// Execute a single step, folding any executor error into a failed result
    async fn execute_step(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> StepResult {
        let executed_at = Utc::now();
        let started = Instant::now();

        debug!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            step_type = %step.kind.type_name(),
            "Executing step"
        );

        let executor = self.executors.executor_for(&step.kind);

        match executor.execute(step, execution).await {
            Ok(result) => StepResult::success(
                step.id.clone(),
                step.name.clone(),
                result,
                started.elapsed().as_millis() as u64,
                executed_at,
            ),
            Err(error) => {
                warn!(
                    execution_id = %execution.id.0,
                    step_id = %step.id.0,
                    error = %error,
                    "Step execution failed"
                );

                StepResult::failure(
                    step.id.clone(),
                    step.name.clone(),
                    error.to_string(),
                    started.elapsed().as_millis() as u64,
                    executed_at,
                )
            }
        }
    }

    /// Save the execution, bumping the optimistic concurrency token
    async fn persist(&self, execution: &mut WorkflowExecution) -> Result<(), EngineError> {
        execution.version += 1;
        self.execution_repo.save(execution).await
    }
}
