use crate::{
    domain::workflow::{StepId, WorkflowId},
    DataPacket, EngineError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value object: Execution ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub String);

/// Value object: Approval record ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub String);

/// Workflow execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Execution record created, run loop not yet entered
    Pending,

    /// Steps are being executed
    Running,

    /// Suspended at an approval gate, waiting for resume
    AwaitingApproval,

    /// All steps completed successfully
    Completed,

    /// A step failed with no recovery branch
    Failed,

    /// Cancelled by an external actor; never set by the engine
    Cancelled,
}

impl ExecutionStatus {
    /// Whether the status is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// Status of a single executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Success,
    /// Finished with an error
    Failed,
    /// Skipped without executing
    Skipped,
}

/// The recorded outcome of one executed step
///
/// Step id and name are denormalized so the audit trail stays meaningful
/// even if the workflow definition changes later. Never mutated once
/// appended to an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// ID of the executed step
    pub step_id: StepId,

    /// Name of the executed step at execution time
    pub step_name: String,

    /// Outcome status
    pub status: StepStatus,

    /// Payload produced by the executor, shape depends on step type
    pub result: Option<DataPacket>,

    /// Error message, set only when status is failed
    pub error: Option<String>,

    /// Wall-clock duration of the step
    pub duration_ms: u64,

    /// When the step started executing
    pub executed_at: DateTime<Utc>,
}

impl StepResult {
    /// Record a successful step outcome
    pub fn success(
        step_id: StepId,
        step_name: String,
        result: DataPacket,
        duration_ms: u64,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            step_id,
            step_name,
            status: StepStatus::Success,
            result: Some(result),
            error: None,
            duration_ms,
            executed_at,
        }
    }

    /// Record a failed step outcome
    pub fn failure(
        step_id: StepId,
        step_name: String,
        error: String,
        duration_ms: u64,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            step_id,
            step_name,
            status: StepStatus::Failed,
            result: None,
            error: Some(error),
            duration_ms,
            executed_at,
        }
    }
}

/// Aggregate: one run of a workflow
///
/// The orchestrator exclusively owns state transitions; repositories only
/// store and retrieve snapshots. `version` is the optimistic concurrency
/// token: it is bumped before every save and adapters must reject writes
/// whose version is not exactly one above the stored record's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Unique identifier
    pub id: ExecutionId,

    /// Workflow definition this execution runs
    pub workflow_id: WorkflowId,

    /// Actor that triggered the execution
    pub triggered_by: String,

    /// Trigger source tag, e.g. "manual" or "scheduled"
    pub trigger_source: String,

    /// Current status
    pub status: ExecutionStatus,

    /// Position in the step list currently executing or awaiting resumption
    pub current_step_index: usize,

    /// Trace of everything that actually ran, in execution order
    pub step_results: Vec<StepResult>,

    /// Error message when the execution failed
    pub error_log: Option<String>,

    /// When the execution was created
    pub started_at: DateTime<Utc>,

    /// Set once a terminal status is reached
    pub completed_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency token
    pub version: u64,
}

impl WorkflowExecution {
    /// Create a new execution for a workflow
    pub fn new(workflow_id: WorkflowId, triggered_by: &str, trigger_source: &str) -> Self {
        Self {
            id: ExecutionId(Uuid::new_v4().to_string()),
            workflow_id,
            triggered_by: triggered_by.to_string(),
            trigger_source: trigger_source.to_string(),
            status: ExecutionStatus::Pending,
            current_step_index: 0,
            step_results: Vec::new(),
            error_log: None,
            started_at: Utc::now(),
            completed_at: None,
            version: 0,
        }
    }

    /// Enter the run loop
    pub fn begin_run(&mut self) -> Result<(), EngineError> {
        match self.status {
            ExecutionStatus::Pending | ExecutionStatus::AwaitingApproval => {
                self.status = ExecutionStatus::Running;
                Ok(())
            }
            other => Err(EngineError::InvalidState(format!(
                "cannot run execution {} in status {:?}",
                self.id.0, other
            ))),
        }
    }

    /// Append the outcome of an executed step
    pub fn record_step_result(&mut self, result: StepResult) -> Result<(), EngineError> {
        if self.status != ExecutionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot record step result while execution {} is in status {:?}",
                self.id.0, self.status
            )));
        }

        self.step_results.push(result);
        Ok(())
    }

    /// Suspend at an approval gate
    pub fn suspend_for_approval(&mut self) -> Result<(), EngineError> {
        if self.status != ExecutionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot suspend execution {} in status {:?}",
                self.id.0, self.status
            )));
        }

        self.status = ExecutionStatus::AwaitingApproval;
        Ok(())
    }

    /// Complete the execution successfully
    pub fn complete(&mut self) -> Result<(), EngineError> {
        if self.status != ExecutionStatus::Running {
            return Err(EngineError::InvalidState(format!(
                "cannot complete execution {} in status {:?}",
                self.id.0, self.status
            )));
        }

        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Mark the execution as failed
    pub fn fail(&mut self, error: String) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidState(format!(
                "cannot fail execution {} in status {:?}",
                self.id.0, self.status
            )));
        }

        self.status = ExecutionStatus::Failed;
        self.error_log = Some(error);
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
