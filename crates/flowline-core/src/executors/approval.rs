use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{mismatched_kind, StepExecutor};
use crate::collaborators::ApprovalStore;
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `Approval` steps by creating a pending approval record
///
/// The record is addressed to the first approver id. Suspending the
/// execution is the orchestrator's responsibility, not this executor's.
pub struct ApprovalExecutor {
    approval_store: Arc<dyn ApprovalStore>,
}

impl ApprovalExecutor {
    /// Create a new approval executor
    pub fn new(approval_store: Arc<dyn ApprovalStore>) -> Self {
        Self { approval_store }
    }
}

#[async_trait]
impl StepExecutor for ApprovalExecutor {
    fn step_type(&self) -> &str {
        "Approval"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (approver_ids, approval_data) = match &step.kind {
            StepKind::Approval {
                approver_ids,
                approval_data,
            } => (approver_ids, approval_data),
            other => return Err(mismatched_kind("Approval", other)),
        };

        let approver = approver_ids.first().ok_or_else(|| {
            EngineError::StepExecution("Approval step requires approverIds".to_string())
        })?;

        let approval_id = self
            .approval_store
            .create_approval(&execution.id, approver, approval_data)
            .await?;

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            approval_id = %approval_id.0,
            approver = %approver,
            "Approval created"
        );

        Ok(DataPacket::new(json!({
            "approvalId": approval_id.0,
            "status": "pending",
        })))
    }
}
