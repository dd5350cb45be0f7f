use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{mismatched_kind, StepExecutor};
use crate::collaborators::{Notification, NotificationService};
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `Notification` steps, fanning out one delivery per recipient
pub struct NotificationExecutor {
    notification_service: Arc<dyn NotificationService>,
}

impl NotificationExecutor {
    /// Create a new notification executor
    pub fn new(notification_service: Arc<dyn NotificationService>) -> Self {
        Self {
            notification_service,
        }
    }
}

#[async_trait]
impl StepExecutor for NotificationExecutor {
    fn step_type(&self) -> &str {
        "Notification"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (recipient_ids, title, message, kind) = match &step.kind {
            StepKind::Notification {
                recipient_ids,
                title,
                message,
                kind,
            } => (recipient_ids, title, message, kind),
            other => return Err(mismatched_kind("Notification", other)),
        };

        if recipient_ids.is_empty() {
            return Err(EngineError::StepExecution(
                "Notification step requires recipientIds".to_string(),
            ));
        }

        let notification = Notification {
            title: title.clone(),
            message: message.clone(),
            kind: kind.clone(),
        };

        for recipient in recipient_ids {
            self.notification_service
                .notify(recipient, &notification)
                .await?;
        }

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            recipient_count = recipient_ids.len(),
            "Notification sent"
        );

        Ok(DataPacket::new(json!({
            "recipientIds": recipient_ids,
            "title": title,
            "message": message,
            "type": kind,
            "status": "sent",
        })))
    }
}
