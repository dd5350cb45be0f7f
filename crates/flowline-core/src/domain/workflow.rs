use crate::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value object: Workflow ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub String);

/// Value object: Step ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

/// How a workflow is triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Started explicitly by an actor
    Manual,
    /// Started by an external scheduler
    Scheduled,
    /// Started in reaction to a system event
    Event,
}

impl Default for TriggerKind {
    fn default() -> Self {
        TriggerKind::Manual
    }
}

/// Comparison operator for a data query filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Equal
    Eq,
    /// Not equal
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Pattern match
    Like,
    /// Case-insensitive pattern match
    Ilike,
    /// Value in list
    In,
    /// Identity check (null/true/false)
    Is,
}

/// A single filter applied to a data query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field the filter applies to
    pub field: String,

    /// Comparison operator
    pub op: FilterOp,

    /// Comparison value
    pub value: Value,
}

/// Ordering applied to a data query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOrder {
    /// Column to order by
    pub column: String,

    /// Ascending order when true
    #[serde(default = "default_true")]
    pub ascending: bool,
}

fn default_true() -> bool {
    true
}

fn default_query_limit() -> usize {
    100
}

fn default_ai_role() -> String {
    "general".to_string()
}

fn default_notification_kind() -> String {
    "info".to_string()
}

/// Typed step configuration, one variant per step type
///
/// Serializes as `{"type": ..., "config": {...}}`, the shape workflow
/// authoring tools produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "config")]
pub enum StepKind {
    /// Read rows from the host data store
    #[serde(rename_all = "camelCase")]
    DataQuery {
        /// Table to query
        table: String,
        /// Filters applied to the query
        #[serde(default)]
        filters: Vec<QueryFilter>,
        /// Column selection, `*` when absent
        #[serde(default)]
        select: Option<String>,
        /// Row limit
        #[serde(default = "default_query_limit")]
        limit: usize,
        /// Result ordering
        #[serde(default)]
        order_by: Option<QueryOrder>,
    },

    /// Generate an AI analysis of prior step data
    #[serde(rename = "AIAnalysis", rename_all = "camelCase")]
    AiAnalysis {
        /// Prompt sent to the inference service
        prompt: String,
        /// Prior step whose result data is spliced into the prompt
        #[serde(default)]
        previous_step_data: Option<StepId>,
        /// Role hint forwarded to the inference service
        #[serde(default = "default_ai_role")]
        ai_role: String,
    },

    /// Invoke a named side-effecting function
    #[serde(rename_all = "camelCase")]
    FunctionCall {
        /// Registered function name
        function_name: String,
        /// Arbitrary parameters forwarded to the function
        #[serde(default)]
        parameters: Value,
    },

    /// Create an approval request and suspend the execution
    #[serde(rename_all = "camelCase")]
    Approval {
        /// Candidate approvers; the first receives the request
        approver_ids: Vec<String>,
        /// Payload shown to the approver
        #[serde(default)]
        approval_data: Value,
    },

    /// Send a notification to a set of recipients
    #[serde(rename_all = "camelCase")]
    Notification {
        /// Recipients of the notification
        recipient_ids: Vec<String>,
        /// Notification title
        title: String,
        /// Notification body
        message: String,
        /// Notification kind tag (e.g. "info", "warning")
        #[serde(rename = "type", default = "default_notification_kind")]
        kind: String,
    },

    /// Evaluate a boolean expression against a prior step's result
    #[serde(rename_all = "camelCase")]
    Condition {
        /// JMESPath expression evaluated against the prior result payload
        condition: String,
        /// Prior step whose result payload forms the evaluation context
        #[serde(default)]
        previous_step_data: Option<StepId>,
    },
}

impl StepKind {
    /// Step type name, matching the serialized `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            StepKind::DataQuery { .. } => "DataQuery",
            StepKind::AiAnalysis { .. } => "AIAnalysis",
            StepKind::FunctionCall { .. } => "FunctionCall",
            StepKind::Approval { .. } => "Approval",
            StepKind::Notification { .. } => "Notification",
            StepKind::Condition { .. } => "Condition",
        }
    }
}

/// A single step within a workflow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// ID of the step, unique within the workflow
    pub id: StepId,

    /// Human-readable label, used for logs and audit only
    pub name: String,

    /// Typed configuration for the step
    #[serde(flatten)]
    pub kind: StepKind,

    /// Step to jump to when this step fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<StepId>,
}

/// Represents a parsed and validated workflow definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// ID of the workflow
    pub id: WorkflowId,

    /// Human-readable name of the workflow
    pub name: String,

    /// Description of the workflow
    pub description: Option<String>,

    /// How the workflow is triggered
    #[serde(default)]
    pub trigger: TriggerKind,

    /// The ordered steps in this workflow
    pub steps: Vec<WorkflowStep>,

    /// Inactive workflows cannot be started
    pub is_active: bool,
}

impl WorkflowDefinition {
    /// Position of a step in the step list
    pub fn step_index(&self, step_id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == step_id)
    }

    /// Validate the workflow definition
    pub fn validate(&self) -> Result<(), EngineError> {
        // Check for empty steps
        if self.steps.is_empty() {
            return Err(EngineError::Validation(
                "Workflow must have at least one step".to_string(),
            ));
        }

        // Check for ID uniqueness
        let mut step_ids = std::collections::HashSet::new();
        for step in &self.steps {
            if !step_ids.insert(&step.id) {
                return Err(EngineError::Validation(format!(
                    "Duplicate step ID: {}",
                    step.id.0
                )));
            }
        }

        // Check for valid failure-branch references
        for step in &self.steps {
            if let Some(target) = &step.on_failure {
                if !step_ids.contains(target) {
                    return Err(EngineError::Validation(format!(
                        "Step {} references non-existent failure target: {}",
                        step.id.0, target.0
                    )));
                }
            }
        }

        Ok(())
    }
}
