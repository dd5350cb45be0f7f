use thiserror::Error;

/// Core error type for the Flowline engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Workflow definition not found or inactive
    #[error("Workflow not found: {0}")]
    WorkflowNotFound(String),

    /// Workflow execution not found
    #[error("Execution not found: {0}")]
    ExecutionNotFound(String),

    /// Operation not valid for the execution's current status
    #[error("Invalid execution state: {0}")]
    InvalidState(String),

    /// Step execution error
    #[error("Step execution error: {0}")]
    StepExecution(String),

    /// No function registered under the requested name
    #[error("Unregistered function: {0}")]
    UnregisteredFunction(String),

    /// Condition expression error
    #[error("Expression error: {0}")]
    Expression(String),

    /// Workflow definition validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStore(String),

    /// Optimistic concurrency conflict on save
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// External collaborator error
    #[error("External dependency error: {0}")]
    External(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl From<String> for EngineError {
    fn from(err: String) -> Self {
        EngineError::Other(err)
    }
}

impl From<&str> for EngineError {
    fn from(err: &str) -> Self {
        EngineError::Other(err.to_string())
    }
}
