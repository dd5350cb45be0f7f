//!
//! Flowline Core - Workflow execution engine for the Flowline Platform
//!
//! This crate defines the execution engine, domain models, and persistence
//! and collaborator interfaces for running declarative step-based workflows.
//! Executions checkpoint after every step, suspend indefinitely at approval
//! gates, and resume from the exact point of suspension.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - core business models, entities, and rules
pub mod domain;

/// Application services - core application logic
pub mod application;

/// Collaborator interfaces consumed by step executors
pub mod collaborators;

/// Step executors, one per step type
pub mod executors;

/// Core types
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use error::EngineError;
pub use types::DataPacket;

// Re-export main API types for easy use
pub use application::execution_service::WorkflowExecutionService;
pub use collaborators::{
    AiService, ApprovalStore, BuiltinFunctionRegistry, FunctionRegistry, Notification,
    NotificationService, QueryRequest, QueryService,
};
pub use domain::condition::{ConditionEvaluator, JmespathEvaluator};
pub use domain::execution::{
    ApprovalId, ExecutionId, ExecutionStatus, StepResult, StepStatus, WorkflowExecution,
};
pub use domain::repository::{WorkflowDefinitionRepository, WorkflowExecutionRepository};
pub use domain::workflow::{
    FilterOp, QueryFilter, QueryOrder, StepId, StepKind, TriggerKind, WorkflowDefinition,
    WorkflowId, WorkflowStep,
};
pub use executors::{ExecutorSet, StepExecutor};
