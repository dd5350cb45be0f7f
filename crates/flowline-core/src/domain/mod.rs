/// Workflow definition domain models
pub mod workflow;

/// Workflow execution domain models
pub mod execution;

/// Condition expression evaluation
pub mod condition;

/// Repository interfaces
pub mod repository;
