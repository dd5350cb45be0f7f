/// Workflow execution service
pub mod execution_service;
