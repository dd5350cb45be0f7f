use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{mismatched_kind, StepExecutor};
use crate::collaborators::{QueryRequest, QueryService};
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `DataQuery` steps against the host data store
pub struct DataQueryExecutor {
    query_service: Arc<dyn QueryService>,
}

impl DataQueryExecutor {
    /// Create a new data query executor
    pub fn new(query_service: Arc<dyn QueryService>) -> Self {
        Self { query_service }
    }
}

#[async_trait]
impl StepExecutor for DataQueryExecutor {
    fn step_type(&self) -> &str {
        "DataQuery"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (table, filters, select, limit, order_by) = match &step.kind {
            StepKind::DataQuery {
                table,
                filters,
                select,
                limit,
                order_by,
            } => (table, filters, select, limit, order_by),
            other => return Err(mismatched_kind("DataQuery", other)),
        };

        if table.is_empty() {
            return Err(EngineError::StepExecution(
                "DataQuery step requires table name".to_string(),
            ));
        }

        let request = QueryRequest {
            table: table.clone(),
            filters: filters.clone(),
            select: select.clone(),
            limit: *limit,
            order_by: order_by.clone(),
        };

        let rows = self.query_service.query(&request).await?;

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            table = %table,
            row_count = rows.len(),
            "DataQuery executed"
        );

        Ok(DataPacket::new(json!({
            "table": table,
            "rowCount": rows.len(),
            "data": rows,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::{FilterOp, QueryFilter, StepId, WorkflowId};
    use serde_json::Value;
    use tokio::sync::Mutex;

    struct FixtureQueryService {
        rows: Vec<Value>,
        requests: Mutex<Vec<QueryRequest>>,
    }

    impl FixtureQueryService {
        fn returning(rows: Vec<Value>) -> Self {
            Self {
                rows,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryService for FixtureQueryService {
        async fn query(&self, request: &QueryRequest) -> Result<Vec<Value>, EngineError> {
            self.requests.lock().await.push(request.clone());
            Ok(self.rows.clone())
        }
    }

    struct FailingQueryService;

    #[async_trait]
    impl QueryService for FailingQueryService {
        async fn query(&self, _request: &QueryRequest) -> Result<Vec<Value>, EngineError> {
            Err(EngineError::External("connection refused".to_string()))
        }
    }

    fn execution() -> WorkflowExecution {
        WorkflowExecution::new(WorkflowId("wf".to_string()), "user-1", "manual")
    }

    fn query_step(table: &str) -> WorkflowStep {
        WorkflowStep {
            id: StepId("query".to_string()),
            name: "Query".to_string(),
            kind: StepKind::DataQuery {
                table: table.to_string(),
                filters: vec![QueryFilter {
                    field: "status".to_string(),
                    op: FilterOp::Eq,
                    value: json!("open"),
                }],
                select: None,
                limit: 50,
                order_by: None,
            },
            on_failure: None,
        }
    }

    #[tokio::test]
    async fn test_query_returns_rows_and_count() {
        let service = Arc::new(FixtureQueryService::returning(vec![
            json!({"id": 1}),
            json!({"id": 2}),
        ]));
        let executor = DataQueryExecutor::new(service.clone());

        let result = executor
            .execute(&query_step("customers"), &execution())
            .await
            .unwrap();

        assert_eq!(result.as_value()["table"], "customers");
        assert_eq!(result.as_value()["rowCount"], 2);
        assert_eq!(result.as_value()["data"][1]["id"], 2);

        let requests = service.requests.lock().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].table, "customers");
        assert_eq!(requests[0].limit, 50);
        assert_eq!(requests[0].filters[0].field, "status");
    }

    #[tokio::test]
    async fn test_missing_table_fails() {
        let executor = DataQueryExecutor::new(Arc::new(FixtureQueryService::returning(vec![])));

        let result = executor.execute(&query_step(""), &execution()).await;
        match result {
            Err(EngineError::StepExecution(msg)) => {
                assert!(msg.contains("requires table name"));
            }
            other => panic!("Expected StepExecution, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_service_error_propagates() {
        let executor = DataQueryExecutor::new(Arc::new(FailingQueryService));

        let result = executor.execute(&query_step("customers"), &execution()).await;
        match result {
            Err(EngineError::External(msg)) => {
                assert!(msg.contains("connection refused"));
            }
            other => panic!("Expected External, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mismatched_step_kind() {
        let executor = DataQueryExecutor::new(Arc::new(FixtureQueryService::returning(vec![])));
        let step = WorkflowStep {
            id: StepId("notify".to_string()),
            name: "Notify".to_string(),
            kind: StepKind::Notification {
                recipient_ids: vec!["u".to_string()],
                title: "t".to_string(),
                message: "m".to_string(),
                kind: "info".to_string(),
            },
            on_failure: None,
        };

        let result = executor.execute(&step, &execution()).await;
        assert!(matches!(result, Err(EngineError::StepExecution(_))));
    }
}
