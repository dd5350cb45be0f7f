use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use super::{mismatched_kind, prior_result_data, StepExecutor};
use crate::collaborators::AiService;
use crate::domain::execution::WorkflowExecution;
use crate::domain::workflow::{StepKind, WorkflowStep};
use crate::{DataPacket, EngineError};

/// Executes `AIAnalysis` steps via the inference service
///
/// When the step names a prior step, that step's result `data` is appended
/// to the prompt as a pretty-printed context block.
pub struct AiAnalysisExecutor {
    ai_service: Arc<dyn AiService>,
}

impl AiAnalysisExecutor {
    /// Create a new AI analysis executor
    pub fn new(ai_service: Arc<dyn AiService>) -> Self {
        Self { ai_service }
    }
}

#[async_trait]
impl StepExecutor for AiAnalysisExecutor {
    fn step_type(&self) -> &str {
        "AIAnalysis"
    }

    async fn execute(
        &self,
        step: &WorkflowStep,
        execution: &WorkflowExecution,
    ) -> Result<DataPacket, EngineError> {
        let (prompt, previous_step_data, ai_role) = match &step.kind {
            StepKind::AiAnalysis {
                prompt,
                previous_step_data,
                ai_role,
            } => (prompt, previous_step_data, ai_role),
            other => return Err(mismatched_kind("AIAnalysis", other)),
        };

        if prompt.is_empty() {
            return Err(EngineError::StepExecution(
                "AIAnalysis step requires prompt".to_string(),
            ));
        }

        let mut full_prompt = prompt.clone();
        if let Some(prior_id) = previous_step_data {
            if let Some(prior) = prior_result_data(execution, prior_id) {
                if let Some(data) = prior.as_value().get("data") {
                    full_prompt.push_str(&format!(
                        "\n\nDATA:\n{}",
                        serde_json::to_string_pretty(data)?
                    ));
                }
            }
        }

        let analysis = self.ai_service.generate(&full_prompt, ai_role).await?;

        tracing::info!(
            execution_id = %execution.id.0,
            step_id = %step.id.0,
            response_length = analysis.len(),
            "AIAnalysis executed"
        );

        Ok(DataPacket::new(json!({
            "prompt": prompt,
            "analysis": analysis,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::execution::StepResult;
    use crate::domain::workflow::{StepId, WorkflowId};
    use chrono::Utc;
    use tokio::sync::Mutex;

    struct FixtureAiService {
        prompts: Mutex<Vec<String>>,
    }

    impl FixtureAiService {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiService for FixtureAiService {
        async fn generate(&self, prompt: &str, role: &str) -> Result<String, EngineError> {
            self.prompts.lock().await.push(prompt.to_string());
            Ok(format!("analysis as {}", role))
        }
    }

    fn execution_with_query_result() -> WorkflowExecution {
        let mut execution = WorkflowExecution::new(WorkflowId("wf".to_string()), "user-1", "manual");
        execution.begin_run().unwrap();
        execution
            .record_step_result(StepResult::success(
                StepId("query".to_string()),
                "Query".to_string(),
                DataPacket::new(json!({"table": "customers", "rowCount": 1, "data": [{"id": 7}]})),
                3,
                Utc::now(),
            ))
            .unwrap();
        execution
    }

    fn analysis_step(previous: Option<&str>) -> WorkflowStep {
        WorkflowStep {
            id: StepId("analyze".to_string()),
            name: "Analyze".to_string(),
            kind: StepKind::AiAnalysis {
                prompt: "Summarize the customers".to_string(),
                previous_step_data: previous.map(|p| StepId(p.to_string())),
                ai_role: "analyst".to_string(),
            },
            on_failure: None,
        }
    }

    #[tokio::test]
    async fn test_prior_data_spliced_into_prompt() {
        let service = Arc::new(FixtureAiService::new());
        let executor = AiAnalysisExecutor::new(service.clone());

        let result = executor
            .execute(&analysis_step(Some("query")), &execution_with_query_result())
            .await
            .unwrap();

        assert_eq!(result.as_value()["analysis"], "analysis as analyst");
        assert_eq!(result.as_value()["prompt"], "Summarize the customers");

        let prompts = service.prompts.lock().await;
        assert!(prompts[0].starts_with("Summarize the customers"));
        assert!(prompts[0].contains("DATA:"));
        assert!(prompts[0].contains("\"id\": 7"));
    }

    #[tokio::test]
    async fn test_no_prior_reference_uses_bare_prompt() {
        let service = Arc::new(FixtureAiService::new());
        let executor = AiAnalysisExecutor::new(service.clone());

        executor
            .execute(&analysis_step(None), &execution_with_query_result())
            .await
            .unwrap();

        let prompts = service.prompts.lock().await;
        assert_eq!(prompts[0], "Summarize the customers");
    }

    #[tokio::test]
    async fn test_unknown_prior_reference_uses_bare_prompt() {
        let service = Arc::new(FixtureAiService::new());
        let executor = AiAnalysisExecutor::new(service.clone());

        executor
            .execute(
                &analysis_step(Some("never-ran")),
                &execution_with_query_result(),
            )
            .await
            .unwrap();

        let prompts = service.prompts.lock().await;
        assert_eq!(prompts[0], "Summarize the customers");
    }

    #[tokio::test]
    async fn test_empty_prompt_fails() {
        let executor = AiAnalysisExecutor::new(Arc::new(FixtureAiService::new()));
        let mut step = analysis_step(None);
        step.kind = StepKind::AiAnalysis {
            prompt: String::new(),
            previous_step_data: None,
            ai_role: "general".to_string(),
        };

        let result = executor
            .execute(&step, &execution_with_query_result())
            .await;
        match result {
            Err(EngineError::StepExecution(msg)) => {
                assert!(msg.contains("requires prompt"));
            }
            other => panic!("Expected StepExecution, got {:?}", other),
        }
    }
}
