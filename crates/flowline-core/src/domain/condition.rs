use crate::EngineError;
use serde_json::Value;

/// Evaluates a condition expression against a prior step's result payload
pub trait ConditionEvaluator: Send + Sync {
    /// Evaluate the expression within the given context
    fn evaluate(&self, expression: &str, context: &Value) -> Result<bool, EngineError>;
}

/// Default condition evaluator using JMESPath
pub struct JmespathEvaluator;

impl ConditionEvaluator for JmespathEvaluator {
    fn evaluate(&self, expression: &str, context: &Value) -> Result<bool, EngineError> {
        let compiled = jmespath::compile(expression).map_err(|e| {
            EngineError::Expression(format!(
                "Failed to compile condition expression: {}: {}",
                expression, e
            ))
        })?;

        match compiled.search(context) {
            Ok(result) => {
                let value = serde_json::to_value(result).unwrap_or(Value::Null);
                Ok(is_truthy(&value))
            }
            Err(e) => Err(EngineError::Expression(format!(
                "Failed to evaluate condition expression: {}: {}",
                expression, e
            ))),
        }
    }
}

/// JMESPath truthiness: null, false, and empty strings/arrays/objects are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}
