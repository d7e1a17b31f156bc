//! Runtime domain: expression evaluation in the page context.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::merge;
use crate::error::{Error, EvaluateError, Result};
use crate::session::RemoteDebugger;

/// Options for `Runtime.evaluate`. `return_by_value` defaults to true; the
/// rest are left to the peer's defaults when unset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_gesture: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_by_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_command_line_api: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throw_on_side_effect: Option<bool>,
}

fn evaluate_params(expr: &str, options: &EvaluateOptions) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    params.insert("expression".into(), json!(expr));
    params.insert("returnByValue".into(), json!(true));
    merge(&mut params, serde_json::to_value(options)?);
    Ok(params)
}

impl RemoteDebugger {
    /// Evaluate a JavaScript expression in the context of the current page
    /// and return its value.
    pub async fn evaluate(&self, expr: &str, options: EvaluateOptions) -> Result<Value> {
        let params = evaluate_params(expr, &options)?;
        let res = self
            .send_request("Runtime.evaluate", Some(Value::Object(params)))
            .await?;

        if res.is_empty() {
            return Ok(Value::Null);
        }

        let result = res.map("result").ok_or(Error::NoResponse)?;

        if result.get("subtype").and_then(Value::as_str) == Some("error") {
            // this is actually an error
            return Err(Error::Evaluate(EvaluateError {
                details: result.clone(),
                exception_details: res.map("exceptionDetails").cloned(),
            }));
        }

        Ok(result.get("value").cloned().unwrap_or(Value::Null))
    }

    /// Evaluate a list of statements, wrapped in `(function(){ ... })()`.
    /// Use a `return` statement to produce a value.
    pub async fn evaluate_wrap(&self, expr: &str, options: EvaluateOptions) -> Result<Value> {
        let expr = format!("(function(){{{expr}}})()");
        self.evaluate(&expr, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_by_value_defaults_true() {
        let params = evaluate_params("1+1", &EvaluateOptions::default()).unwrap();
        assert_eq!(
            Value::Object(params),
            json!({"expression": "1+1", "returnByValue": true})
        );
    }

    #[test]
    fn options_override_defaults() {
        let params = evaluate_params(
            "console.log(1)",
            &EvaluateOptions {
                return_by_value: Some(false),
                silent: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            Value::Object(params),
            json!({
                "expression": "console.log(1)",
                "returnByValue": false,
                "silent": true,
            })
        );
    }
}
