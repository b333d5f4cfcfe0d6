//! Interpretation of gateway response bodies.

use serde_json::Value;
use survey_core::{GatewayError, SurveyRecord};

const SUCCESS: &str = "success";

/// Interpret the body of a submit call. Only `{"result": "success"}` is a
/// success; anything else is a rejection or a malformed reply.
pub fn parse_submit_reply(body: &str) -> Result<(), GatewayError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("submit reply is not JSON: {e}")))?;

    let Value::Object(map) = value else {
        return Err(GatewayError::MalformedResponse(format!(
            "submit reply is not an object: {}",
            kind(&value)
        )));
    };

    let result = match map.get("result") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            return Err(GatewayError::MalformedResponse(
                "submit reply has no result field".into(),
            ));
        }
        Some(other) => other.to_string(),
    };

    if result == SUCCESS {
        return Ok(());
    }

    let error = map.get("error").and_then(|e| match e {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });
    Err(GatewayError::Rejected { result, error })
}

/// Interpret the body of a fetch call. The body must be a JSON array of
/// objects.
pub fn parse_record_list(body: &str) -> Result<Vec<SurveyRecord>, GatewayError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("record list is not JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(GatewayError::MalformedResponse(format!(
            "expected a JSON array of records, got {}",
            kind(&value)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(GatewayError::MalformedResponse(format!(
                    "record {index} is {}, not an object",
                    kind(&item)
                )));
            }
            serde_json::from_value(item).map_err(|e| {
                GatewayError::MalformedResponse(format!("record {index} is invalid: {e}"))
            })
        })
        .collect()
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
