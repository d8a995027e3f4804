use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message shown to the user whenever the model answer cannot be used.
pub const MALFORMED_RESPONSE_MESSAGE: &str = "An error has occurred! Please try again.";

/// Title and description produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub title: String,
    pub description: String,
}

/// A [`GeneratedRecord`] with both fields translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedRecord {
    pub title: String,
    pub description: String,
}

/// The candidate JSON did not parse into a [`GeneratedRecord`].
#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("malformed model response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed model response: expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

impl GeneratedRecord {
    /// Strictly parse candidate JSON. It must be an object whose `title` and
    /// `description` are strings; other fields are ignored.
    pub fn parse(candidate_json: &str) -> Result<Self, MalformedResponse> {
        match serde_json::from_str(candidate_json)? {
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            other => Err(MalformedResponse::NotAnObject(json_kind(&other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
