//! response classification
//!
//! decides whether a body is json or opaque text, then whether the call
//! succeeded.

use crate::error::Result;
use crate::graphql::GraphQlResponse;
use crate::response::HttpResponse;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

/// body of a completed response
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// json in the graphql response shape
    GraphQl(GraphQlResponse),
    /// valid json that does not fit the response shape
    Json(serde_json::Value),
    /// anything else, unparsed
    Text(String),
}

/// payload carried by a failed classification
#[derive(Debug, Clone, PartialEq)]
pub enum FailureBody {
    /// json body, passed through as-is (may hold `data` next to `errors`)
    GraphQl(GraphQlResponse),
    /// json body outside the response shape, passed through untouched
    Json(serde_json::Value),
    /// non-json body wrapped as `{error: text}`
    Text { error: String },
}

/// classification verdict
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// json body, 2xx status, no `errors`, `data` present
    Success {
        data: serde_json::Value,
        extensions: Option<serde_json::Value>,
    },
    Failure(FailureBody),
}

impl Classification {
    /// true for a success verdict
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success { .. })
    }
}

/// parse the body according to the content type
///
/// only a `content-type` starting with `application/json` is parsed. a
/// syntax error is an error; json of any other shape is kept as a raw value.
pub fn parse_body(response: &HttpResponse) -> Result<ParsedBody> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if !is_json {
        return Ok(ParsedBody::Text(response.text()));
    }

    let value: serde_json::Value = response.json()?;
    match GraphQlResponse::deserialize(&value) {
        Ok(parsed) => Ok(ParsedBody::GraphQl(parsed)),
        Err(err) => {
            tracing::trace!(error = %err, "json body outside the graphql response shape");
            Ok(ParsedBody::Json(value))
        }
    }
}

/// classify a response and its parsed body
///
/// pure: the same response and body always give the same verdict.
pub fn classify(response: &HttpResponse, body: ParsedBody) -> Classification {
    match body {
        ParsedBody::GraphQl(parsed)
            if response.is_ok() && !parsed.has_errors() && parsed.data.is_some() =>
        {
            let GraphQlResponse {
                data, extensions, ..
            } = parsed;
            Classification::Success {
                data: data.unwrap_or_default(),
                extensions,
            }
        }
        ParsedBody::GraphQl(parsed) => Classification::Failure(FailureBody::GraphQl(parsed)),
        ParsedBody::Json(value) if response.is_ok() && raw_success(&value) => {
            let mut value = value;
            let data = value["data"].take();
            let extensions = value
                .get_mut("extensions")
                .map(serde_json::Value::take)
                .filter(|extensions| !extensions.is_null());
            Classification::Success { data, extensions }
        }
        ParsedBody::Json(value) => Classification::Failure(FailureBody::Json(value)),
        ParsedBody::Text(error) => Classification::Failure(FailureBody::Text { error }),
    }
}

/// `errors` absent, null or false, and `data` non-null
fn raw_success(value: &serde_json::Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    let no_errors = matches!(
        object.get("errors"),
        None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false))
    );
    let has_data = object.get("data").is_some_and(|data| !data.is_null());
    no_errors && has_data
}
