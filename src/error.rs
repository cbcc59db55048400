//! error types
//!
//! structured errors for config, transport, cache, json, and graphql responses.

use crate::classify::FailureBody;
use crate::graphql::{GraphQlError, Variables};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the client and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    GraphQl(#[from] Box<ClientError>),
}

impl Error {
    /// the graphql failure, if this is one
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::GraphQl(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// http status of the failed response if available
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::GraphQl(err) => Some(err.response.status),
            Error::Http(err) => err.status(),
            _ => None,
        }
    }

    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Error::GraphQl(Box::new(err))
    }
}

/// request side of a failed call
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestContext {
    /// query document that was sent
    pub query: String,
    /// variables that were sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
}

/// response side of a failed call
#[derive(Debug, Clone)]
pub struct ClientErrorResponse {
    /// http status
    pub status: StatusCode,
    /// response headers
    pub headers: HeaderMap,
    /// parsed body, the raw json value, or the `{error: text}` wrapper
    pub body: FailureBody,
}

impl ClientErrorResponse {
    /// graphql `data`, which may accompany errors on partial success
    pub fn data(&self) -> Option<&serde_json::Value> {
        match &self.body {
            FailureBody::GraphQl(body) => body.data.as_ref(),
            FailureBody::Json(value) => value.get("data").filter(|data| !data.is_null()),
            FailureBody::Text { .. } => None,
        }
    }

    /// graphql `errors`
    pub fn errors(&self) -> Option<&[GraphQlError]> {
        match &self.body {
            FailureBody::GraphQl(body) => body.errors.as_deref(),
            FailureBody::Json(_) | FailureBody::Text { .. } => None,
        }
    }

    /// graphql `extensions`
    pub fn extensions(&self) -> Option<&serde_json::Value> {
        match &self.body {
            FailureBody::GraphQl(body) => body.extensions.as_ref(),
            FailureBody::Json(value) => value.get("extensions").filter(|ext| !ext.is_null()),
            FailureBody::Text { .. } => None,
        }
    }

    /// raw text of a non-json body
    pub fn error(&self) -> Option<&str> {
        match &self.body {
            FailureBody::Text { error } => Some(error.as_str()),
            FailureBody::GraphQl(_) | FailureBody::Json(_) => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut value = match &self.body {
            FailureBody::GraphQl(body) => serde_json::to_value(body).unwrap_or_default(),
            FailureBody::Json(value) if value.is_object() => value.clone(),
            FailureBody::Json(value) => serde_json::json!({ "body": value }),
            FailureBody::Text { error } => serde_json::json!({ "error": error }),
        };
        if let serde_json::Value::Object(map) = &mut value {
            map.insert("status".to_string(), self.status.as_u16().into());
        }
        value
    }
}

/// graphql call that did not classify as a success
#[derive(Debug, Clone)]
pub struct ClientError {
    response: ClientErrorResponse,
    request: RequestContext,
    message: String,
}

impl ClientError {
    /// build the error; the message is fixed here
    pub fn new(response: ClientErrorResponse, request: RequestContext) -> Self {
        let snapshot = serde_json::json!({
            "response": response.to_json(),
            "request": &request,
        });
        let message = format!("{}: {}", extract_message(&response), snapshot);
        Self {
            response,
            request,
            message,
        }
    }

    /// response snapshot
    pub fn response(&self) -> &ClientErrorResponse {
        &self.response
    }

    /// originating request
    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    /// derived message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graphql error: {}", self.message)
    }
}

impl std::error::Error for ClientError {}

fn extract_message(response: &ClientErrorResponse) -> String {
    match response.errors() {
        Some([first, ..]) if !first.message.is_empty() => first.message.clone(),
        Some([_, ..]) => "unexpected graphql endpoint response".to_string(),
        Some([]) => format!("graphql error (code: {})", response.status.as_u16()),
        None => "unexpected graphql endpoint response".to_string(),
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::GraphQlResponse;

    fn graphql_failure(status: StatusCode, errors: Option<Vec<GraphQlError>>) -> ClientError {
        ClientError::new(
            ClientErrorResponse {
                status,
                headers: HeaderMap::new(),
                body: FailureBody::GraphQl(GraphQlResponse {
                    errors,
                    ..Default::default()
                }),
            },
            RequestContext {
                query: "{ ok }".to_string(),
                variables: None,
            },
        )
    }

    fn error_entry(message: &str) -> GraphQlError {
        GraphQlError {
            message: message.to_string(),
            locations: vec![],
            path: vec![],
            extensions: None,
        }
    }

    #[test]
    fn test_message_uses_first_error() {
        let err = graphql_failure(
            StatusCode::OK,
            Some(vec![error_entry("first"), error_entry("second")]),
        );
        assert!(err.message().starts_with("first: "));
        assert!(err.message().contains(r#""query":"{ ok }""#));
        assert!(err.to_string().starts_with("graphql error: first"));
    }

    #[test]
    fn test_message_empty_errors_uses_status() {
        let err = graphql_failure(StatusCode::BAD_GATEWAY, Some(vec![]));
        assert!(err.message().starts_with("graphql error (code: 502): "));
    }

    #[test]
    fn test_message_fallback_for_text_body() {
        let err = ClientError::new(
            ClientErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                headers: HeaderMap::new(),
                body: FailureBody::Text {
                    error: "internal error".to_string(),
                },
            },
            RequestContext {
                query: "{ ok }".to_string(),
                variables: None,
            },
        );
        assert!(err
            .message()
            .starts_with("unexpected graphql endpoint response: "));
        assert!(err.message().contains(r#""error":"internal error""#));
        assert!(err.message().contains(r#""status":500"#));
        assert_eq!(err.response().error(), Some("internal error"));
        assert!(err.response().errors().is_none());
    }

    #[test]
    fn test_message_fallback_for_error_without_message() {
        let err = graphql_failure(StatusCode::OK, Some(vec![error_entry("")]));
        assert!(err
            .message()
            .starts_with("unexpected graphql endpoint response: "));
        assert_eq!(err.response().errors().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_raw_json_body_accessors() {
        let err = ClientError::new(
            ClientErrorResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: FailureBody::Json(serde_json::json!({
                    "data": {"x": 1},
                    "errors": "rate limited",
                })),
            },
            RequestContext {
                query: "{ x }".to_string(),
                variables: None,
            },
        );
        assert_eq!(err.response().data(), Some(&serde_json::json!({"x": 1})));
        assert!(err.response().errors().is_none());
        assert!(err.response().extensions().is_none());
        assert!(err.response().error().is_none());
        assert!(err
            .message()
            .starts_with("unexpected graphql endpoint response: "));
        assert!(err.message().contains(r#""errors":"rate limited""#));
        assert!(err.message().contains(r#""status":200"#));
    }

    #[test]
    fn test_raw_json_array_is_wrapped_in_snapshot() {
        let err = ClientError::new(
            ClientErrorResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: FailureBody::Json(serde_json::json!([1, 2])),
            },
            RequestContext {
                query: "{ x }".to_string(),
                variables: None,
            },
        );
        assert!(err.message().contains(r#""body":[1,2]"#));
        assert!(err.response().data().is_none());
    }

    #[test]
    fn test_is_auth_error() {
        let err = Error::from(graphql_failure(StatusCode::UNAUTHORIZED, None));
        assert!(err.is_auth_error());

        let err = Error::from(graphql_failure(StatusCode::FORBIDDEN, None));
        assert!(err.is_auth_error());

        let err = Error::from(graphql_failure(StatusCode::INTERNAL_SERVER_ERROR, None));
        assert!(!err.is_auth_error());
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        assert!(!Error::Config("nope".to_string()).is_auth_error());
    }
}
