//! graphql types
//!
//! the outbound operation envelope and the parsed response body.

use serde::{Deserialize, Deserializer, Serialize};

/// operation variables, kept in insertion order on the wire
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// outbound request payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationEnvelope {
    /// query or mutation document
    pub query: String,
    /// operation variables; omitted from the body when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Variables>,
}

impl OperationEnvelope {
    /// create an envelope
    pub fn new(query: impl Into<String>, variables: Option<Variables>) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }

    /// serialize to the json request body
    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// parsed graphql response body
///
/// `errors` distinguishes an absent field (`None`) from an empty list, since
/// classification only passes a body with no `errors` field at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphQlResponse {
    /// response data, `None` when absent or null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// graphql errors array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
    /// server extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
    /// any other top-level members the server sent
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GraphQlResponse {
    /// true if the body carries an `errors` field
    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }
}

/// graphql error entry
///
/// lenient about server quirks: a missing message reads as empty
/// and null `locations`/`path` read as empty lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphQlError {
    /// error message
    #[serde(default)]
    pub message: String,
    /// error locations in the query
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

/// graphql error location
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_omits_missing_variables() {
        let body = OperationEnvelope::new("{ ok }", None).to_body().unwrap();
        assert_eq!(body, r#"{"query":"{ ok }"}"#);
    }

    #[test]
    fn test_envelope_keeps_variables_and_order() {
        let mut variables = Variables::new();
        variables.insert("zeta".to_string(), json!(1));
        variables.insert("alpha".to_string(), json!({"nested": [true]}));

        let envelope =
            OperationEnvelope::new("query Q($zeta: Int) { q }", Some(variables));
        let body = envelope.to_body().unwrap();
        assert_eq!(
            body,
            concat!(
                r#"{"query":"query Q($zeta: Int) { q }","#,
                r#""variables":{"zeta":1,"alpha":{"nested":[true]}}}"#,
            )
        );

        let decoded: OperationEnvelope = serde_json::from_str(&body).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_empty_variables_are_serialized() {
        let body = OperationEnvelope::new("{ ok }", Some(Variables::new()))
            .to_body()
            .unwrap();
        assert_eq!(body, r#"{"query":"{ ok }","variables":{}}"#);
    }

    #[test]
    fn test_response_null_fields_are_absent() {
        let parsed: GraphQlResponse =
            serde_json::from_str(r#"{"data": null, "errors": null, "trace": "abc"}"#).unwrap();
        assert!(parsed.data.is_none());
        assert!(!parsed.has_errors());
        assert_eq!(parsed.extra["trace"], "abc");
    }

    #[test]
    fn test_response_errors_with_locations() {
        let parsed: GraphQlResponse = serde_json::from_str(
            r#"{"errors": [{"message": "boom",
                "locations": [{"line": 2, "column": 7}], "path": ["a", 0]}]}"#,
        )
        .unwrap();
        let errors = parsed.errors.unwrap();
        assert_eq!(errors[0].message, "boom");
        assert_eq!(errors[0].locations[0], GraphQlLocation { line: 2, column: 7 });
        assert_eq!(errors[0].path, vec![json!("a"), json!(0)]);
    }

    #[test]
    fn test_error_entry_tolerates_missing_message_and_nulls() {
        let parsed: GraphQlResponse = serde_json::from_str(
            r#"{"errors": [{"code": "FORBIDDEN", "locations": null, "path": null}]}"#,
        )
        .unwrap();
        let errors = parsed.errors.unwrap();
        assert_eq!(errors[0].message, "");
        assert!(errors[0].locations.is_empty());
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn test_empty_errors_list_counts_as_errors() {
        let parsed: GraphQlResponse =
            serde_json::from_str(r#"{"data": {"ok": true}, "errors": []}"#).unwrap();
        assert!(parsed.has_errors());
    }
}
