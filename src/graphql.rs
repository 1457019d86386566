//! graphql types
//!
//! wrappers for graphql responses and errors on the wire.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// graphql response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data or null if errors
    pub data: Option<T>,
    /// graphql errors array
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// unwrap the data payload, turning graphql errors or a missing payload
    /// into [`Error::GraphQl`]
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .first()
                .map(|err| err.message.clone())
                .unwrap_or_else(|| "graphql error".to_string());
            return Err(Error::GraphQl {
                status: None,
                errors: self.errors,
                body: String::new(),
                message,
            });
        }

        self.data.ok_or_else(|| Error::GraphQl {
            status: None,
            errors: Vec::new(),
            body: String::new(),
            message: "missing data in graphql response".to_string(),
        })
    }
}

/// graphql error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

/// graphql error location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_entry(message: &str) -> GraphQlError {
        GraphQlError {
            message: message.to_string(),
            locations: vec![],
            path: vec![],
            extensions: None,
        }
    }

    #[test]
    fn test_has_errors() {
        let ok: GraphQlResponse<serde_json::Value> = GraphQlResponse {
            data: Some(serde_json::json!({"ok": true})),
            errors: vec![],
        };
        assert!(!ok.has_errors());

        let err = GraphQlResponse::<serde_json::Value> {
            data: None,
            errors: vec![error_entry("boom")],
        };
        assert!(err.has_errors());
    }

    #[test]
    fn test_into_data_success() {
        let response: GraphQlResponse<serde_json::Value> = GraphQlResponse {
            data: Some(serde_json::json!({"value": 7})),
            errors: vec![],
        };
        let data = response.into_data().unwrap();
        assert_eq!(data["value"], 7);
    }

    #[test]
    fn test_into_data_errors() {
        let response = GraphQlResponse::<serde_json::Value> {
            data: Some(serde_json::json!({})),
            errors: vec![error_entry("boom")],
        };
        let err = response.into_data().unwrap_err();
        assert!(matches!(err, Error::GraphQl { status: None, .. }));
    }

    #[test]
    fn test_into_data_missing_payload() {
        let response = GraphQlResponse::<serde_json::Value> {
            data: None,
            errors: vec![],
        };
        let err = response.into_data().unwrap_err();
        assert!(err.to_string().contains("missing data"));
    }
}
