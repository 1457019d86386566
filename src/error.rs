//! error types
//!
//! structured errors for config, io, parsing, reference resolution, and
//! graphql responses.

use crate::graphql::GraphQlError;
use graphql_parser::Pos;
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the generator and runtime client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema parse error: {0}")]
    SchemaParse(#[from] graphql_parser::schema::ParseError),

    #[error("document parse error: {0}")]
    DocumentParse(graphql_parser::query::ParseError),

    /// a type appeared in a position the generator has no handling for
    #[error("unknown type `{name}` at {position}")]
    UnknownType {
        /// name of the offending type
        name: String,
        /// source position of the node that referenced it
        position: Pos,
    },

    /// a selected field does not exist on its parent type
    #[error("unknown field `{field}` on type `{parent}` at {position}")]
    UnknownField {
        /// selected field name
        field: String,
        /// enclosing type name
        parent: String,
        /// source position of the selection
        position: Pos,
    },

    /// an operation without any selection
    #[error("operation `{operation}` at {position} has no selections")]
    MalformedSelection {
        /// operation name
        operation: String,
        /// source position of the operation
        position: Pos,
    },

    /// the document sources yielded nothing to generate from
    #[error("no graphql documents found for `{pattern}`")]
    NoDocumentsFound {
        /// glob pattern or source label that came up empty
        pattern: String,
    },

    #[error("graphql error: {message}")]
    GraphQl {
        /// http status if available
        status: Option<u16>,
        /// graphql error list
        errors: Vec<GraphQlError>,
        /// raw response body
        body: String,
        /// top-level message
        message: String,
    },
}

impl Error {
    /// true if the error aborts a generation run (as opposed to the soft
    /// no-documents case callers may recover from)
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::NoDocumentsFound { .. })
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
