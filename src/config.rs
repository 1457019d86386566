//! configuration
//!
//! [`ClientConfig`] drives the runtime client; [`GeneratorConfig`] drives a
//! generation run. both follow the builder-with-defaults pattern, and the
//! generator config additionally deserializes from a json file for the cli.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// configuration for the runtime graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// graphql endpoint url (e.g., "<https://api.example.com/graphql>")
    pub(crate) endpoint: Url,

    /// whether the provided endpoint parsed successfully
    pub(crate) endpoint_valid: bool,

    /// optional bearer token sent as the authorization header
    pub(crate) token: Option<String>,

    /// optional url serving the schema as sdl text
    pub(crate) schema_url: Option<String>,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,
}

impl ClientConfig {
    /// create a new client configuration for a graphql endpoint
    ///
    /// # example
    ///
    /// ```
    /// use querygen::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let endpoint_str = endpoint.as_ref();
        let normalized = endpoint_str.trim_end_matches('/');

        let (endpoint, endpoint_valid) = match Url::parse(normalized)
            .or_else(|_| Url::parse(&format!("https://{}", normalized)))
        {
            Ok(url) => (url, true),
            Err(_) => (Url::parse("https://invalid.invalid").unwrap(), false),
        };

        Self {
            raw_endpoint: endpoint_str.to_string(),
            endpoint,
            endpoint_valid,
            token: None,
            schema_url: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("querygen/{} (Rust)", env!("CARGO_PKG_VERSION")),
            extra_headers: HeaderMap::new(),
        }
    }

    /// set a bearer token for the authorization header
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// set the url the schema can be fetched from as sdl text
    pub fn with_schema_url(mut self, schema_url: impl Into<String>) -> Self {
        self.schema_url = Some(schema_url.into());
        self
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if !self.endpoint_valid {
            return Err(Error::Config(format!(
                "invalid endpoint url: {}",
                self.raw_endpoint
            )));
        }

        if self.endpoint.scheme() != "http" && self.endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                self.endpoint.scheme()
            )));
        }

        Ok(())
    }

    /// graphql endpoint url
    pub(crate) fn graphql_url(&self) -> Url {
        self.endpoint.clone()
    }

    /// schema sdl url, when configured
    pub(crate) fn schema_url(&self) -> Result<Url> {
        let raw = self.schema_url.as_ref().ok_or_else(|| {
            Error::Config("no schema url configured; use with_schema_url".to_string())
        })?;
        Url::parse(raw).map_err(Error::from)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("schema_url", &self.schema_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("extra_headers", &self.extra_headers.len())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// configuration for one generation run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// glob pattern for executable documents
    pub documents: String,

    /// collapse single-selection operations into their field type
    pub collapse_lonely: bool,

    /// prefix prepended to generated function names
    pub function_prefix: String,

    /// custom scalar name to rust type overrides
    pub scalars: BTreeMap<String, String>,

    /// package name for the emitted crate; enables Cargo.toml emission
    pub crate_name: Option<String>,

    /// crate name generated code imports the runtime from
    pub runtime_crate: String,

    /// path dependency for the runtime crate in the emitted Cargo.toml
    pub runtime_path: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            documents: "**/*.graphql".to_string(),
            collapse_lonely: true,
            function_prefix: String::new(),
            scalars: BTreeMap::new(),
            crate_name: None,
            runtime_crate: env!("CARGO_PKG_NAME").to_string(),
            runtime_path: None,
        }
    }
}

impl GeneratorConfig {
    /// configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// read a configuration from json text
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// set the documents glob pattern
    pub fn with_documents(mut self, pattern: impl Into<String>) -> Self {
        self.documents = pattern.into();
        self
    }

    /// enable or disable collapsing of single-selection operations
    ///
    /// default: enabled
    pub fn with_collapse_lonely(mut self, collapse: bool) -> Self {
        self.collapse_lonely = collapse;
        self
    }

    /// set the prefix for generated function names
    pub fn with_function_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_prefix = prefix.into();
        self
    }

    /// map a custom scalar to a rust type in generated code
    pub fn with_scalar(mut self, scalar: impl Into<String>, rust_type: impl Into<String>) -> Self {
        self.scalars.insert(scalar.into(), rust_type.into());
        self
    }

    /// emit a Cargo.toml so the output forms a standalone crate
    pub fn with_crate_name(mut self, name: impl Into<String>) -> Self {
        self.crate_name = Some(name.into());
        self
    }

    /// use a path dependency for the runtime crate in the emitted Cargo.toml
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = Some(path.into());
        self
    }

    /// validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if self.documents.is_empty() {
            return Err(Error::Config(
                "documents glob pattern cannot be empty".to_string(),
            ));
        }

        if let Some(name) = &self.crate_name {
            let valid = !name.is_empty()
                && name
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
            if !valid {
                return Err(Error::Config(format!("invalid crate name: {name}")));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_config() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert_eq!(config.endpoint.as_str(), "https://api.example.com/graphql");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_scheme_fallback() {
        let config = ClientConfig::new("api.example.com/graphql");
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint.scheme(), "https");
    }

    #[test]
    fn test_client_config_invalid_scheme() {
        let config = ClientConfig::new("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_schema_url_requires_configuration() {
        let config = ClientConfig::new("https://api.example.com/graphql");
        assert!(matches!(config.schema_url(), Err(Error::Config(_))));

        let config = config.with_schema_url("https://api.example.com/schema.graphql");
        let url = config.schema_url().unwrap();
        assert_eq!(url.path(), "/schema.graphql");
    }

    #[test]
    fn test_client_builder_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("value"),
        );

        let config = ClientConfig::new("https://api.example.com/graphql")
            .with_token("secret")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("querygen-test")
            .with_headers(headers)
            .with_header(
                HeaderName::from_static("x-other"),
                HeaderValue::from_static("other"),
            );

        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "querygen-test");
        assert_eq!(config.extra_headers.get("x-test").unwrap(), "value");
        assert_eq!(config.extra_headers.get("x-other").unwrap(), "other");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new("https://api.example.com/graphql").with_token("secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorConfig::new();
        assert_eq!(config.documents, "**/*.graphql");
        assert!(config.collapse_lonely);
        assert!(config.crate_name.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generator_from_json() {
        let config = GeneratorConfig::from_json(
            r#"{
                "documents": "queries/*.graphql",
                "collapse_lonely": false,
                "scalars": {"DateTime": "String"},
                "crate_name": "petstore-client"
            }"#,
        )
        .unwrap();

        assert_eq!(config.documents, "queries/*.graphql");
        assert!(!config.collapse_lonely);
        assert_eq!(config.scalars.get("DateTime").map(String::as_str), Some("String"));
        assert_eq!(config.crate_name.as_deref(), Some("petstore-client"));
    }

    #[test]
    fn test_generator_validation() {
        let err = GeneratorConfig::new().with_documents("").validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = GeneratorConfig::new()
            .with_crate_name("not a crate name")
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_generator_builder_helpers() {
        let config = GeneratorConfig::new()
            .with_documents("ops/**/*.graphql")
            .with_collapse_lonely(false)
            .with_function_prefix("api_")
            .with_scalar("JSON", "serde_json::Value")
            .with_crate_name("petstore")
            .with_runtime_path("../querygen");

        assert_eq!(config.documents, "ops/**/*.graphql");
        assert!(!config.collapse_lonely);
        assert_eq!(config.function_prefix, "api_");
        assert_eq!(
            config.scalars.get("JSON").map(String::as_str),
            Some("serde_json::Value")
        );
        assert_eq!(config.crate_name.as_deref(), Some("petstore"));
        assert_eq!(config.runtime_path.as_deref(), Some("../querygen"));
    }
}
