//! Endpoint and transport configuration.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;
use crate::sse::Framing;

/// Default Triton ensemble streaming endpoint.
pub const DEFAULT_URL: &str = "http://localhost:31080/v2/models/ensemble/generate";
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_STOP_WORD: &str = "</s>";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Options for a Triton text-generation endpoint.
///
/// Every field is optional when deserializing; missing ones take their
/// defaults.
///
/// # Example
/// ```rust
/// use triton_stream::options::TritonOptions;
///
/// let options: TritonOptions = serde_json::from_str(
///     r#"{"url": "http://triton:8000/v2/models/ensemble/generate_stream", "maxTokens": 256}"#,
/// ).unwrap();
/// assert_eq!(options.max_tokens, 256);
/// assert_eq!(options.stop_words, vec!["</s>".to_string()]);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TritonOptions {
    /// Generation endpoint URL
    pub url: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sequences that end generation
    pub stop_words: Vec<String>,

    /// Sequences the backend must not generate
    pub bad_words: Vec<String>,

    /// Relative weight when several endpoints serve the same model
    pub weight: u32,

    /// How the response body is split into event lines
    pub framing: Framing,
}

impl Default for TritonOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            stop_words: vec![DEFAULT_STOP_WORD.to_string()],
            bad_words: Vec::new(),
            weight: 1,
            framing: Framing::Lines,
        }
    }
}

impl TritonOptions {
    /// Set the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the stop words.
    pub fn with_stop_words(mut self, stop_words: Vec<String>) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Replace the bad words.
    pub fn with_bad_words(mut self, bad_words: Vec<String>) -> Self {
        self.bad_words = bad_words;
        self
    }

    /// Set the framing of the response body.
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Check the options before any request is made.
    pub fn validate(&self) -> Result<(), ClientError> {
        Url::parse(&self.url)
            .map_err(|e| ClientError::Config(format!("invalid url {:?}: {}", self.url, e)))?;
        if self.max_tokens == 0 {
            return Err(ClientError::Config("maxTokens must be positive".to_string()));
        }
        if self.weight == 0 {
            return Err(ClientError::Config("weight must be positive".to_string()));
        }
        Ok(())
    }
}

/// Generic transport options containing truly generic transport fields
/// and provider-specific transport configuration.
///
/// # Type Parameters
/// - `T`: Provider-specific transport options type
///
/// # Example
/// ```rust
/// use triton_stream::options::{TransportOptions, HttpConfig, SecretString};
/// use std::time::Duration;
///
/// let options = TransportOptions {
///     timeout: Some(Duration::from_secs(30)),
///     provider: HttpConfig {
///         api_key: Some(SecretString::new("hf_...".to_string())),
///         proxy: None,
///         extra_headers: None,
///     },
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransportOptions<T> {
    /// Request timeout, covering the whole streamed body
    pub timeout: Option<Duration>,

    /// Provider-specific transport options
    pub provider: T,
}

/// HTTP-specific transport options.
/// Used as the provider field in `TransportOptions<HttpConfig>`.
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Bearer token, sent only when set
    pub api_key: Option<SecretString>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpConfig {
    /// Create new HTTP options with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            proxy: None,
            extra_headers: None,
        }
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

impl<T> TransportOptions<T> {
    /// Create new transport options with provider-specific configuration.
    pub fn new(provider: T) -> Self {
        Self {
            timeout: None,
            provider,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
