//! Core endpoint trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Completion, Conversation};
use crate::stream::StreamDecoder;
use crate::transport::Transport;

/// Errors that can occur during endpoint operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The token stream stopped without a final record.
    #[error("Generation incomplete: {0}")]
    Incomplete(Completion),
}

/// A text-generation backend that answers a conversation with a token stream.
///
/// Implementors build the outbound request, send it, and hand the response
/// body to a [`StreamDecoder`]. Errors before the first byte of the body
/// (configuration, prompt, HTTP status) are returned here. Everything after
/// that ends the token sequence instead of surfacing as an error.
///
/// # Example
/// ```rust,ignore
/// let mut decoder = endpoint.generate(&conversation).await?;
/// while let Some(token) = decoder.next_token().await {
///     print!("{}", token.text);
/// }
/// ```
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// Transport the returned decoder reads from.
    type Transport: Transport + 'static;

    /// Send `conversation` to the backend and start decoding its reply.
    async fn generate(
        &self,
        conversation: &Conversation,
    ) -> Result<StreamDecoder<Self::Transport>, ClientError>;
}
