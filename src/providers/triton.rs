//! Triton inference server streaming endpoint.
//!
//! Posts the prompt to a TensorRT-LLM ensemble `generate_stream` route and
//! decodes the `data: {...}` event body into token records.
//! See: <https://github.com/triton-inference-server/tensorrtllm_backend>

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use crate::client::{ClientError, Endpoint};
use crate::http::{add_auth_header, add_extra_headers, build_http_client};
use crate::model::Conversation;
use crate::options::{HttpConfig, TransportOptions, TritonOptions};
use crate::prompt::{ChatPromptBuilder, PromptBuilder};
use crate::stream::StreamDecoder;
use crate::transport::ByteStreamTransport;

/// Triton client using HTTP transport.
pub struct TritonClient<P = ChatPromptBuilder> {
    options: TritonOptions,
    transport_options: TransportOptions<HttpConfig>,
    prompt_builder: P,
}

impl TritonClient<ChatPromptBuilder> {
    /// Create a client with the default prompt template.
    pub fn new(options: TritonOptions, transport_options: TransportOptions<HttpConfig>) -> Self {
        Self::with_prompt_builder(options, transport_options, ChatPromptBuilder::default())
    }
}

impl<P: PromptBuilder> TritonClient<P> {
    pub fn with_prompt_builder(
        options: TritonOptions,
        transport_options: TransportOptions<HttpConfig>,
        prompt_builder: P,
    ) -> Self {
        Self {
            options,
            transport_options,
            prompt_builder,
        }
    }

    pub fn options(&self) -> &TritonOptions {
        &self.options
    }

    /// Handle Triton error responses.
    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
        if body.is_empty() {
            ClientError::Provider(format!("Failed to generate text: HTTP {}", status))
        } else {
            ClientError::Provider(format!("Failed to generate text: {}", body))
        }
    }
}

impl Default for TritonClient<ChatPromptBuilder> {
    fn default() -> Self {
        Self::new(TritonOptions::default(), TransportOptions::default())
    }
}

#[async_trait]
impl<P: PromptBuilder> Endpoint for TritonClient<P> {
    type Transport = ByteStreamTransport;

    async fn generate(
        &self,
        conversation: &Conversation,
    ) -> Result<StreamDecoder<Self::Transport>, ClientError> {
        self.options.validate()?;

        let prompt = self.prompt_builder.build_prompt(conversation)?;
        debug!(%prompt, "built prompt");

        let request_body = TritonRequest::from((prompt, &self.options));

        // Build HTTP client with transport options
        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client
            .post(&self.options.url)
            .header(CONTENT_TYPE, "application/json");
        req = add_auth_header(req, &self.transport_options.provider);
        req = add_extra_headers(req, &self.transport_options.provider.extra_headers);

        debug!(url = %self.options.url, "sending generation request");
        let response = req.json(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &body));
        }

        Ok(StreamDecoder::with_framing(
            ByteStreamTransport::from_response(response),
            self.options.framing,
        ))
    }
}

// --- Triton API Request Types ---

#[derive(Debug, Clone, Serialize)]
struct TritonRequest {
    text_input: String,
    max_tokens: u32,
    stream: bool,
    stop_words: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    bad_words: Vec<String>,
}

impl From<(String, &TritonOptions)> for TritonRequest {
    fn from((prompt, options): (String, &TritonOptions)) -> Self {
        TritonRequest {
            text_input: prompt,
            max_tokens: options.max_tokens,
            stream: true,
            stop_words: options.stop_words.clone(),
            bad_words: options.bad_words.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let options = TritonOptions::default().with_max_tokens(64);
        let body = serde_json::to_value(TritonRequest::from(("Hi".to_string(), &options))).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "text_input": "Hi",
                "max_tokens": 64,
                "stream": true,
                "stop_words": ["</s>"],
            })
        );

        let options = options.with_bad_words(vec!["spam".to_string()]);
        let body = serde_json::to_value(TritonRequest::from(("Hi".to_string(), &options))).unwrap();
        assert_eq!(body["bad_words"], serde_json::json!(["spam"]));
    }

    #[test]
    fn test_error_response_message() {
        let err = TritonClient::<ChatPromptBuilder>::handle_error_response(
            reqwest::StatusCode::BAD_REQUEST,
            "unknown model",
        );
        assert_eq!(err.to_string(), "Provider error: Failed to generate text: unknown model");

        let err = TritonClient::<ChatPromptBuilder>::handle_error_response(
            reqwest::StatusCode::BAD_GATEWAY,
            "",
        );
        assert!(err.to_string().contains("502"));
    }
}
