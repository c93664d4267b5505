//! # triton-stream - streaming token decoder for Triton generation endpoints
//!
//! Turns the chunked `data: {...}` body of a Triton `generate_stream`
//! response into an incremental sequence of token records for progressive
//! rendering.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Pull-based decoder with a `futures::Stream` adapter
//! - Deltas computed from cumulative `text_output` payloads
//! - Distinguishable completion reasons (finished, closed early, malformed,
//!   transport failure) without raising errors mid-stream
//! - Transport released on every ending, including early drop
//!
//! ## Architecture
//!
//! - **`Transport`**: source of decoded text chunks (an HTTP body in practice)
//! - **`StreamDecoder`**: frames lines, parses events, emits `TokenRecord`s
//! - **`Endpoint`**: builds the prompt, sends the request, returns a decoder
//!
//! ## Example
//! ```no_run
//! use triton_stream::client::Endpoint;
//! use triton_stream::model::{Conversation, Message};
//! use triton_stream::options::{HttpConfig, TransportOptions, TritonOptions};
//! use triton_stream::providers::TritonClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TritonClient::new(
//!         TritonOptions::default().with_max_tokens(256),
//!         TransportOptions::new(HttpConfig::default()),
//!     );
//!
//!     let conversation = Conversation::new(Message::user("Hello!"));
//!     let mut decoder = client.generate(&conversation).await?;
//!
//!     while let Some(token) = decoder.next_token().await {
//!         print!("{}", token.text);
//!     }
//!     println!("\n[{:?}]", decoder.completion());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod prompt;
pub mod providers;
pub mod sse;
pub mod stream;
pub mod transport;

// Re-exports for convenience
pub use client::{ClientError, Endpoint};
pub use model::{Completion, Conversation, Generation, Message, TokenRecord};
pub use stream::StreamDecoder;
pub use transport::{ByteStreamTransport, Transport};
