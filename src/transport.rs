//! Transport seam between an HTTP response body and the token decoder.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::client::ClientError;

/// Source of decoded text chunks.
///
/// `read_chunk` returns `Ok(None)` once the source has ended. `cancel`
/// releases the underlying read resources; it is idempotent, and reads after
/// it return `Ok(None)`.
#[async_trait]
pub trait Transport: Send {
    async fn read_chunk(&mut self) -> Result<Option<String>, ClientError>;

    fn cancel(&mut self);
}

/// Transport over a stream of raw body bytes.
///
/// Bytes are decoded as UTF-8 incrementally. A multi-byte character split
/// between two network chunks is held back until it is complete, and invalid
/// sequences decode to U+FFFD.
pub struct ByteStreamTransport {
    inner: Option<BoxStream<'static, Result<Bytes, ClientError>>>,
    decoder: Utf8Decoder,
}

impl ByteStreamTransport {
    pub fn new<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<ClientError>,
    {
        Self {
            inner: Some(stream.map(|chunk| chunk.map_err(Into::into)).boxed()),
            decoder: Utf8Decoder::default(),
        }
    }

    /// Read the body of an HTTP response.
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(response.bytes_stream())
    }

    /// Whether the body is still open.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

#[async_trait]
impl Transport for ByteStreamTransport {
    async fn read_chunk(&mut self) -> Result<Option<String>, ClientError> {
        loop {
            let Some(inner) = self.inner.as_mut() else {
                return Ok(None);
            };

            match inner.next().await {
                Some(Ok(bytes)) => {
                    let text = self.decoder.decode(&bytes);
                    // A lone fragment of a multi-byte character decodes to nothing yet.
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Some(text));
                }
                Some(Err(e)) => return Err(e),
                None => {
                    self.inner = None;
                    let tail = self.decoder.finish();
                    return Ok(Some(tail).filter(|t| !t.is_empty()));
                }
            }
        }
    }

    fn cancel(&mut self) {
        self.inner = None;
    }
}

/// Incremental UTF-8 decoder that carries incomplete sequences over.
#[derive(Debug, Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flush bytes left at end of input.
    fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        char::REPLACEMENT_CHARACTER.to_string()
    }
}
