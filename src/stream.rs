//! Incremental decoding of streamed generation bodies into token records.
//!
//! The backend sends the whole generated text on every event rather than a
//! delta, so the decoder remembers how much it has already emitted and cuts
//! the new suffix off each event:
//! ```text
//! data: {"text_output": "Hello", "sequence_end": false}        -> "Hello"
//! data: {"text_output": "Hello world", "sequence_end": true}   -> " world" (final)
//! ```

use futures::stream::{self, Stream};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::model::{Completion, Generation, TokenRecord};
use crate::sse::{parse_sse_line, Framing, LineBuffer};
use crate::transport::Transport;

/// One parsed event payload.
#[derive(Debug, Clone, Default, Deserialize)]
struct GenerateEvent {
    #[serde(default)]
    text_output: Option<String>,
    #[serde(default)]
    sequence_end: Option<bool>,
}

/// Per-session decoding state.
///
/// `last_output_length` always equals `accumulated_text.len()` and never
/// decreases.
#[derive(Debug, Default)]
struct DecoderState {
    last_output_length: usize,
    accumulated_text: String,
    next_token_id: u64,
    done: bool,
}

impl DecoderState {
    /// Turn an event into a record, or `None` when it carries nothing.
    fn apply(&mut self, event: GenerateEvent) -> Option<TokenRecord> {
        let sequence_end = event.sequence_end.unwrap_or(false);
        let has_text = event.text_output.as_deref().is_some_and(|t| !t.is_empty());
        if !has_text && !sequence_end {
            return None;
        }

        let text = match event.text_output {
            Some(text_output) => self.advance(text_output),
            None => String::new(),
        };

        let id = self.next_token_id;
        self.next_token_id += 1;
        if sequence_end {
            self.done = true;
        }

        Some(TokenRecord {
            id,
            text,
            is_final: sequence_end,
            full_text: sequence_end.then(|| self.accumulated_text.clone()),
        })
    }

    /// Adopt a new cumulative text and return the part not seen before.
    fn advance(&mut self, text_output: String) -> String {
        let seen = self.last_output_length;
        let Some(delta) = text_output.get(seen..).map(str::to_owned) else {
            warn!(
                seen,
                received = text_output.len(),
                "cumulative text does not extend what was already emitted, clamping delta"
            );
            return String::new();
        };

        self.last_output_length = text_output.len();
        self.accumulated_text = text_output;
        delta
    }
}

enum LineOutcome {
    Emit(TokenRecord),
    Skip,
    Stop(Completion),
}

/// Decodes a streamed generation body into [`TokenRecord`]s.
///
/// The decoder is single-pass: each call to [`next_token`](Self::next_token)
/// advances the transport, and once it returns `None` the sequence is over
/// for good. The transport is cancelled on every ending, and also when the
/// decoder is dropped early.
///
/// # Example
/// ```ignore
/// let mut decoder = StreamDecoder::new(ByteStreamTransport::from_response(response));
/// while let Some(token) = decoder.next_token().await {
///     print!("{}", token.text);
/// }
/// if decoder.completion() != Some(Completion::Finished) {
///     eprintln!("generation incomplete");
/// }
/// ```
pub struct StreamDecoder<T: Transport> {
    transport: T,
    lines: LineBuffer,
    state: DecoderState,
    transport_ended: bool,
    completion: Option<Completion>,
}

impl<T: Transport> StreamDecoder<T> {
    /// Decode with newline framing.
    pub fn new(transport: T) -> Self {
        Self::with_framing(transport, Framing::default())
    }

    pub fn with_framing(transport: T, framing: Framing) -> Self {
        Self {
            transport,
            lines: LineBuffer::new(framing),
            state: DecoderState::default(),
            transport_ended: false,
            completion: None,
        }
    }

    /// Why the sequence stopped, once it has.
    pub fn completion(&self) -> Option<Completion> {
        self.completion
    }

    /// Number of records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.state.next_token_id
    }

    /// Wait for the next record.
    ///
    /// Returns `None` when the sequence is over: after the final record, when
    /// the transport ends or fails, or on a malformed event.
    pub async fn next_token(&mut self) -> Option<TokenRecord> {
        loop {
            if self.completion.is_some() {
                return None;
            }

            if let Some(line) = self.lines.next_line() {
                match self.process_line(&line) {
                    LineOutcome::Emit(record) => {
                        if record.is_final {
                            self.finish(Completion::Finished);
                        }
                        return Some(record);
                    }
                    LineOutcome::Skip => continue,
                    LineOutcome::Stop(completion) => {
                        self.finish(completion);
                        return None;
                    }
                }
            }

            if self.transport_ended {
                self.finish(Completion::ClosedEarly);
                return None;
            }

            match self.transport.read_chunk().await {
                Ok(Some(chunk)) if !chunk.is_empty() => self.lines.push(&chunk),
                Ok(_) => {
                    self.transport_ended = true;
                    self.lines.flush();
                }
                Err(e) => {
                    warn!(error = %e, "transport read failed, ending token stream");
                    self.finish(Completion::TransportFailed);
                    return None;
                }
            }
        }
    }

    /// Drain the remaining records.
    pub async fn into_generation(mut self) -> Generation {
        let mut records = Vec::new();
        while let Some(record) = self.next_token().await {
            records.push(record);
        }
        Generation {
            records,
            completion: self.completion.unwrap_or(Completion::ClosedEarly),
        }
    }

    /// Consume the decoder as a [`Stream`] of records.
    ///
    /// Dropping the stream cancels the transport.
    pub fn into_stream(self) -> impl Stream<Item = TokenRecord> + Send
    where
        T: 'static,
    {
        stream::unfold(self, |mut decoder| async move {
            let record = decoder.next_token().await?;
            Some((record, decoder))
        })
    }

    fn process_line(&mut self, line: &str) -> LineOutcome {
        let Some(payload) = parse_sse_line(line) else {
            if !line.trim().is_empty() {
                debug!(line, "ignoring non-data line");
            }
            return LineOutcome::Skip;
        };

        let event: GenerateEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "malformed event, ending token stream");
                return LineOutcome::Stop(Completion::Malformed);
            }
        };

        match self.state.apply(event) {
            Some(record) => LineOutcome::Emit(record),
            None => LineOutcome::Skip,
        }
    }

    fn finish(&mut self, completion: Completion) {
        self.completion = Some(completion);
        self.transport.cancel();
        debug!(
            ?completion,
            tokens = self.state.next_token_id,
            sequence_end = self.state.done,
            "token stream ended"
        );
    }
}

impl<T: Transport> Drop for StreamDecoder<T> {
    fn drop(&mut self) {
        if self.completion.is_none() {
            debug!(tokens = self.state.next_token_id, "token stream dropped before completion");
        }
        self.transport.cancel();
    }
}
