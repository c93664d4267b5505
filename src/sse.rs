//! Event line framing for streamed generation bodies.
//!
//! The backend sends one JSON object per data line:
//! ```text
//! data: {"text_output": "Hello", "sequence_end": false}
//!
//! data: {"text_output": "Hello world", "sequence_end": true}
//! ```
//!
//! Only the `data: ` prefix is understood. Any other line (comments,
//! keep-alives, blank separators) carries no event.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Prefix marking a line that carries an event.
pub const DATA_PREFIX: &str = "data: ";

/// How delivered text chunks map onto logical lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Accumulate chunks and split on `\n`. Lines may span chunks.
    #[default]
    Lines,
    /// Every delivered chunk is exactly one line.
    Chunks,
}

/// Splits incoming text chunks into complete logical lines.
///
/// # Example
/// ```
/// use triton_stream::sse::{Framing, LineBuffer};
///
/// let mut lines = LineBuffer::new(Framing::Lines);
/// lines.push("data: {\"a\"");
/// assert_eq!(lines.next_line(), None);
/// lines.push(": 1}\n");
/// assert_eq!(lines.next_line().as_deref(), Some("data: {\"a\": 1}"));
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    framing: Framing,
    buffer: String,
    lines: VecDeque<String>,
}

impl LineBuffer {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buffer: String::new(),
            lines: VecDeque::new(),
        }
    }

    /// Feed a chunk of decoded text.
    pub fn push(&mut self, chunk: &str) {
        match self.framing {
            Framing::Chunks => self.lines.push_back(chunk.to_string()),
            Framing::Lines => {
                self.buffer.push_str(chunk);
                while let Some(pos) = self.buffer.find('\n') {
                    let line = self.buffer[..pos].trim_end_matches('\r').to_string();
                    self.buffer.drain(..=pos);
                    self.lines.push_back(line);
                }
            }
        }
    }

    /// Treat whatever is left in the buffer as a final line.
    ///
    /// Called once the transport has ended.
    pub fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.lines.push_back(line.trim_end_matches('\r').to_string());
        }
    }

    /// Next complete line, in arrival order.
    pub fn next_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

/// Parse an event line to extract the data portion.
///
/// Event lines are in the format: `data: <content>`
///
/// # Example
/// ```
/// use triton_stream::sse::parse_sse_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"key\": \"value\"}"));
///
/// let line = ": keep-alive";
/// assert_eq!(parse_sse_line(line), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(|s| s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_line() {
        assert_eq!(parse_sse_line("data: hello"), Some("hello"));
        assert_eq!(
            parse_sse_line("data: {\"key\": \"value\"}\n\n"),
            Some("{\"key\": \"value\"}")
        );
        assert_eq!(parse_sse_line("data:   spaces  "), Some("spaces"));
        assert_eq!(parse_sse_line("data:nospace"), None);
        assert_eq!(parse_sse_line(" data: indented"), None);
        assert_eq!(parse_sse_line(": ping"), None);
        assert_eq!(parse_sse_line(""), None);
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut lines = LineBuffer::new(Framing::Lines);
        lines.push("data: one\r\n\r\ndata: t");
        lines.push("wo\n");

        assert_eq!(lines.next_line().as_deref(), Some("data: one"));
        assert_eq!(lines.next_line().as_deref(), Some(""));
        assert_eq!(lines.next_line().as_deref(), Some("data: two"));
        assert_eq!(lines.next_line(), None);
    }

    #[test]
    fn test_flush_releases_partial_line() {
        let mut lines = LineBuffer::new(Framing::Lines);
        lines.push("data: tail");
        assert_eq!(lines.next_line(), None);

        lines.flush();
        assert_eq!(lines.next_line().as_deref(), Some("data: tail"));

        lines.flush();
        assert_eq!(lines.next_line(), None);
    }

    #[test]
    fn test_chunk_framing_keeps_chunks_whole() {
        let mut lines = LineBuffer::new(Framing::Chunks);
        lines.push("data: {\"text_output\": \"a\"}\n\n");
        lines.push("data: partial");

        assert_eq!(
            lines.next_line().as_deref(),
            Some("data: {\"text_output\": \"a\"}\n\n")
        );
        assert_eq!(lines.next_line().as_deref(), Some("data: partial"));
        assert_eq!(lines.next_line(), None);
    }
}
