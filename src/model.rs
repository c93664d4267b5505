//! Data models for conversations, token records and decode outcomes.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::client::ClientError;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation state handed to a prompt builder.
///
/// A conversation always holds at least one message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// System text placed before the first message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprompt: Option<String>,

    /// Conversation history, oldest first
    pub messages: NonEmpty<Message>,
}

impl Conversation {
    /// Start a conversation with its first message.
    pub fn new(first: Message) -> Self {
        Self {
            preprompt: None,
            messages: NonEmpty::new(first),
        }
    }

    /// Build a conversation from a list of messages.
    ///
    /// Returns `None` when `messages` is empty.
    pub fn from_messages(messages: Vec<Message>) -> Option<Self> {
        NonEmpty::from_vec(messages).map(|messages| Self {
            preprompt: None,
            messages,
        })
    }

    /// Set the preprompt.
    pub fn with_preprompt(mut self, preprompt: impl Into<String>) -> Self {
        self.preprompt = Some(preprompt.into());
        self
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message.
    pub fn last(&self) -> &Message {
        self.messages.last()
    }
}

/// One emitted unit of generated text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Position in the sequence, starting at 0
    pub id: u64,

    /// Text generated since the previous record
    pub text: String,

    /// Set on the last record of a finished generation
    pub is_final: bool,

    /// Complete generated text, only on the final record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

/// Why a token sequence stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// The backend signalled the end of the sequence.
    Finished,
    /// The body ended, or delivered an empty chunk, before the final event.
    ClosedEarly,
    /// A data line did not contain valid JSON.
    Malformed,
    /// Reading the body failed.
    TransportFailed,
}

impl Completion {
    /// Whether the generation ran to its end.
    pub fn is_finished(&self) -> bool {
        matches!(self, Completion::Finished)
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Completion::Finished => "finished",
            Completion::ClosedEarly => "stream closed before the final event",
            Completion::Malformed => "malformed event",
            Completion::TransportFailed => "transport failed",
        };
        f.write_str(reason)
    }
}

/// A drained token sequence and the reason it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub records: Vec<TokenRecord>,
    pub completion: Completion,
}

impl Generation {
    /// Concatenation of every emitted delta.
    pub fn text(&self) -> String {
        self.records.iter().map(|r| r.text.as_str()).collect()
    }

    /// The final record, if the backend sent one.
    pub fn final_record(&self) -> Option<&TokenRecord> {
        self.records.last().filter(|r| r.is_final)
    }

    /// Full generated text, or [`ClientError::Incomplete`] when the sequence
    /// stopped early.
    pub fn into_result(self) -> Result<String, ClientError> {
        if !self.completion.is_finished() {
            return Err(ClientError::Incomplete(self.completion));
        }
        let completion = self.completion;
        self.records
            .into_iter()
            .last()
            .and_then(|r| r.full_text)
            .ok_or(ClientError::Incomplete(completion))
    }
}
