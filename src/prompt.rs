//! Prompt construction from conversation state.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::client::ClientError;
use crate::model::{Conversation, Message, Role};

/// Turns a conversation into the text prompt sent to the backend.
pub trait PromptBuilder: Send + Sync {
    fn build_prompt(&self, conversation: &Conversation) -> Result<String, ClientError>;
}

/// Token-template prompt builder.
///
/// Produces `<preprompt><user>..<end><assistant>..<end>...<assistant>`, leaving
/// the last assistant turn open for the model to complete.
///
/// # Example
/// ```rust
/// use triton_stream::model::{Conversation, Message};
/// use triton_stream::prompt::{ChatPromptBuilder, PromptBuilder};
///
/// let prompt = ChatPromptBuilder::default()
///     .build_prompt(&Conversation::new(Message::user("Hi")))
///     .unwrap();
/// assert_eq!(prompt, "<|prompter|>Hi<|endoftext|><|assistant|>");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatPromptBuilder {
    pub user_message_token: String,
    pub user_message_end_token: String,
    pub assistant_message_token: String,
    pub assistant_message_end_token: String,
}

impl Default for ChatPromptBuilder {
    fn default() -> Self {
        Self {
            user_message_token: "<|prompter|>".to_string(),
            user_message_end_token: "<|endoftext|>".to_string(),
            assistant_message_token: "<|assistant|>".to_string(),
            assistant_message_end_token: "<|endoftext|>".to_string(),
        }
    }
}

impl ChatPromptBuilder {
    fn format_message(&self, message: &Message) -> String {
        let (start, end) = match message.role {
            Role::User => (&self.user_message_token, &self.user_message_end_token),
            Role::Assistant => (
                &self.assistant_message_token,
                &self.assistant_message_end_token,
            ),
        };
        format!("{}{}{}", start, message.content, end)
    }
}

impl PromptBuilder for ChatPromptBuilder {
    fn build_prompt(&self, conversation: &Conversation) -> Result<String, ClientError> {
        let history = conversation
            .messages
            .iter()
            .map(|m| self.format_message(m))
            .join("");

        Ok(format!(
            "{}{}{}",
            conversation.preprompt.as_deref().unwrap_or_default(),
            history,
            self.assistant_message_token
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_with_history_and_preprompt() {
        let mut conversation =
            Conversation::new(Message::user("Hi")).with_preprompt("You are terse.");
        conversation.push(Message::assistant("Hello."));
        conversation.push(Message::user("Bye"));

        let prompt = ChatPromptBuilder::default().build_prompt(&conversation).unwrap();
        assert_eq!(
            prompt,
            "You are terse.<|prompter|>Hi<|endoftext|><|assistant|>Hello.<|endoftext|><|prompter|>Bye<|endoftext|><|assistant|>"
        );
    }

    #[test]
    fn test_custom_tokens_from_json() {
        let builder: ChatPromptBuilder = serde_json::from_str(
            r#"{"userMessageToken": "[INST]", "userMessageEndToken": "[/INST]", "assistantMessageToken": "", "assistantMessageEndToken": "</s>"}"#,
        )
        .unwrap();

        let prompt = builder
            .build_prompt(&Conversation::new(Message::user("Hi")))
            .unwrap();
        assert_eq!(prompt, "[INST]Hi[/INST]");
    }
}
