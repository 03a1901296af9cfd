//! Conversation message types.

use serde::{Deserialize, Serialize};

/// The author of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions injected by the application, never shown to the user.
    System,
    /// A turn written by the user.
    User,
    /// A turn produced by the model.
    Assistant,
}

/// A single turn in a conversation.
///
/// Assistant turns that record a failed generation carry `error: true` so
/// callers can render them distinctly; failures stay visible in history
/// rather than being dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored this turn.
    pub role: Role,
    /// The text content of the turn.
    pub content: String,
    /// Whether this turn records a failed exchange.
    #[serde(default, skip_serializing_if = "is_false")]
    pub error: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into(), error: false }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), error: false }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), error: false }
    }

    /// Create an assistant message recording a failed exchange.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), error: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_flag_skipped_when_false() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn error_flag_serialized_when_set() {
        let json = serde_json::to_string(&Message::assistant_error("sorry")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"sorry","error":true}"#);
    }

    #[test]
    fn error_flag_defaults_to_false_on_deserialize() {
        let message: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert!(!message.error);
    }
}
