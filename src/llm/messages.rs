//! Conversation history formatting.
//!
//! Maps an ordered conversation history onto the role-tagged message
//! list the chat endpoint expects. Pure transformation: no I/O, input
//! order preserved exactly, nothing deduplicated or dropped.

use super::types::{ChatMessage, Role};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Originator {
    /// The end user chatting with the application.
    User,
    /// The application side (bot replies, injected system output).
    System,
}

/// One turn of conversation history, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub originator: Originator,
    /// Turn text. A turn can carry no text (attachment-only messages);
    /// it is still sent, with empty content.
    pub text: Option<String>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            originator: Originator::User,
            text: Some(text.into()),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            originator: Originator::System,
            text: Some(text.into()),
        }
    }
}

/// Format a conversation history for the chat endpoint.
///
/// User turns become `user` messages; every other turn becomes an
/// `assistant` message. A turn without text yields an empty content
/// string, never an omitted message.
pub fn format_history(history: &[ConversationTurn]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.originator {
                Originator::User => Role::User,
                Originator::System => Role::Assistant,
            };
            ChatMessage::new(role, turn.text.clone().unwrap_or_default())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn_maps_to_user_role() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::system("yo"),
        ];
        let messages = format_history(&history);
        assert_eq!(
            messages,
            vec![
                ChatMessage::new(Role::User, "hi"),
                ChatMessage::new(Role::Assistant, "yo"),
            ]
        );
    }

    #[test]
    fn test_missing_text_yields_empty_content() {
        let history = vec![ConversationTurn {
            originator: Originator::System,
            text: None,
        }];
        let messages = format_history(&history);
        assert_eq!(messages.len(), 1, "textless turns are never dropped");
        assert_eq!(messages[0].content, "");
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_order_preserved_with_duplicates() {
        let history = vec![
            ConversationTurn::user("same"),
            ConversationTurn::user("same"),
            ConversationTurn::system("reply"),
            ConversationTurn::user("same"),
        ];
        let messages = format_history(&history);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].content, "same");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let history = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::system("yo"),
        ];
        assert_eq!(format_history(&history), format_history(&history));
    }

    #[test]
    fn test_empty_history_yields_empty_list() {
        assert!(format_history(&[]).is_empty());
    }
}
