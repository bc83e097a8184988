//! Markdown and JSON exports of a stored conversation

use super::types::{format_timestamp, Conversation, ConversationExport, Message};
use super::{read_conversation, read_messages, ConversationStore};
use crate::error::{AssisError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for a conversation export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Human-readable transcript
    #[default]
    Markdown,
    /// `{conversation, messages}` document
    Json,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

/// Render a conversation transcript as Markdown
pub fn render_markdown(conversation: &Conversation, messages: &[Message]) -> String {
    let mut md = format!("# {}\n\n", conversation.title);
    md.push_str(&format!(
        "- Created: {}\n",
        format_timestamp(&conversation.created_at)
    ));
    md.push_str(&format!(
        "- Updated: {}\n",
        format_timestamp(&conversation.updated_at)
    ));
    if let Some(model) = &conversation.model_used {
        md.push_str(&format!("- Model: {}\n", model));
    }
    md.push_str(&format!(
        "- Total Tokens: {}\n\n",
        conversation.total_tokens()
    ));
    md.push_str("---\n\n");

    for message in messages {
        md.push_str(&format!(
            "{}\n\n{}\n\n---\n\n",
            message.role.transcript_label(),
            message.content
        ));
    }

    md
}

/// Suggested file name for an export of a conversation titled `title`
///
/// Characters that cannot appear in a file name are replaced with `_`.
/// Blank titles fall back to `conversation`.
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem = if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "conversation".to_string()
    } else {
        stem
    };
    format!("{}.{}", stem, format.extension())
}

impl ConversationStore {
    /// Markdown transcript of a conversation, `None` if it does not exist
    pub fn export_conversation_to_markdown(&self, id: i64) -> Result<Option<String>> {
        Ok(self
            .read_snapshot(id)?
            .map(|export| render_markdown(&export.conversation, &export.messages)))
    }

    /// Conversation record plus its messages, `None` if it does not exist
    pub fn export_conversation_to_json(&self, id: i64) -> Result<Option<ConversationExport>> {
        self.read_snapshot(id)
    }

    /// Conversation and messages read inside one transaction, so totals
    /// always agree with the listed messages
    fn read_snapshot(&self, id: i64) -> Result<Option<ConversationExport>> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| AssisError::storage("Failed to start transaction", e))?;

        let Some(conversation) = read_conversation(&tx, id)? else {
            return Ok(None);
        };
        let messages = read_messages(&tx, id)?;

        tx.commit()
            .map_err(|e| AssisError::storage("Failed to finish read", e))?;
        Ok(Some(ConversationExport {
            conversation,
            messages,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Role;
    use crate::test_utils::create_test_store;
    use chrono::{TimeZone, Utc};

    fn sample_conversation(model: Option<&str>) -> Conversation {
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        Conversation {
            id: 1,
            title: "Intro".to_string(),
            created_at: ts,
            updated_at: ts,
            total_input_tokens: 5,
            total_output_tokens: 10,
            model_used: model.map(str::to_string),
        }
    }

    fn sample_message(id: i64, role: Role, content: &str) -> Message {
        Message {
            id,
            conversation_id: 1,
            role,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    #[test]
    fn test_render_markdown_layout() {
        let conversation = sample_conversation(Some("claude-sonnet-4-5"));
        let messages = vec![
            sample_message(1, Role::User, "Hi"),
            sample_message(2, Role::Assistant, "Hello"),
        ];

        let md = render_markdown(&conversation, &messages);
        let expected = "# Intro\n\n\
            - Created: 2025-03-01T12:00:00.000000Z\n\
            - Updated: 2025-03-01T12:00:00.000000Z\n\
            - Model: claude-sonnet-4-5\n\
            - Total Tokens: 15\n\n\
            ---\n\n\
            **You:**\n\nHi\n\n---\n\n\
            **Assistant:**\n\nHello\n\n---\n\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_render_markdown_omits_missing_model() {
        let md = render_markdown(&sample_conversation(None), &[]);
        assert!(!md.contains("Model:"));
        assert!(md.ends_with("---\n\n"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Intro", ExportFormat::Markdown), "Intro.md");
        assert_eq!(export_file_name("a/b: c?", ExportFormat::Json), "a_b_ c_.json");
        assert_eq!(export_file_name("   ", ExportFormat::Json), "conversation.json");
        assert_eq!(export_file_name("..", ExportFormat::Markdown), "conversation.md");
    }

    #[test]
    fn test_export_missing_conversation_is_none() {
        let (store, _dir) = create_test_store();
        assert!(store.export_conversation_to_markdown(5).unwrap().is_none());
        assert!(store.export_conversation_to_json(5).unwrap().is_none());
    }

    #[test]
    fn test_export_json_of_empty_conversation() {
        let (store, _dir) = create_test_store();
        let id = store.create_conversation(Some("Empty")).unwrap();

        let export = store.export_conversation_to_json(id).unwrap().expect("exists");
        assert!(export.messages.is_empty());
        assert_eq!(Some(export.conversation), store.get_conversation(id).unwrap());
    }

    #[test]
    fn test_export_json_serializes_expected_shape() {
        let (store, _dir) = create_test_store();
        let id = store.create_conversation(Some("Shape")).unwrap();
        store.add_user_message(id, "Hi").unwrap();

        let export = store.export_conversation_to_json(id).unwrap().unwrap();
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["conversation"]["title"], "Shape");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hi");
    }

    #[test]
    fn test_export_totals_match_listed_messages() {
        let (store, _dir) = create_test_store();
        let id = store.create_conversation(Some("Usage")).unwrap();
        store.add_user_message(id, "Hi").unwrap();
        store.add_assistant_message(id, "Hello", 5, 10).unwrap();

        let export = store.export_conversation_to_json(id).unwrap().unwrap();
        let listed: u64 = export
            .messages
            .iter()
            .map(|m| m.input_tokens + m.output_tokens)
            .sum();
        assert_eq!(listed, export.conversation.total_tokens());

        let md = store.export_conversation_to_markdown(id).unwrap().unwrap();
        assert!(md.contains("- Total Tokens: 15"));
        assert!(md.contains("**Assistant:**\n\nHello"));
    }
}
