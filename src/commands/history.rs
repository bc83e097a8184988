use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::error::{AssisError, Result};
use crate::storage::{export_file_name, ConversationStore, ExportFormat, Role};
use anyhow::Context;
use colored::Colorize;
use prettytable::{format, Table};
use std::path::{Path, PathBuf};

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = ConversationStore::from_config(&config.storage)?;

    match command {
        HistoryCommand::List { limit, json } => {
            let limit = limit.unwrap_or(config.conversation.recent_limit);
            list_conversations(&store, limit, json, config.conversation.title_display_width)?;
        }
        HistoryCommand::New { title } => {
            let title = title.unwrap_or_else(|| config.conversation.default_title.clone());
            let id = store.create_conversation(Some(title.as_str()))?;
            println!("{}", id);
        }
        HistoryCommand::Show { id } => {
            show_conversation(&store, id)?;
        }
        HistoryCommand::Rename { id, title } => {
            store.update_conversation_title(id, &title)?;
            println!("{}", format!("Renamed conversation {} to '{}'", id, title).green());
        }
        HistoryCommand::Add {
            id,
            role,
            content,
            input_tokens,
            output_tokens,
            model,
        } => {
            let message_id = store.add_message(id, role, &content, input_tokens, output_tokens)?;
            if let Some(model) = model {
                store.update_conversation_model(id, &model)?;
            }
            println!("{}", message_id);
        }
        HistoryCommand::Delete { id } => {
            store.delete_conversation(id)?;
            println!("{}", format!("Deleted conversation {}", id).green());
        }
        HistoryCommand::Export { id, format, output } => {
            export_conversation(&store, id, format, output.as_deref())?;
        }
    }

    Ok(())
}

/// Shorten `title` to `width` characters, marking the cut with `...`
pub fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() > width {
        let kept: String = title.chars().take(width).collect();
        format!("{}...", kept)
    } else {
        title.to_string()
    }
}

fn list_conversations(
    store: &ConversationStore,
    limit: usize,
    json: bool,
    title_width: usize,
) -> Result<()> {
    let conversations = store.get_recent_conversations(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Model".bold(),
        "Messages".bold(),
        "Tokens".bold(),
        "Last Updated".bold()
    ]);

    for summary in conversations {
        let conversation = summary.conversation;
        let model = conversation
            .model_used
            .clone()
            .unwrap_or_else(|| "-".to_string());
        let updated = conversation.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            conversation.id.to_string().cyan(),
            truncate_title(&conversation.title, title_width),
            model,
            summary.message_count,
            conversation.total_tokens(),
            updated
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    println!(
        "Use {} to read a conversation.",
        "assis history show <ID>".cyan()
    );
    println!();

    Ok(())
}

fn show_conversation(store: &ConversationStore, id: i64) -> Result<()> {
    let conversation = store
        .get_conversation(id)?
        .ok_or(AssisError::ConversationNotFound(id))?;
    let messages = store.get_messages(id)?;

    println!("{}", conversation.title.bold());
    println!(
        "Created {}  Updated {}",
        conversation.created_at.format("%Y-%m-%d %H:%M"),
        conversation.updated_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(model) = &conversation.model_used {
        println!("Model: {}", model);
    }
    println!(
        "Tokens: {} in / {} out",
        conversation.total_input_tokens, conversation.total_output_tokens
    );

    if messages.is_empty() {
        println!("\n{}", "No messages yet.".yellow());
    }

    for message in messages {
        let label = match message.role {
            Role::User => "You".green().bold(),
            Role::Assistant => "Assistant".cyan().bold(),
        };
        println!(
            "\n{} {}",
            label,
            message.timestamp.format("%H:%M:%S").to_string().dimmed()
        );
        println!("{}", message.content);
    }

    Ok(())
}

fn export_conversation(
    store: &ConversationStore,
    id: i64,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let contents = match format {
        ExportFormat::Markdown => store.export_conversation_to_markdown(id)?,
        ExportFormat::Json => match store.export_conversation_to_json(id)? {
            Some(export) => Some(serde_json::to_string_pretty(&export)? + "\n"),
            None => None,
        },
    }
    .ok_or(AssisError::ConversationNotFound(id))?;

    let Some(output) = output else {
        print!("{}", contents);
        return Ok(());
    };

    let path: PathBuf = if output.is_dir() {
        let title = store
            .get_conversation(id)?
            .map(|c| c.title)
            .unwrap_or_default();
        output.join(export_file_name(&title, format))
    } else {
        output.to_path_buf()
    };

    std::fs::write(&path, contents)
        .map_err(AssisError::Io)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    tracing::info!(conversation_id = id, path = %path.display(), "Exported conversation");
    println!(
        "{}",
        format!("Exported conversation {} to {}", id, path.display()).green()
    );

    Ok(())
}
