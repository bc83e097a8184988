//! Command-line interface definition for Assis
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for browsing conversation history and settings.

use crate::storage::{ExportFormat, Role};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Assis - conversation history for a chat assistant
///
/// Inspect, rename, export and delete stored conversations, and manage
/// the persisted chat preferences.
#[derive(Parser, Debug, Clone)]
#[command(name = "assis")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the conversation database path
    #[arg(long, env = "ASSIS_HISTORY_DB")]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Assis
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage stored conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Manage persisted settings
    Settings {
        /// Settings subcommand
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

/// Conversation history subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List conversations, most recently active first
    List {
        /// Maximum number of conversations to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create an empty conversation and print its id
    New {
        /// Conversation title
        #[arg(short, long)]
        title: Option<String>,
    },

    /// Print a conversation transcript
    Show {
        /// Conversation id
        id: i64,
    },

    /// Rename a conversation
    Rename {
        /// Conversation id
        id: i64,

        /// New title
        title: String,
    },

    /// Append a message to a conversation
    Add {
        /// Conversation id
        id: i64,

        /// Message author (user, assistant)
        #[arg(short, long)]
        role: Role,

        /// Message body
        #[arg(long)]
        content: String,

        /// Input tokens billed for the turn
        #[arg(long, default_value_t = 0)]
        input_tokens: u64,

        /// Output tokens billed for the turn
        #[arg(long, default_value_t = 0)]
        output_tokens: u64,

        /// Model that produced the message
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Delete a conversation and its messages
    Delete {
        /// Conversation id
        id: i64,
    },

    /// Export a conversation
    Export {
        /// Conversation id
        id: i64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,

        /// Write to this file (or into this directory) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Settings subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// List every stored setting
    List,

    /// Print one setting as JSON
    Get {
        /// Setting key
        key: String,
    },

    /// Store a setting. Values that are not valid JSON are stored as strings.
    Set {
        /// Setting key
        key: String,

        /// Value (JSON)
        value: String,
    },

    /// Remove a setting
    Delete {
        /// Setting key
        key: String,
    },

    /// Show the chat preferences with defaults applied
    Prefs,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
