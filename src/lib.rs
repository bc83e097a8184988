//! Assis - conversation persistence for a chat assistant
//!
//! This library stores chat conversations, their messages and user
//! settings in a single local SQLite file, and exports conversations to
//! Markdown or JSON.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: The conversation store (schema, conversations, messages, settings, export)
//! - `preferences`: Chat preferences persisted through settings
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and handlers
//!
//! # Example
//!
//! ```no_run
//! use assis::storage::{ConversationStore, Role};
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = ConversationStore::new()?;
//!     let id = store.create_conversation(Some("Intro"))?;
//!     store.add_message(id, Role::User, "Hi", 0, 0)?;
//!     store.add_message(id, Role::Assistant, "Hello", 5, 10)?;
//!     store.update_conversation_model(id, "claude-haiku-4-5-20251001")?;
//!
//!     if let Some(md) = store.export_conversation_to_markdown(id)? {
//!         println!("{}", md);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod preferences;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{AssisError, Result};
pub use preferences::ChatPreferences;
pub use storage::{Conversation, ConversationStore, Message, Role};

#[cfg(test)]
pub mod test_utils;
