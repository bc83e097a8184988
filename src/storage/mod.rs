use crate::config::StorageConfig;
use crate::error::{AssisError, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod export;
pub mod schema;
pub mod settings;
pub mod types;

pub use export::{export_file_name, render_markdown, ExportFormat};
pub use types::{
    Conversation, ConversationExport, ConversationSummary, Message, Role, StoredValue,
};

use types::{SqlCount, SqlTimestamp};

/// Title given to conversations created without one
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// Environment variable that overrides the database location
pub const HISTORY_DB_ENV: &str = "ASSIS_HISTORY_DB";

/// How long a connection waits on a locked database file
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQLite-backed store for conversations, messages and settings
///
/// Each operation opens its own connection and drops it before returning,
/// so no lock is held between calls. Two processes sharing the same file
/// rely on SQLite's own locking; nothing here coordinates them.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl ConversationStore {
    /// Create a new store instance
    ///
    /// Uses `ASSIS_HISTORY_DB` when set, otherwise `assis.db` in the
    /// user's data directory.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(HISTORY_DB_ENV) {
            return Self::new_with_path(override_path);
        }
        Self::new_with_path(Self::default_db_path()?)
    }

    /// Create a store that uses the specified database path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use assis::storage::ConversationStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = ConversationStore::new_with_path(dir.path().join("assis.db")).unwrap();
    /// let id = store.create_conversation(Some("Intro")).unwrap();
    /// assert!(store.get_conversation(id).unwrap().is_some());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        Self::open(
            db_path.into(),
            Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        )
    }

    /// Create a store from the `storage` section of the configuration
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let db_path = match &config.path {
            Some(path) => path.clone(),
            None => match std::env::var(HISTORY_DB_ENV) {
                Ok(path) => PathBuf::from(path),
                Err(_) => Self::default_db_path()?,
            },
        };
        Self::open(db_path, Duration::from_millis(config.busy_timeout_ms))
    }

    /// Location used when no path is configured
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "assis", "assis")
            .ok_or_else(|| AssisError::Storage("Could not determine data directory".into()))?;
        Ok(proj_dirs.data_dir().join("assis.db"))
    }

    /// Path of the backing database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(db_path: PathBuf, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AssisError::Storage(format!(
                        "Failed to create data directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let store = Self {
            db_path,
            busy_timeout,
        };
        store.init()?;
        tracing::debug!(path = %store.db_path.display(), "Conversation store ready");
        Ok(store)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(schema::SCHEMA)
            .map_err(|e| AssisError::storage("Failed to create tables", e))?;
        Ok(())
    }

    /// Open a connection scoped to a single operation
    pub(crate) fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| AssisError::storage("Failed to open database", e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| AssisError::storage("Failed to set busy timeout", e))?;
        conn.execute_batch(schema::CONNECTION_PRAGMAS)
            .map_err(|e| AssisError::storage("Failed to configure connection", e))?;
        Ok(conn)
    }

    /// Create a conversation and return its id
    ///
    /// `None` uses [`DEFAULT_CONVERSATION_TITLE`].
    pub fn create_conversation(&self, title: Option<&str>) -> Result<i64> {
        let title = title.unwrap_or(DEFAULT_CONVERSATION_TITLE);
        let conn = self.connect()?;
        let now = SqlTimestamp::now();

        conn.execute(
            "INSERT INTO conversations (title, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![title, now],
        )
        .map_err(|e| AssisError::storage("Failed to insert conversation", e))?;

        let id = conn.last_insert_rowid();
        tracing::debug!(conversation_id = id, "Created conversation");
        Ok(id)
    }

    /// Rename a conversation and bump its `updated_at`
    ///
    /// `updated_at` never moves backwards, even if the system clock does.
    ///
    /// # Errors
    ///
    /// Returns `AssisError::ConversationNotFound` if the id does not exist
    pub fn update_conversation_title(&self, id: i64, title: &str) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn
            .execute(
                "UPDATE conversations
                SET title = ?1, updated_at = MAX(?2, updated_at, created_at)
                WHERE id = ?3",
                params![title, SqlTimestamp::now(), id],
            )
            .map_err(|e| AssisError::storage("Failed to update conversation title", e))?;

        if changed == 0 {
            return Err(AssisError::ConversationNotFound(id).into());
        }
        Ok(())
    }

    /// Record the model that last produced output. Leaves `updated_at` alone.
    ///
    /// # Errors
    ///
    /// Returns `AssisError::ConversationNotFound` if the id does not exist
    pub fn update_conversation_model(&self, id: i64, model: &str) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn
            .execute(
                "UPDATE conversations SET model_used = ?1 WHERE id = ?2",
                params![model, id],
            )
            .map_err(|e| AssisError::storage("Failed to update conversation model", e))?;

        if changed == 0 {
            return Err(AssisError::ConversationNotFound(id).into());
        }
        Ok(())
    }

    /// Delete a conversation together with its messages
    ///
    /// Deleting an id that does not exist is not an error.
    pub fn delete_conversation(&self, id: i64) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| AssisError::storage("Failed to start transaction", e))?;

        let messages = tx
            .execute(
                "DELETE FROM messages WHERE conversation_id = ?1",
                params![id],
            )
            .map_err(|e| AssisError::storage("Failed to delete messages", e))?;
        let removed = tx
            .execute("DELETE FROM conversations WHERE id = ?1", params![id])
            .map_err(|e| AssisError::storage("Failed to delete conversation", e))?;

        tx.commit()
            .map_err(|e| AssisError::storage("Failed to commit transaction", e))?;

        if removed > 0 {
            tracing::info!(conversation_id = id, messages, "Deleted conversation");
        }
        Ok(())
    }

    /// All conversations, most recently active first
    pub fn get_all_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.query_summaries(None)
    }

    /// The `limit` most recently active conversations
    pub fn get_recent_conversations(&self, limit: usize) -> Result<Vec<ConversationSummary>> {
        self.query_summaries(Some(limit))
    }

    fn query_summaries(&self, limit: Option<usize>) -> Result<Vec<ConversationSummary>> {
        let conn = self.connect()?;
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

        let sql = format!(
            "SELECT {},
                (SELECT COUNT(*) FROM messages WHERE messages.conversation_id = conversations.id)
                    AS message_count
            FROM conversations
            ORDER BY updated_at DESC, id DESC
            LIMIT ?1",
            schema::CONVERSATION_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AssisError::storage("Failed to prepare statement", e))?;

        let rows = stmt
            .query_map(params![limit], ConversationSummary::from_row)
            .map_err(|e| AssisError::storage("Failed to query conversations", e))?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row.map_err(|e| AssisError::storage("Failed to read conversation", e))?);
        }
        Ok(summaries)
    }

    /// Look up one conversation
    pub fn get_conversation(&self, id: i64) -> Result<Option<Conversation>> {
        let conn = self.connect()?;
        read_conversation(&conn, id)
    }

    /// Append a message and roll its token counts into the conversation
    ///
    /// The insert and the parent update share one transaction: either both
    /// land or neither does. Returns the new message id.
    ///
    /// The message timestamp is never earlier than the conversation's
    /// `created_at`/`updated_at` or any message already stored for it, so
    /// timestamp order stays insertion order when the clock steps back.
    ///
    /// # Errors
    ///
    /// Returns `AssisError::ConversationNotFound` if the conversation does
    /// not exist; nothing is written in that case.
    pub fn add_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<i64> {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| AssisError::storage("Failed to start transaction", e))?;

        let latest = tx
            .query_row(
                "SELECT created_at, updated_at,
                    (SELECT MAX(timestamp) FROM messages WHERE conversation_id = ?1)
                FROM conversations WHERE id = ?1",
                params![conversation_id],
                |row| {
                    let created: SqlTimestamp = row.get(0)?;
                    let updated: SqlTimestamp = row.get(1)?;
                    let last_message: Option<SqlTimestamp> = row.get(2)?;
                    Ok(created.max(updated).max(last_message.unwrap_or(created)))
                },
            )
            .optional()
            .map_err(|e| AssisError::storage("Failed to read conversation", e))?;

        let Some(latest) = latest else {
            return Err(AssisError::ConversationNotFound(conversation_id).into());
        };
        let now = SqlTimestamp::now().max(latest);

        let changed = tx
            .execute(
                "UPDATE conversations SET
                    updated_at = ?1,
                    total_input_tokens = total_input_tokens + ?2,
                    total_output_tokens = total_output_tokens + ?3
                WHERE id = ?4",
                params![
                    now,
                    SqlCount(input_tokens),
                    SqlCount(output_tokens),
                    conversation_id
                ],
            )
            .map_err(|e| AssisError::storage("Failed to update conversation totals", e))?;

        if changed == 0 {
            return Err(AssisError::ConversationNotFound(conversation_id).into());
        }

        tx.execute(
            "INSERT INTO messages
                (conversation_id, role, content, timestamp, input_tokens, output_tokens)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                conversation_id,
                role,
                content,
                now,
                SqlCount(input_tokens),
                SqlCount(output_tokens)
            ],
        )
        .map_err(|e| AssisError::storage("Failed to insert message", e))?;
        let message_id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| AssisError::storage("Failed to commit transaction", e))?;

        tracing::debug!(
            conversation_id,
            message_id,
            role = %role,
            input_tokens,
            output_tokens,
            "Appended message"
        );
        Ok(message_id)
    }

    /// Append a user turn with no token usage
    pub fn add_user_message(&self, conversation_id: i64, content: &str) -> Result<i64> {
        self.add_message(conversation_id, Role::User, content, 0, 0)
    }

    /// Append an assistant turn with the usage reported for it
    pub fn add_assistant_message(
        &self,
        conversation_id: i64,
        content: &str,
        input_tokens: u64,
        output_tokens: u64,
    ) -> Result<i64> {
        self.add_message(
            conversation_id,
            Role::Assistant,
            content,
            input_tokens,
            output_tokens,
        )
    }

    /// Messages of a conversation in the order they were added
    ///
    /// Returns an empty list for unknown ids.
    pub fn get_messages(&self, conversation_id: i64) -> Result<Vec<Message>> {
        let conn = self.connect()?;
        read_messages(&conn, conversation_id)
    }
}

pub(crate) fn read_conversation(conn: &Connection, id: i64) -> Result<Option<Conversation>> {
    let sql = format!(
        "SELECT {} FROM conversations WHERE id = ?1",
        schema::CONVERSATION_COLUMNS
    );
    let conversation = conn
        .query_row(&sql, params![id], Conversation::from_row)
        .optional()
        .map_err(|e| AssisError::storage("Failed to query conversation", e))?;
    Ok(conversation)
}

pub(crate) fn read_messages(conn: &Connection, conversation_id: i64) -> Result<Vec<Message>> {
    let sql = format!(
        "SELECT {} FROM messages WHERE conversation_id = ?1 ORDER BY timestamp ASC, id ASC",
        schema::MESSAGE_COLUMNS
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| AssisError::storage("Failed to prepare statement", e))?;

    let rows = stmt
        .query_map(params![conversation_id], Message::from_row)
        .map_err(|e| AssisError::storage("Failed to query messages", e))?;

    let mut messages = Vec::new();
    for row in rows {
        messages.push(row.map_err(|e| AssisError::storage("Failed to read message", e))?);
    }
    Ok(messages)
}
