//! Database layout for the conversation store

/// Tables and indexes. Every statement is idempotent so this runs on
/// every start.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    total_input_tokens INTEGER NOT NULL DEFAULT 0,
    total_output_tokens INTEGER NOT NULL DEFAULT 0,
    model_used TEXT
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    input_tokens INTEGER NOT NULL DEFAULT 0,
    output_tokens INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (conversation_id) REFERENCES conversations (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages (conversation_id);

CREATE INDEX IF NOT EXISTS idx_conversations_updated
    ON conversations (updated_at DESC);
"#;

/// Applied to every connection the store opens
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Columns selected for a `Conversation` row
pub(crate) const CONVERSATION_COLUMNS: &str = "id, title, created_at, updated_at, \
     total_input_tokens, total_output_tokens, model_used";

/// Columns selected for a `Message` row
pub(crate) const MESSAGE_COLUMNS: &str =
    "id, conversation_id, role, content, timestamp, input_tokens, output_tokens";

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(SCHEMA).expect("first apply");
        conn.execute_batch(SCHEMA).expect("second apply");

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
                [],
                |r| r.get(0),
            )
            .expect("count indexes");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_foreign_key_pragma_rejects_orphans() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(CONNECTION_PRAGMAS).expect("pragmas");
        conn.execute_batch(SCHEMA).expect("schema");

        let res = conn.execute(
            "INSERT INTO messages (conversation_id, role, content, timestamp) VALUES (99, 'user', 'x', 't')",
            [],
        );
        assert!(res.is_err());
    }
}
