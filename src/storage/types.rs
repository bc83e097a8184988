use crate::error::AssisError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person chatting
    User,
    /// Text produced by the model
    Assistant,
}

impl Role {
    /// Column value used in the `messages.role` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Bold label used when rendering a transcript
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::User => "**You:**",
            Role::Assistant => "**Assistant:**",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AssisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(AssisError::InvalidRole(other.to_string())),
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: AssisError| FromSqlError::Other(Box::new(e)))
    }
}

/// Timestamp as it is written to the database.
///
/// Always UTC with six fractional digits, so the text sorts the same way
/// the instants do. Rows written by older tools without an offset
/// (`2024-05-01T10:00:00.123456`) are read as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SqlTimestamp(pub DateTime<Utc>);

impl SqlTimestamp {
    pub(crate) fn now() -> Self {
        SqlTimestamp(Utc::now())
    }
}

/// Render a timestamp the way it is stored
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| rfc_err),
    }
}

impl ToSql for SqlTimestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(format_timestamp(&self.0)))
    }
}

impl FromSql for SqlTimestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        parse_timestamp(value.as_str()?)
            .map(SqlTimestamp)
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Non-negative counter stored in an INTEGER column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SqlCount(pub u64);

impl ToSql for SqlCount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        i64::try_from(self.0)
            .map(ToSqlOutput::from)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }
}

impl FromSql for SqlCount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let n = value.as_i64()?;
        u64::try_from(n)
            .map(SqlCount)
            .map_err(|_| FromSqlError::OutOfRange(n))
    }
}

/// A stored conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Surrogate key assigned on creation
    pub id: i64,
    /// User-editable title
    pub title: String,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// Last title change or message append
    pub updated_at: DateTime<Utc>,
    /// Sum of `input_tokens` over the conversation's messages
    pub total_input_tokens: u64,
    /// Sum of `output_tokens` over the conversation's messages
    pub total_output_tokens: u64,
    /// Last model that produced output in this conversation
    pub model_used: Option<String>,
}

impl Conversation {
    /// Input plus output tokens
    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            created_at: row.get::<_, SqlTimestamp>("created_at")?.0,
            updated_at: row.get::<_, SqlTimestamp>("updated_at")?.0,
            total_input_tokens: row.get::<_, SqlCount>("total_input_tokens")?.0,
            total_output_tokens: row.get::<_, SqlCount>("total_output_tokens")?.0,
            model_used: row.get("model_used")?,
        })
    }
}

/// Conversation as it appears in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The conversation record
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Number of messages currently stored for the conversation
    pub message_count: usize,
}

impl ConversationSummary {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            conversation: Conversation::from_row(row)?,
            message_count: row.get::<_, SqlCount>("message_count")?.0 as usize,
        })
    }
}

/// One turn in a conversation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Surrogate key assigned on insert
    pub id: i64,
    /// Owning conversation
    pub conversation_id: i64,
    /// Author of the turn
    pub role: Role,
    /// Message body
    pub content: String,
    /// Insert time
    pub timestamp: DateTime<Utc>,
    /// Prompt tokens billed for this turn
    pub input_tokens: u64,
    /// Completion tokens billed for this turn
    pub output_tokens: u64,
}

impl Message {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            conversation_id: row.get("conversation_id")?,
            role: row.get("role")?,
            content: row.get("content")?,
            timestamp: row.get::<_, SqlTimestamp>("timestamp")?.0,
            input_tokens: row.get::<_, SqlCount>("input_tokens")?.0,
            output_tokens: row.get::<_, SqlCount>("output_tokens")?.0,
        })
    }
}

/// JSON-encoded setting value as it sits in the `settings` table.
///
/// Decoding is a separate step so a corrupted row surfaces as an error
/// rather than looking like a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    raw: String,
}

impl StoredValue {
    /// Encode a value as JSON text
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(|raw| Self { raw })
    }

    /// Wrap text read from the database without validating it
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The stored JSON text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decode the stored text into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.raw)
    }
}

/// Portable dump of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationExport {
    /// The conversation record
    pub conversation: Conversation,
    /// Messages in chronological order
    pub messages: Vec<Message>,
}
