pub mod answer;
pub mod course;
pub mod user;

pub use answer::{AnswerKind, AnswerQuery, AnswerTableEntry, NewAnswer};
pub use course::{Course, NewCourse};
pub use user::{NewUser, User};

use chrono::{DateTime, SecondsFormat, Utc};

/// Canonical text form for stored timestamps.
///
/// Fixed precision and a `Z` suffix keep lexical and chronological order in
/// step, which the `ORDER BY timestamp` queries rely on.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp; unreadable text is a decode error on `column`.
pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    raw.parse().map_err(|e| decode_error(column, e))
}

pub(crate) fn decode_error<E>(column: &str, source: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::ColumnDecode {
        index: column.to_owned(),
        source: Box::new(source),
    }
}
