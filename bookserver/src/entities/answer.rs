use crate::entities::SqliteStore;
use crate::entities::dao::answer::ExtraColumn;
use crate::entities::dao::{
    AnswerKind, AnswerQuery, AnswerTableEntry, NewAnswer, format_timestamp, parse_timestamp,
};
use std::future::Future;

pub trait AnswerStore: Send + Sync + 'static {
    /// Record an answer in the table for `kind`; returns the new row id.
    fn create_answer_table_entry(
        &self,
        kind: AnswerKind,
        entry: NewAnswer,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Most recent answer matching `query`, latest `timestamp` first and
    /// highest `id` breaking ties.
    fn fetch_last_answer_table_entry(
        &self,
        query: &AnswerQuery,
    ) -> impl Future<Output = Result<Option<AnswerTableEntry>, sqlx::Error>> + Send;
}

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: i64,
    timestamp: String,
    div_id: String,
    sid: String,
    course_name: String,
    answer: Option<String>,
    correct: Option<bool>,
    percent: Option<f64>,
    source: Option<String>,
    min_height: Option<i64>,
    passed: Option<i64>,
    failed: Option<i64>,
}

impl AnswerRow {
    fn into_entry(self, kind: AnswerKind) -> Result<AnswerTableEntry, sqlx::Error> {
        Ok(AnswerTableEntry {
            kind,
            id: self.id,
            timestamp: parse_timestamp("timestamp", &self.timestamp)?,
            div_id: self.div_id,
            sid: self.sid,
            course_name: self.course_name,
            answer: self.answer,
            correct: self.correct,
            percent: self.percent,
            source: self.source,
            min_height: self.min_height,
            passed: self.passed,
            failed: self.failed,
        })
    }
}

/// `SELECT` list with every optional column, `NULL` where `kind` lacks it,
/// so all tables decode into the same row shape.
fn select_columns(kind: AnswerKind) -> String {
    let mut cols = vec![
        "id".to_owned(),
        "timestamp".to_owned(),
        "div_id".to_owned(),
        "sid".to_owned(),
        "course_name".to_owned(),
        "answer".to_owned(),
    ];
    for column in ExtraColumn::ALL {
        if kind.has_column(column) {
            cols.push(column.name().to_owned());
        } else {
            cols.push(format!("NULL AS {}", column.name()));
        }
    }
    cols.join(", ")
}

fn last_entry_sql(kind: AnswerKind, with_deadline: bool) -> String {
    let deadline = if with_deadline { " AND timestamp <= ?4" } else { "" };
    format!(
        "SELECT {} FROM {} \
         WHERE sid = ?1 AND div_id = ?2 AND course_name = ?3{} \
         ORDER BY timestamp DESC, id DESC LIMIT 1",
        select_columns(kind),
        kind.table(),
        deadline,
    )
}

fn insert_sql(kind: AnswerKind) -> String {
    let mut cols = vec!["timestamp", "div_id", "sid", "course_name", "answer"];
    cols.extend(kind.extra_columns().iter().map(|c| c.name()));
    let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        kind.table(),
        cols.join(", "),
        placeholders.join(", "),
    )
}

impl AnswerStore for SqliteStore {
    async fn create_answer_table_entry(
        &self,
        kind: AnswerKind,
        entry: NewAnswer,
    ) -> Result<i64, sqlx::Error> {
        let sql = insert_sql(kind);
        let mut query = sqlx::query(&sql)
            .bind(format_timestamp(entry.timestamp))
            .bind(&entry.div_id)
            .bind(&entry.sid)
            .bind(&entry.course_name)
            .bind(&entry.answer);
        for column in kind.extra_columns() {
            query = match column {
                ExtraColumn::Correct => query.bind(entry.correct),
                ExtraColumn::Percent => query.bind(entry.percent),
                ExtraColumn::Source => query.bind(&entry.source),
                ExtraColumn::MinHeight => query.bind(entry.min_height),
                ExtraColumn::Passed => query.bind(entry.passed),
                ExtraColumn::Failed => query.bind(entry.failed),
            };
        }
        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn fetch_last_answer_table_entry(
        &self,
        query: &AnswerQuery,
    ) -> Result<Option<AnswerTableEntry>, sqlx::Error> {
        let sql = last_entry_sql(query.kind, query.deadline.is_some());
        let mut q = sqlx::query_as::<_, AnswerRow>(&sql)
            .bind(&query.sid)
            .bind(&query.div_id)
            .bind(&query.course_name);
        if let Some(deadline) = query.deadline {
            q = q.bind(format_timestamp(deadline));
        }
        let row = q.fetch_optional(&self.pool).await?;
        row.map(|row| row.into_entry(query.kind)).transpose()
    }
}
