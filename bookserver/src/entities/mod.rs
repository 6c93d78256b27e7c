//! Database layer.
//!
//! Each concern is a trait ([`UserStore`], [`CourseStore`], [`AnswerStore`])
//! implemented for [`SqliteStore`]. All trait methods use `impl Future` in
//! their signatures so no `async-trait` crate is required.

pub mod answer;
pub mod course;
pub mod dao;
pub mod user;

pub use dao::{
    AnswerKind, AnswerQuery, AnswerTableEntry, Course, NewAnswer, NewCourse, NewUser, User,
};

pub use answer::AnswerStore;
pub use course::CourseStore;
pub use user::UserStore;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use strum::IntoEnumIterator;

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g.
    /// `"sqlite://bookserver.db?mode=rwc"` or `"sqlite::memory:"` for tests.
    /// In-memory databases live on a single pinned connection; a second
    /// connection would see an empty database.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Delete every row from every table and reset id sequences.
    pub async fn truncate_all(&self) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM course_instructor")
            .execute(&mut *tx)
            .await?;
        for kind in AnswerKind::iter() {
            sqlx::query(&format!("DELETE FROM {}", kind.table()))
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM courses").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM auth_user").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!("all tables truncated");
        Ok(())
    }

    /// Round-trip a trivial query to confirm the database answers.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool; later queries fail with [`sqlx::Error::PoolClosed`].
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
