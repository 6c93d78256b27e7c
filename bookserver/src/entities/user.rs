use crate::entities::SqliteStore;
use crate::entities::dao::{NewUser, User, format_timestamp, parse_timestamp};
use chrono::Utc;
use std::future::Future;

pub trait UserStore: Send + Sync + 'static {
    /// Insert a user and return the stored row.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User, sqlx::Error>> + Send;
    fn get_user_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

type UserRow = (i64, String, String, String, String, String, String);

fn user_from_row(
    (id, username, first_name, last_name, email, course_name, created_at): UserRow,
) -> Result<User, sqlx::Error> {
    Ok(User {
        id,
        username,
        first_name,
        last_name,
        email,
        course_name,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

impl UserStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO auth_user (username, first_name, last_name, email, course_name, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.course_name)
        .bind(format_timestamp(now))
        .execute(&self.pool)
        .await?;
        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            course_name: user.course_name,
            created_at: now,
        })
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, username, first_name, last_name, email, course_name, created_at \
             FROM auth_user WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(user_from_row).transpose()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_user() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let created = store
            .create_user(NewUser {
                username: "stu1".into(),
                first_name: "Ada".into(),
                course_name: "cs101".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = store.get_user_by_username("stu1").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.first_name, "Ada");
        assert_eq!(found.course_name, "cs101");
        assert!(store.get_user_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        let user = NewUser {
            username: "stu1".into(),
            ..Default::default()
        };
        store.create_user(user.clone()).await.unwrap();
        assert!(store.create_user(user).await.is_err());
    }
}
