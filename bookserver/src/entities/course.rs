use crate::entities::SqliteStore;
use crate::entities::dao::{Course, NewCourse, decode_error};
use chrono::NaiveDate;
use std::future::Future;

pub trait CourseStore: Send + Sync + 'static {
    fn create_course(
        &self,
        course: NewCourse,
    ) -> impl Future<Output = Result<Course, sqlx::Error>> + Send;
    fn get_course_by_name(
        &self,
        course_name: &str,
    ) -> impl Future<Output = Result<Option<Course>, sqlx::Error>> + Send;
    /// Record `user_id` as an instructor of `course_id`. Idempotent.
    fn add_instructor(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Whether `username` instructs the course named `course_name`.
    fn is_course_instructor(
        &self,
        username: &str,
        course_name: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl CourseStore for SqliteStore {
    async fn create_course(&self, course: NewCourse) -> Result<Course, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO courses (course_name, base_course, term_start_date) VALUES (?1, ?2, ?3)",
        )
        .bind(&course.course_name)
        .bind(&course.base_course)
        .bind(course.term_start_date.format(DATE_FORMAT).to_string())
        .execute(&self.pool)
        .await?;
        Ok(Course {
            id: result.last_insert_rowid(),
            course_name: course.course_name,
            base_course: course.base_course,
            term_start_date: course.term_start_date,
        })
    }

    async fn get_course_by_name(&self, course_name: &str) -> Result<Option<Course>, sqlx::Error> {
        let row: Option<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, course_name, base_course, term_start_date FROM courses WHERE course_name = ?1",
        )
        .bind(course_name)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|(id, course_name, base_course, term_start_date)| {
            Ok(Course {
                id,
                course_name,
                base_course,
                term_start_date: NaiveDate::parse_from_str(&term_start_date, DATE_FORMAT)
                    .map_err(|e| decode_error("term_start_date", e))?,
            })
        })
        .transpose()
    }

    async fn add_instructor(&self, course_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO course_instructor (course, instructor) VALUES (?1, ?2) \
             ON CONFLICT(course, instructor) DO NOTHING",
        )
        .bind(course_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_course_instructor(
        &self,
        username: &str,
        course_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM course_instructor ci \
             JOIN courses c ON c.id = ci.course \
             JOIN auth_user u ON u.id = ci.instructor \
             WHERE u.username = ?1 AND c.course_name = ?2",
        )
        .bind(username)
        .bind(course_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0 > 0)
    }
}
