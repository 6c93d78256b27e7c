use chrono::NaiveDate;

/// A row in the `courses` table.
#[derive(Debug, Clone)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    /// The book the course is built from.
    pub base_course: String,
    pub term_start_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_name: String,
    pub base_course: String,
    pub term_start_date: NaiveDate,
}
