//! Assessment result retrieval.
//!
//! Works over two narrow capabilities, [`InstructorDirectory`] and
//! [`ResultSource`], so the authorization rules can be exercised without a
//! database or an HTTP layer.

use std::future::Future;

use tracing::debug;

use crate::entities::{AnswerQuery, AnswerStore, AnswerTableEntry, CourseStore, SqliteStore};
use crate::error::ServerError;
use crate::middleware::Identity;
use crate::schemas::assessment::AssessmentRequest;

/// Answers "does this user instruct this course?".
pub trait InstructorDirectory: Send + Sync {
    fn is_instructor(
        &self,
        username: &str,
        course: &str,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

/// Supplies the result returned for a resolved query.
///
/// Server-side feedback belongs here: an implementation may enrich the
/// stored entry before it is returned, without affecting who may see it.
pub trait ResultSource: Send + Sync {
    fn last_result(
        &self,
        query: &AnswerQuery,
    ) -> impl Future<Output = Result<Option<AnswerTableEntry>, sqlx::Error>> + Send;
}

impl InstructorDirectory for SqliteStore {
    async fn is_instructor(&self, username: &str, course: &str) -> Result<bool, sqlx::Error> {
        self.is_course_instructor(username, course).await
    }
}

// TODO: port fill-in-the-blank server feedback (recompute `correct` and merge
// the feedback for courses that grade on the server).
impl ResultSource for SqliteStore {
    async fn last_result(
        &self,
        query: &AnswerQuery,
    ) -> Result<Option<AnswerTableEntry>, sqlx::Error> {
        self.fetch_last_answer_table_entry(query).await
    }
}

/// Pick the subject whose answer is returned.
///
/// Instructors may name any student and default to themselves; everyone
/// else always gets their own answer, whatever `requested_sid` says.
pub fn resolve_subject(
    is_instructor: bool,
    requested_sid: Option<&str>,
    caller_username: &str,
) -> String {
    match requested_sid {
        Some(sid) if is_instructor && !sid.is_empty() => sid.to_owned(),
        _ => caller_username.to_owned(),
    }
}

/// Most recent answer for the subject `caller` is allowed to see, or `None`
/// when the server holds nothing (the client then uses its local copy).
pub async fn assessment_results<D, R>(
    directory: &D,
    results: &R,
    caller: &Identity,
    request: AssessmentRequest,
) -> Result<Option<AnswerTableEntry>, ServerError>
where
    D: InstructorDirectory,
    R: ResultSource,
{
    let kind = request.answer_kind()?;
    let is_instructor = directory
        .is_instructor(&caller.username, &request.course)
        .await?;
    let sid = resolve_subject(is_instructor, request.sid.as_deref(), &caller.username);

    let query = AnswerQuery {
        kind,
        sid,
        div_id: request.div_id,
        course_name: request.course,
        deadline: request.deadline,
    };
    let row = results.last_result(&query).await?;

    match &row {
        Some(entry) => debug!(?entry, "returning assessment result"),
        None => debug!(
            sid = %query.sid,
            div_id = %query.div_id,
            course = %query.course_name,
            "no stored answer"
        ),
    }
    Ok(row)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::AnswerKind;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    struct FakeDirectory {
        instructors: Vec<(&'static str, &'static str)>,
        asked: Mutex<Vec<(String, String)>>,
    }

    impl FakeDirectory {
        fn new(instructors: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                instructors,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    impl InstructorDirectory for FakeDirectory {
        async fn is_instructor(&self, username: &str, course: &str) -> Result<bool, sqlx::Error> {
            self.asked
                .lock()
                .unwrap()
                .push((username.to_owned(), course.to_owned()));
            Ok(self
                .instructors
                .iter()
                .any(|(u, c)| *u == username && *c == course))
        }
    }

    #[derive(Default)]
    struct FakeResults {
        entry: Option<AnswerTableEntry>,
        fail: bool,
        seen: Mutex<Vec<AnswerQuery>>,
    }

    impl ResultSource for FakeResults {
        async fn last_result(
            &self,
            query: &AnswerQuery,
        ) -> Result<Option<AnswerTableEntry>, sqlx::Error> {
            self.seen.lock().unwrap().push(query.clone());
            if self.fail {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(self.entry.clone())
        }
    }

    fn caller(username: &str) -> Identity {
        Identity {
            user_id: 1,
            username: username.into(),
            course_name: "cs101".into(),
        }
    }

    fn request(sid: Option<&str>) -> AssessmentRequest {
        AssessmentRequest {
            course: "cs101".into(),
            div_id: "q1".into(),
            event: "mChoice".into(),
            sid: sid.map(str::to_owned),
            deadline: None,
        }
    }

    fn entry() -> AnswerTableEntry {
        AnswerTableEntry {
            kind: AnswerKind::MultipleChoice,
            id: 42,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap(),
            div_id: "q1".into(),
            sid: "stu1".into(),
            course_name: "cs101".into(),
            answer: Some("2".into()),
            correct: Some(true),
            percent: Some(1.0),
            source: None,
            min_height: None,
            passed: None,
            failed: None,
        }
    }

    #[test]
    fn non_instructor_always_gets_self() {
        assert_eq!(resolve_subject(false, Some("stu1"), "stu2"), "stu2");
        assert_eq!(resolve_subject(false, Some("stu2"), "stu2"), "stu2");
        assert_eq!(resolve_subject(false, Some(""), "stu2"), "stu2");
        assert_eq!(resolve_subject(false, None, "stu2"), "stu2");
    }

    #[test]
    fn instructor_defaults_to_self() {
        assert_eq!(resolve_subject(true, None, "prof1"), "prof1");
        assert_eq!(resolve_subject(true, Some(""), "prof1"), "prof1");
    }

    #[test]
    fn instructor_may_name_any_student() {
        assert_eq!(resolve_subject(true, Some("stu1"), "prof1"), "stu1");
        assert_eq!(resolve_subject(true, Some("prof1"), "prof1"), "prof1");
    }

    #[tokio::test]
    async fn instructor_without_sid_queries_self() {
        let directory = FakeDirectory::new(vec![("prof1", "cs101")]);
        let results = FakeResults::default();
        let got = assessment_results(&directory, &results, &caller("prof1"), request(Some("")))
            .await
            .unwrap();
        assert!(got.is_none());

        let seen = results.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            AnswerQuery {
                kind: AnswerKind::MultipleChoice,
                sid: "prof1".into(),
                div_id: "q1".into(),
                course_name: "cs101".into(),
                deadline: None,
            }
        );
    }

    #[tokio::test]
    async fn student_cannot_query_someone_else() {
        let directory = FakeDirectory::new(vec![("prof1", "cs101")]);
        let results = FakeResults::default();
        assessment_results(&directory, &results, &caller("stu2"), request(Some("stu1")))
            .await
            .unwrap();
        assert_eq!(results.seen.lock().unwrap()[0].sid, "stu2");
    }

    #[tokio::test]
    async fn instructor_check_uses_requested_course() {
        // prof1 teaches cs102 only, so a cs101 request is treated as a student's
        let directory = FakeDirectory::new(vec![("prof1", "cs102")]);
        let results = FakeResults::default();
        assessment_results(&directory, &results, &caller("prof1"), request(Some("stu1")))
            .await
            .unwrap();
        assert_eq!(
            directory.asked.lock().unwrap()[0],
            ("prof1".to_owned(), "cs101".to_owned())
        );
        assert_eq!(results.seen.lock().unwrap()[0].sid, "prof1");
    }

    #[tokio::test]
    #[traced_test]
    async fn stored_entry_is_returned_unchanged() {
        let directory = FakeDirectory::new(vec![("prof1", "cs101")]);
        let results = FakeResults {
            entry: Some(entry()),
            ..Default::default()
        };
        let got = assessment_results(&directory, &results, &caller("prof1"), request(Some("stu1")))
            .await
            .unwrap();
        assert_eq!(got, Some(entry()));
        assert!(logs_contain("returning assessment result"));
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let directory = FakeDirectory::new(vec![]);
        let results = FakeResults {
            fail: true,
            ..Default::default()
        };
        let err = assessment_results(&directory, &results, &caller("stu1"), request(None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn unknown_event_never_reaches_store() {
        let directory = FakeDirectory::new(vec![]);
        let results = FakeResults::default();
        let mut req = request(None);
        req.event = "poll".into();
        let err = assessment_results(&directory, &results, &caller("stu1"), req)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
        assert!(results.seen.lock().unwrap().is_empty());
        assert!(directory.asked.lock().unwrap().is_empty());
    }
}
