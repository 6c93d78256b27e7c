use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::AnswerKind;
use crate::error::ServerError;

/// Body of `POST /assessment/results`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssessmentRequest {
    /// Course name.
    #[validate(length(min = 1, message = "course must not be empty"))]
    pub course: String,
    /// Component id on the page.
    #[validate(length(min = 1, message = "div_id must not be empty"))]
    pub div_id: String,
    /// Component event name, e.g. `mChoice` or `fillb`.
    #[validate(length(min = 1, message = "event must not be empty"))]
    pub event: String,
    /// Student to query. Only honoured for instructors.
    #[serde(default)]
    pub sid: Option<String>,
    /// Ignore answers recorded after this instant.
    #[serde(default, deserialize_with = "deserialize_deadline")]
    pub deadline: Option<DateTime<Utc>>,
}

impl AssessmentRequest {
    pub fn answer_kind(&self) -> Result<AnswerKind, ServerError> {
        AnswerKind::from_str(&self.event)
            .map_err(|_| ServerError::BadRequest(format!("unknown event '{}'", self.event)))
    }
}

/// Accept RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
/// An empty string means no deadline.
fn deserialize_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_deadline(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid deadline '{raw}'")))
}

fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn sid_and_deadline_are_optional() {
        let req: AssessmentRequest = serde_json::from_value(json!({
            "course": "cs101", "div_id": "q1", "event": "mChoice"
        }))
        .unwrap();
        assert!(req.sid.is_none());
        assert!(req.deadline.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn deadline_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 1, 23, 59, 0).unwrap();
        for raw in ["2026-10-01T23:59:00Z", "2026-10-01T23:59:00", "2026-10-01 23:59:00"] {
            let req: AssessmentRequest = serde_json::from_value(json!({
                "course": "cs101", "div_id": "q1", "event": "fillb", "deadline": raw
            }))
            .unwrap();
            assert_eq!(req.deadline, Some(expected), "{raw}");
        }
    }

    #[test]
    fn empty_deadline_is_none() {
        let req: AssessmentRequest = serde_json::from_value(json!({
            "course": "cs101", "div_id": "q1", "event": "fillb", "deadline": ""
        }))
        .unwrap();
        assert!(req.deadline.is_none());
    }

    #[test]
    fn bad_deadline_fails_to_parse() {
        let res: Result<AssessmentRequest, _> = serde_json::from_value(json!({
            "course": "cs101", "div_id": "q1", "event": "fillb", "deadline": "next tuesday"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn empty_div_id_fails_validation() {
        let req = AssessmentRequest {
            course: "cs101".into(),
            event: "mChoice".into(),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn unknown_event_is_bad_request() {
        let req = AssessmentRequest {
            course: "cs101".into(),
            div_id: "q1".into(),
            event: "poll".into(),
            ..Default::default()
        };
        assert!(matches!(req.answer_kind(), Err(ServerError::BadRequest(_))));
    }
}
