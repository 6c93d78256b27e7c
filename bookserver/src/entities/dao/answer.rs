use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The kind of interactive component an answer belongs to.
///
/// Parsed from the `event` name the browser components report; each kind
/// is stored in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum AnswerKind {
    #[strum(serialize = "mChoice")]
    MultipleChoice,
    #[strum(serialize = "fillb")]
    FillInTheBlank,
    #[strum(serialize = "dragNdrop")]
    DragAndDrop,
    #[strum(serialize = "clickableArea")]
    ClickableArea,
    #[strum(serialize = "parsons")]
    Parsons,
    #[strum(serialize = "codelens1")]
    Codelens,
    #[strum(serialize = "shortanswer")]
    ShortAnswer,
    #[strum(serialize = "unittest")]
    UnitTest,
    #[strum(serialize = "lp_build")]
    LiterateProgram,
}

/// Columns beyond the common `(id, timestamp, div_id, sid, course_name, answer)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraColumn {
    Correct,
    Percent,
    Source,
    MinHeight,
    Passed,
    Failed,
}

impl ExtraColumn {
    pub const ALL: [ExtraColumn; 6] = [
        ExtraColumn::Correct,
        ExtraColumn::Percent,
        ExtraColumn::Source,
        ExtraColumn::MinHeight,
        ExtraColumn::Passed,
        ExtraColumn::Failed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExtraColumn::Correct => "correct",
            ExtraColumn::Percent => "percent",
            ExtraColumn::Source => "source",
            ExtraColumn::MinHeight => "min_height",
            ExtraColumn::Passed => "passed",
            ExtraColumn::Failed => "failed",
        }
    }
}

impl AnswerKind {
    /// Table holding answers of this kind.
    pub fn table(self) -> &'static str {
        match self {
            AnswerKind::MultipleChoice => "mchoice_answers",
            AnswerKind::FillInTheBlank => "fitb_answers",
            AnswerKind::DragAndDrop => "dragndrop_answers",
            AnswerKind::ClickableArea => "clickablearea_answers",
            AnswerKind::Parsons => "parsons_answers",
            AnswerKind::Codelens => "codelens_answers",
            AnswerKind::ShortAnswer => "shortanswer_answers",
            AnswerKind::UnitTest => "unittest_answers",
            AnswerKind::LiterateProgram => "lp_answers",
        }
    }

    pub fn extra_columns(self) -> &'static [ExtraColumn] {
        use ExtraColumn::*;
        match self {
            AnswerKind::MultipleChoice
            | AnswerKind::FillInTheBlank
            | AnswerKind::ClickableArea
            | AnswerKind::LiterateProgram => &[Correct, Percent],
            AnswerKind::DragAndDrop => &[Correct, Percent, MinHeight],
            AnswerKind::Parsons | AnswerKind::Codelens => &[Source, Correct, Percent],
            AnswerKind::ShortAnswer => &[],
            AnswerKind::UnitTest => &[Passed, Failed, Correct, Percent],
        }
    }

    pub fn has_column(self, column: ExtraColumn) -> bool {
        self.extra_columns().contains(&column)
    }
}

/// The most recent answer a subject recorded for a component.
///
/// Serialized as-is to the client: every column of the row's table is
/// present (`null` when empty); columns the table lacks are left out.
#[derive(Debug, Clone, PartialEq, ToSchema)]
pub struct AnswerTableEntry {
    #[schema(ignore)]
    pub kind: AnswerKind,
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub div_id: String,
    pub sid: String,
    pub course_name: String,
    pub answer: Option<String>,
    pub correct: Option<bool>,
    pub percent: Option<f64>,
    pub source: Option<String>,
    pub min_height: Option<i64>,
    pub passed: Option<i64>,
    pub failed: Option<i64>,
}

impl Serialize for AnswerTableEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extras = self.kind.extra_columns();
        let mut map = serializer.serialize_map(Some(6 + extras.len()))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.serialize_entry("div_id", &self.div_id)?;
        map.serialize_entry("sid", &self.sid)?;
        map.serialize_entry("course_name", &self.course_name)?;
        map.serialize_entry("answer", &self.answer)?;
        for column in extras {
            let key = column.name();
            match column {
                ExtraColumn::Correct => map.serialize_entry(key, &self.correct)?,
                ExtraColumn::Percent => map.serialize_entry(key, &self.percent)?,
                ExtraColumn::Source => map.serialize_entry(key, &self.source)?,
                ExtraColumn::MinHeight => map.serialize_entry(key, &self.min_height)?,
                ExtraColumn::Passed => map.serialize_entry(key, &self.passed)?,
                ExtraColumn::Failed => map.serialize_entry(key, &self.failed)?,
            }
        }
        map.end()
    }
}

/// An answer to record. Fields the target table lacks are ignored.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub timestamp: DateTime<Utc>,
    pub div_id: String,
    pub sid: String,
    pub course_name: String,
    pub answer: Option<String>,
    pub correct: Option<bool>,
    pub percent: Option<f64>,
    pub source: Option<String>,
    pub min_height: Option<i64>,
    pub passed: Option<i64>,
    pub failed: Option<i64>,
}

impl NewAnswer {
    pub fn new(
        sid: impl Into<String>,
        div_id: impl Into<String>,
        course_name: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            div_id: div_id.into(),
            sid: sid.into(),
            course_name: course_name.into(),
            answer: Some(answer.into()),
            correct: None,
            percent: None,
            source: None,
            min_height: None,
            passed: None,
            failed: None,
        }
    }
}

/// Fully resolved lookup key for the most recent answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerQuery {
    pub kind: AnswerKind,
    pub sid: String,
    pub div_id: String,
    pub course_name: String,
    /// Only answers recorded at or before this instant count.
    pub deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_names_parse() {
        assert_eq!(AnswerKind::from_str("mChoice").unwrap(), AnswerKind::MultipleChoice);
        assert_eq!(AnswerKind::from_str("fillb").unwrap(), AnswerKind::FillInTheBlank);
        assert_eq!(AnswerKind::from_str("lp_build").unwrap(), AnswerKind::LiterateProgram);
        assert!(AnswerKind::from_str("mchoice").is_err());
    }

    #[test]
    fn display_round_trips_event_name() {
        assert_eq!(AnswerKind::DragAndDrop.to_string(), "dragNdrop");
    }

    #[test]
    fn shortanswer_has_no_grading_columns() {
        assert!(!AnswerKind::ShortAnswer.has_column(ExtraColumn::Correct));
        assert!(AnswerKind::UnitTest.has_column(ExtraColumn::Passed));
    }

    fn ungraded(kind: AnswerKind) -> AnswerTableEntry {
        AnswerTableEntry {
            kind,
            id: 7,
            timestamp: Utc::now(),
            div_id: "q1".into(),
            sid: "stu1".into(),
            course_name: "cs101".into(),
            answer: Some("hello".into()),
            correct: None,
            percent: None,
            source: None,
            min_height: None,
            passed: None,
            failed: None,
        }
    }

    #[test]
    fn columns_outside_the_table_are_omitted() {
        let v = serde_json::to_value(ungraded(AnswerKind::ShortAnswer)).unwrap();
        assert_eq!(v["answer"], "hello");
        assert!(v.get("correct").is_none());
        assert!(v.get("source").is_none());
        assert_eq!(v.as_object().unwrap().len(), 6);
    }

    #[test]
    fn empty_table_columns_are_null() {
        let v = serde_json::to_value(ungraded(AnswerKind::MultipleChoice)).unwrap();
        assert_eq!(v.get("correct"), Some(&serde_json::Value::Null));
        assert_eq!(v.get("percent"), Some(&serde_json::Value::Null));
        assert!(v.get("min_height").is_none());
    }
}
