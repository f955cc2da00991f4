// src/models/submission.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::AppError;

/// A completed quiz attempt as posted by the test page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Kept exactly as submitted. A JSON `null` is treated the same as a missing name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub student_name: String,

    #[serde(default)]
    pub questions: Vec<Question>,

    /// Alternative to per-question `selected`: an array indexed by question
    /// position, or an object keyed by the decimal index.
    #[serde(default)]
    pub answers: Option<RawAnswers>,

    /// Seconds.
    #[serde(default)]
    pub time_spent: u64,

    /// Seconds.
    #[serde(default)]
    pub time_left: u64,

    /// How many times the student navigated away from the test page.
    #[serde(default)]
    pub leave_count: u64,

    /// RFC 3339 text or Unix epoch milliseconds. Unparseable values are dropped.
    #[serde(default, deserialize_with = "deserialize_end_time")]
    pub end_time: Option<DateTime<Utc>>,
}

/// The part of a submission that is checked before the rest of its shape.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct StudentHeader {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = validate_student_name))]
    student_name: String,
}

/// A single-choice question.
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub question: String,

    #[serde(default)]
    pub options: Vec<String>,

    /// Index into `options`.
    pub correct: i64,

    /// Index into `options`; absent or `null` when unanswered.
    #[serde(default)]
    pub selected: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAnswers {
    List(Vec<Option<i64>>),
    Keyed(HashMap<String, Option<i64>>),
}

/// Canonical answer lookup: question position -> selected option index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet(BTreeMap<usize, i64>);

impl AnswerSheet {
    /// Merges both answer encodings. A per-question `selected` wins over `answers`.
    pub fn from_submission(submission: &Submission) -> Self {
        let mut sheet = BTreeMap::new();

        match &submission.answers {
            Some(RawAnswers::List(list)) => {
                for (index, selected) in list.iter().enumerate() {
                    if let Some(selected) = selected {
                        sheet.insert(index, *selected);
                    }
                }
            }
            Some(RawAnswers::Keyed(map)) => {
                for (key, selected) in map {
                    let (Ok(index), Some(selected)) = (key.trim().parse::<usize>(), selected) else {
                        continue;
                    };
                    sheet.insert(index, *selected);
                }
            }
            None => {}
        }

        for (index, question) in submission.questions.iter().enumerate() {
            if let Some(selected) = question.selected {
                sheet.insert(index, selected);
            }
        }

        Self(sheet)
    }

    pub fn selected(&self, index: usize) -> Option<i64> {
        self.0.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Submission {
    /// Parses and validates a raw request body.
    ///
    /// * Not JSON at all -> `Invalid JSON data`.
    /// * Missing or blank `studentName` -> `Student name is required`, whatever
    ///   else is wrong with the body.
    /// * JSON of the wrong shape -> `Invalid submission: ...`.
    pub fn from_json(body: &[u8]) -> Result<Self, AppError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("Invalid JSON data".to_string()))?;

        // A header that does not even deserialize (non-object body, non-string
        // name) is left for the full parse to report.
        if let Ok(header) = StudentHeader::deserialize(&value) {
            header.validate()?;
        }

        let submission: Submission = serde_json::from_value(value)?;

        Ok(submission)
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn answer_sheet(&self) -> AnswerSheet {
        AnswerSheet::from_submission(self)
    }
}

fn validate_student_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        let mut err = validator::ValidationError::new("student_name_required");
        err.message = Some("Student name is required".into());
        return Err(err);
    }
    Ok(())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn deserialize_end_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;

    Ok(raw.and_then(|raw| match raw {
        RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        RawTimestamp::FractionalMillis(ms) => Utc.timestamp_millis_opt(ms as i64).single(),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        RawTimestamp::Other(_) => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Submission, AppError> {
        Submission::from_json(value.to_string().as_bytes())
    }

    fn bad_request_message(result: Result<Submission, AppError>) -> String {
        match result {
            Err(AppError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_json() {
        let result = Submission::from_json(b"{not json");
        assert_eq!(bad_request_message(result), "Invalid JSON data");
    }

    #[test]
    fn test_requires_student_name() {
        let missing = parse(json!({ "questions": [] }));
        assert_eq!(bad_request_message(missing), "Student name is required");

        let blank = parse(json!({ "studentName": "   " }));
        assert_eq!(bad_request_message(blank), "Student name is required");

        let null = parse(json!({ "studentName": null }));
        assert_eq!(bad_request_message(null), "Student name is required");
    }

    #[test]
    fn test_student_name_is_checked_before_shape() {
        let result = parse(json!({ "questions": "x" }));
        assert_eq!(bad_request_message(result), "Student name is required");
    }

    #[test]
    fn test_student_name_is_kept_verbatim() {
        let sub = parse(json!({ "studentName": "  Ana Maria " })).unwrap();
        assert_eq!(sub.student_name, "  Ana Maria ");
    }

    #[test]
    fn test_wrong_shape_is_invalid_submission() {
        let result = parse(json!({ "studentName": "Ana", "questions": "nope" }));
        assert!(bad_request_message(result).starts_with("Invalid submission"));
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let sub = parse(json!({ "studentName": "Ana" })).unwrap();
        assert_eq!(sub.total_questions(), 0);
        assert_eq!(sub.time_spent, 0);
        assert_eq!(sub.time_left, 0);
        assert_eq!(sub.leave_count, 0);
        assert!(sub.end_time.is_none());
        assert!(sub.answer_sheet().is_empty());
    }

    #[test]
    fn test_answers_list_and_map_agree() {
        let questions = json!([
            { "question": "a", "options": ["x", "y"], "correct": 0 },
            { "question": "b", "options": ["x", "y"], "correct": 1 },
            { "question": "c", "options": ["x", "y"], "correct": 1 }
        ]);

        let from_list = parse(json!({
            "studentName": "Ana",
            "questions": questions,
            "answers": [1, null, 0]
        }))
        .unwrap();

        let from_map = parse(json!({
            "studentName": "Ana",
            "questions": questions,
            "answers": { "0": 1, "2": 0, "junk": 3 }
        }))
        .unwrap();

        let sheet = from_list.answer_sheet();
        assert_eq!(sheet, from_map.answer_sheet());
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.selected(0), Some(1));
        assert_eq!(sheet.selected(1), None);
        assert_eq!(sheet.selected(2), Some(0));
    }

    #[test]
    fn test_per_question_selected_overrides_answers() {
        let sub = parse(json!({
            "studentName": "Ana",
            "questions": [
                { "question": "a", "options": ["x", "y"], "correct": 0, "selected": 0 }
            ],
            "answers": [1]
        }))
        .unwrap();

        assert_eq!(sub.answer_sheet().selected(0), Some(0));
    }

    #[test]
    fn test_end_time_formats() {
        let millis = parse(json!({ "studentName": "Ana", "endTime": 1_700_000_000_000i64 })).unwrap();
        assert_eq!(millis.end_time.unwrap().timestamp(), 1_700_000_000);

        let text = parse(json!({ "studentName": "Ana", "endTime": "2024-03-01T10:00:00+02:00" })).unwrap();
        assert_eq!(text.end_time.unwrap().to_rfc3339(), "2024-03-01T08:00:00+00:00");

        let junk = parse(json!({ "studentName": "Ana", "endTime": "yesterday" })).unwrap();
        assert!(junk.end_time.is_none());

        for odd in [json!(true), json!({}), json!([1, 2])] {
            let sub = parse(json!({ "studentName": "Ana", "endTime": odd })).unwrap();
            assert!(sub.end_time.is_none());
        }
    }
}
