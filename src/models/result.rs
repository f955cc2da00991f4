// src/models/result.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Correct,
    Wrong,
    Unanswered,
}

impl AnswerStatus {
    pub fn label(self) -> &'static str {
        match self {
            AnswerStatus::Correct => "Correct",
            AnswerStatus::Wrong => "Wrong",
            AnswerStatus::Unanswered => "Unanswered",
        }
    }
}

/// Qualitative band for the final percentage. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTier {
    Excellent,
    VeryGood,
    Good,
    Satisfactory,
    NeedsImprovement,
}

impl PerformanceTier {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => PerformanceTier::Excellent,
            80..=89 => PerformanceTier::VeryGood,
            70..=79 => PerformanceTier::Good,
            60..=69 => PerformanceTier::Satisfactory,
            _ => PerformanceTier::NeedsImprovement,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::VeryGood => "Very Good",
            PerformanceTier::Good => "Good",
            PerformanceTier::Satisfactory => "Satisfactory",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Per-question line of the breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    /// Zero-based position in the submitted paper.
    pub index: usize,
    pub question_text: String,
    pub student_answer_text: String,
    pub correct_answer_text: String,
    pub status: AnswerStatus,
}

/// Everything the report and the acknowledgment need, derived once per submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub student_name: String,
    pub total_questions: usize,
    pub correct_count: usize,
    pub wrong_count: usize,
    pub unanswered_count: usize,
    pub percentage: u32,
    pub tier: PerformanceTier,
    pub per_question: Vec<QuestionResult>,
    /// Formatted as `"<m>m <s>s"`.
    pub time_spent: String,
    /// Formatted as `"<m>m <s>s"`.
    pub time_left: String,
    pub leave_count: u64,
    pub submitted_at: DateTime<Utc>,
}

impl ResultSummary {
    /// `"<correct>/<total>"`.
    pub fn score_fraction(&self) -> String {
        format!("{}/{}", self.correct_count, self.total_questions)
    }
}

/// DTO returned to the caller of `POST /api/submit`.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: SubmitData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitData {
    pub student_name: String,
    pub score: String,
    pub percentage: u32,
    pub telegram_sent: bool,
    /// Serialized as `null` when delivery did not fail.
    pub telegram_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(PerformanceTier::from_percentage(100), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(90), PerformanceTier::Excellent);
        assert_eq!(PerformanceTier::from_percentage(89), PerformanceTier::VeryGood);
        assert_eq!(PerformanceTier::from_percentage(80), PerformanceTier::VeryGood);
        assert_eq!(PerformanceTier::from_percentage(79), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentage(70), PerformanceTier::Good);
        assert_eq!(PerformanceTier::from_percentage(69), PerformanceTier::Satisfactory);
        assert_eq!(PerformanceTier::from_percentage(60), PerformanceTier::Satisfactory);
        assert_eq!(PerformanceTier::from_percentage(59), PerformanceTier::NeedsImprovement);
        assert_eq!(PerformanceTier::from_percentage(0), PerformanceTier::NeedsImprovement);
    }

    #[test]
    fn test_submit_data_serializes_camel_case_with_null_error() {
        let data = SubmitData {
            student_name: "Ana".into(),
            score: "1/2".into(),
            percentage: 50,
            telegram_sent: false,
            telegram_error: None,
        };

        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "studentName": "Ana",
                "score": "1/2",
                "percentage": 50,
                "telegramSent": false,
                "telegramError": null
            })
        );
    }
}
