// src/utils/scoring.rs

use chrono::{DateTime, Utc};

use crate::models::{
    result::{AnswerStatus, PerformanceTier, QuestionResult, ResultSummary},
    submission::{Question, Submission},
};

pub const NOT_ANSWERED: &str = "Not answered";
pub const INVALID_OPTION: &str = "Invalid option";
pub const UNKNOWN_OPTION: &str = "Unknown";

/// Scores a submission. Pure: no I/O, never fails.
///
/// `received_at` stands in for `endTime` when the client did not send one.
pub fn score_submission(submission: &Submission, received_at: DateTime<Utc>) -> ResultSummary {
    let sheet = submission.answer_sheet();

    let per_question: Vec<QuestionResult> = submission
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| grade_question(index, question, sheet.selected(index)))
        .collect();

    let count = |status: AnswerStatus| per_question.iter().filter(|r| r.status == status).count();
    let correct_count = count(AnswerStatus::Correct);
    let wrong_count = count(AnswerStatus::Wrong);
    let unanswered_count = count(AnswerStatus::Unanswered);

    let total_questions = per_question.len();
    let percentage = calculate_percentage(correct_count, total_questions);

    ResultSummary {
        student_name: submission.student_name.clone(),
        total_questions,
        correct_count,
        wrong_count,
        unanswered_count,
        percentage,
        tier: PerformanceTier::from_percentage(percentage),
        per_question,
        time_spent: format_duration(submission.time_spent),
        time_left: format_duration(submission.time_left),
        leave_count: submission.leave_count,
        submitted_at: submission.end_time.unwrap_or(received_at),
    }
}

fn grade_question(index: usize, question: &Question, selected: Option<i64>) -> QuestionResult {
    let correct_answer_text = option_text(&question.options, question.correct)
        .unwrap_or(UNKNOWN_OPTION)
        .to_string();

    let (status, student_answer_text) = match selected {
        None => (AnswerStatus::Unanswered, NOT_ANSWERED.to_string()),
        Some(selected) => {
            let status = if selected == question.correct {
                AnswerStatus::Correct
            } else {
                AnswerStatus::Wrong
            };
            // Out-of-range picks still count as answered.
            let text = option_text(&question.options, selected).unwrap_or(INVALID_OPTION);
            (status, text.to_string())
        }
    };

    QuestionResult {
        index,
        question_text: question.question.clone(),
        student_answer_text,
        correct_answer_text,
        status,
    }
}

fn option_text(options: &[String], index: i64) -> Option<&str> {
    usize::try_from(index)
        .ok()
        .and_then(|i| options.get(i))
        .map(String::as_str)
}

/// `round(correct / total * 100)`, halves rounded up. Zero questions score 0.
pub fn calculate_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// `125` -> `"2m 5s"`.
pub fn format_duration(seconds: u64) -> String {
    format!("{}m {}s", seconds / 60, seconds % 60)
}
