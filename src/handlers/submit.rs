// src/handlers/submit.rs

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State, response::IntoResponse};
use chrono::Utc;

use crate::{
    config::Config,
    error::AppError,
    models::{
        result::{SubmitData, SubmitResponse},
        submission::Submission,
    },
    utils::{report::render_report, scoring::score_submission, telegram::ReportSender},
};

/// Scores a quiz submission and relays the report to Telegram.
///
/// * Parses and validates the body (400 on bad JSON or a missing student name).
/// * Scores the attempt and renders the report in the configured style.
/// * Sends the report in one or more chunks.
/// * Always answers 200 once scored; delivery problems are reported in
///   `telegramSent` / `telegramError` instead of failing the request.
pub async fn submit_test(
    State(config): State<Config>,
    State(sender): State<Arc<ReportSender>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let received_at = Utc::now();
    let submission = Submission::from_json(&body)?;

    tracing::info!(
        "Received submission from {} ({} questions)",
        submission.student_name.trim(),
        submission.total_questions()
    );

    let summary = score_submission(&submission, received_at);
    let report = render_report(&summary, config.report_style);
    let outcome = sender.deliver(&report).await;

    tracing::info!(
        "Test results: student={} score={} percentage={} time_spent={} telegram_sent={} telegram_error={:?}",
        summary.student_name,
        summary.score_fraction(),
        summary.percentage,
        summary.time_spent,
        outcome.sent,
        outcome.error
    );

    Ok(Json(SubmitResponse {
        success: true,
        message: "Test submitted successfully",
        data: SubmitData {
            score: summary.score_fraction(),
            percentage: summary.percentage,
            student_name: summary.student_name,
            telegram_sent: outcome.sent,
            telegram_error: outcome.error,
        },
    }))
}

/// Any method other than POST (and the CORS preflight OPTIONS).
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
