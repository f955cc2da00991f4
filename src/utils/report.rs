// src/utils/report.rs

use std::{borrow::Cow, fmt, str::FromStr};

use crate::{
    models::result::{AnswerStatus, PerformanceTier, ResultSummary},
    utils::markdown::escape_markdown,
};

const RULE: &str = "═══════════════════";

/// Report template. Both styles carry the same content; only markup differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportStyle {
    /// Emoji and `*bold*` labels for Telegram's legacy Markdown parse mode.
    #[default]
    Markdown,
    /// No markup at all.
    Plain,
}

impl ReportStyle {
    /// Value for the Bot API `parse_mode` field.
    pub fn parse_mode(self) -> Option<&'static str> {
        match self {
            ReportStyle::Markdown => Some("Markdown"),
            ReportStyle::Plain => None,
        }
    }
}

impl FromStr for ReportStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportStyle::Markdown),
            "plain" | "text" => Ok(ReportStyle::Plain),
            other => Err(format!("unknown report style '{}'", other)),
        }
    }
}

impl fmt::Display for ReportStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStyle::Markdown => write!(f, "markdown"),
            ReportStyle::Plain => write!(f, "plain"),
        }
    }
}

/// Markup helpers for one style.
struct Markup {
    style: ReportStyle,
}

impl Markup {
    fn markdown(&self) -> bool {
        self.style == ReportStyle::Markdown
    }

    /// Leading icon, dropped in plain style.
    fn icon(&self, icon: &str) -> String {
        if self.markdown() {
            format!("{} ", icon)
        } else {
            String::new()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.markdown() {
            format!("*{}*", text)
        } else {
            text.to_string()
        }
    }

    fn label(&self, name: &str) -> String {
        self.bold(&format!("{}:", name))
    }

    fn user_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.markdown() {
            escape_markdown(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    fn status_icon(&self, status: AnswerStatus) -> String {
        let icon = match status {
            AnswerStatus::Correct => "✅",
            AnswerStatus::Wrong => "❌",
            AnswerStatus::Unanswered => "⚪",
        };
        self.icon(icon)
    }

    fn tier_icon(&self, tier: PerformanceTier) -> String {
        let icon = match tier {
            PerformanceTier::Excellent => "🌟",
            PerformanceTier::VeryGood => "🎉",
            PerformanceTier::Good => "👍",
            PerformanceTier::Satisfactory => "🙂",
            PerformanceTier::NeedsImprovement => "📚",
        };
        self.icon(icon)
    }
}

/// Renders the full report: header, per-question detail, footer.
///
/// Output depends only on the summary and the style, so rendering the same
/// summary twice yields identical text.
pub fn render_report(summary: &ResultSummary, style: ReportStyle) -> String {
    let m = Markup { style };
    let mut lines: Vec<String> = Vec::new();

    // Header
    lines.push(format!("{}{}", m.icon("🎓"), m.bold("Test Submission")));
    lines.push(String::new());
    lines.push(format!(
        "{}{} {}",
        m.icon("👤"),
        m.label("Student"),
        m.user_text(&summary.student_name)
    ));
    lines.push(format!("{}{} {}", m.icon("⏱️"), m.label("Time Spent"), summary.time_spent));
    lines.push(format!("{}{} {}", m.icon("⏳"), m.label("Time Left"), summary.time_left));
    lines.push(format!(
        "{}{} {} ({}%)",
        m.icon("📊"),
        m.label("Score"),
        summary.score_fraction(),
        summary.percentage
    ));
    lines.push(format!(
        "{}{} {} | {} {} | {} {}",
        m.icon("🧮"),
        m.label("Correct"),
        summary.correct_count,
        m.label("Wrong"),
        summary.wrong_count,
        m.label("Unanswered"),
        summary.unanswered_count
    ));
    lines.push(format!("{}{} {}", m.icon("🚪"), m.label("Page Leaves"), summary.leave_count));
    lines.push(format!(
        "{}{} {}",
        m.icon("📅"),
        m.label("Submitted"),
        summary.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(String::new());

    // Per-question detail
    lines.push(m.bold("Detailed Results:"));
    lines.push(RULE.to_string());
    lines.push(String::new());

    for result in &summary.per_question {
        lines.push(format!(
            "{}{} {}",
            m.status_icon(result.status),
            m.label(&format!("Q{}", result.index + 1)),
            m.user_text(&result.question_text)
        ));
        lines.push(format!(
            "   {} {}",
            m.label("Student"),
            m.user_text(&result.student_answer_text)
        ));
        lines.push(format!(
            "   {} {}",
            m.label("Correct"),
            m.user_text(&result.correct_answer_text)
        ));
        lines.push(format!("   {} {}", m.label("Status"), result.status.label()));
        lines.push(String::new());
    }

    // Footer
    lines.push(RULE.to_string());
    lines.push(format!(
        "{}{}",
        m.icon("🏆"),
        m.bold(&format!("Final Score: {}%", summary.percentage))
    ));
    lines.push(format!(
        "{}{} {}",
        m.tier_icon(summary.tier),
        m.label("Performance"),
        summary.tier.label()
    ));

    lines.join("\n")
}
