use crate::client::PredictionResult;
use crate::error::ErrorInfo;
use chrono::NaiveDateTime;

pub const RESULT_HEADING: &str = "Analysis Result";
pub const FAILURE_MESSAGE: &str = "Error analyzing image. Please try again.";

/// The one status block shown under the trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultView {
    Success {
        emotion: String,
        /// Already formatted, e.g. `87.65%`.
        confidence: String,
        analyzed_at: Option<String>,
    },
    Failure {
        message: &'static str,
    },
}

impl ResultView {
    pub fn is_failure(&self) -> bool {
        matches!(self, ResultView::Failure { .. })
    }

    /// Text lines in display order.
    pub fn lines(&self) -> Vec<String> {
        match self {
            ResultView::Success {
                emotion,
                confidence,
                analyzed_at,
            } => {
                let mut lines = vec![
                    RESULT_HEADING.to_string(),
                    format!("Emotion: {emotion}"),
                    format!("Confidence: {confidence}"),
                ];
                if let Some(at) = analyzed_at {
                    lines.push(format!("Analyzed at: {at}"));
                }
                lines
            }
            ResultView::Failure { message } => vec![message.to_string()],
        }
    }
}

/// A terminal state of one submission.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    Succeeded(&'a PredictionResult),
    Failed(&'a ErrorInfo),
}

/// Holds the latest outcome. Every `present` call replaces the previous one.
#[derive(Debug, Default)]
pub struct ResultPresenter {
    current: Option<ResultView>,
    visible: bool,
}

impl ResultPresenter {
    pub fn present(&mut self, outcome: Outcome<'_>) {
        let view = match outcome {
            Outcome::Succeeded(result) => ResultView::Success {
                emotion: result.emotion.clone(),
                confidence: format_confidence(result.confidence),
                analyzed_at: result.analyzed_at.as_ref().map(format_timestamp),
            },
            // The cause has been logged already; users get the fixed text.
            Outcome::Failed(_) => ResultView::Failure {
                message: FAILURE_MESSAGE,
            },
        };
        self.current = Some(view);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// What the result region shows right now, if it is shown at all.
    pub fn visible_view(&self) -> Option<&ResultView> {
        self.current.as_ref().filter(|_| self.visible)
    }
}

/// Percentage with two decimals. Exact ties round up, not to even.
pub fn format_confidence(confidence: f64) -> String {
    let percent = confidence * 100.0;
    let halves = (percent * 200.0).round();
    // Tie only when percent * 200 is exactly an odd integer.
    if percent.mul_add(200.0, -halves) == 0.0 && halves.rem_euclid(2.0) == 1.0 {
        let cents = (halves as i64 + 1) / 2;
        return format!("{}.{:02}%", cents / 100, cents % 100);
    }
    format!("{percent:.2}%")
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
