//! Session flow controller.
//!
//! Walks a candidate through `Start -> Asking(0) -> ... -> Asking(n-1) ->
//! Summary`. Transitions are pure with respect to storage: each takes a
//! `SessionState` and returns the next one, leaving persistence to the
//! caller's `SessionStore`.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::evaluator::Evaluator;
use crate::logs::LogWriter;
use crate::model::{Evaluation, Question, QuestionSet};
use crate::session::SessionState;
use crate::summary::SummaryReport;

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Start,
    Asking(usize),
    Summary,
}

/// What to show for a question-page request.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionView<'a> {
    /// Render the current question.
    Ask {
        question: &'a Question,
        /// One-based position for display.
        number: usize,
        total: usize,
        /// Percentage of questions already answered, rounded down.
        progress: u8,
    },
    /// Nothing left to ask; go to the summary.
    Summary,
}

/// Result of submitting an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub state: SessionState,
    /// The evaluation stored for the submitted answer, `None` when the
    /// session was already complete and nothing was recorded.
    pub evaluation: Option<Evaluation>,
    pub next: FlowState,
}

/// Rendered summary plus the id of its log artifacts.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub state: SessionState,
    pub report: SummaryReport,
    /// `None` while questions remain unanswered; nothing is written then.
    pub log_id: Option<String>,
}

/// Drives sessions over one question set.
pub struct FlowController {
    questions: Arc<QuestionSet>,
    evaluator: Arc<Evaluator>,
    logs: LogWriter,
}

impl FlowController {
    pub fn new(questions: Arc<QuestionSet>, evaluator: Arc<Evaluator>, logs: LogWriter) -> Self {
        Self {
            questions,
            evaluator,
            logs,
        }
    }

    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn logs(&self) -> &LogWriter {
        &self.logs
    }

    /// Start a new session, discarding whatever came before.
    pub fn begin(&self) -> SessionState {
        info!(total = self.questions.len(), "session started");
        SessionState::new(self.questions.len())
    }

    /// Current position in the flow; `None` means no session has begun.
    pub fn state_of(&self, state: Option<&SessionState>) -> FlowState {
        match state {
            None => FlowState::Start,
            Some(s) if s.index() >= self.questions.len() => FlowState::Summary,
            Some(s) => FlowState::Asking(s.index()),
        }
    }

    /// Resolve a question-page view without changing state.
    pub fn view<'a>(&'a self, state: &SessionState) -> QuestionView<'a> {
        let total = self.questions.len();
        match self.questions.get(state.index()) {
            Some(question) => QuestionView::Ask {
                question,
                number: state.index() + 1,
                total,
                progress: progress_percent(state.index(), total),
            },
            None => QuestionView::Summary,
        }
    }

    /// Record the answer to the current question, score it, and advance.
    ///
    /// The answer is trimmed before it is stored and scored. Submitting to a
    /// completed session is a no-op that points at the summary.
    pub async fn submit(&self, mut state: SessionState, answer: &str) -> Submission {
        let Some(question) = self.questions.get(state.index()) else {
            return Submission {
                state,
                evaluation: None,
                next: FlowState::Summary,
            };
        };

        let answer = answer.trim().to_string();
        let evaluation = self.evaluator.evaluate(question, &answer).await;
        state.record(&question.id, answer, evaluation.clone());

        let next = self.state_of(Some(&state));
        if next == FlowState::Summary {
            info!(answered = state.answered_count(), "session complete");
        }

        Submission {
            state,
            evaluation: Some(evaluation),
            next,
        }
    }

    /// Compute the summary, writing log artifacts the first time a
    /// completed session is viewed.
    ///
    /// Later views recompute the report but reuse the stored log id; no
    /// answer is re-scored. A session with questions left gets a partial
    /// report and no artifacts.
    pub fn summary(&self, mut state: SessionState) -> Result<SummaryView> {
        let report = SummaryReport::compute(&self.questions, &state);

        let log_id = match state.log_id() {
            Some(id) => Some(id.to_string()),
            None if state.index() >= self.questions.len() => {
                let id = self.logs.persist(&report.transcript, &report.feedback)?;
                state.set_log_id(id.clone());
                Some(id)
            }
            None => None,
        };

        Ok(SummaryView {
            state,
            report,
            log_id,
        })
    }
}

/// `floor(index / total * 100)`, or 0 for an empty set.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((index.min(total) * 100) / total) as u8
}
