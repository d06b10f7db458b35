//! End-of-session summary: average score, band, and the transcript and
//! feedback texts written to the log artifacts.

use serde::Serialize;

use crate::model::{round_one_decimal, Band, Evaluation, QuestionSet};
use crate::session::SessionState;

/// One row of the summary, in question-set order.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryItem {
    pub question_id: String,
    pub question: String,
    /// Empty when the question was never answered.
    pub answer: String,
    pub evaluation: Option<Evaluation>,
}

/// Derived view of a finished (or abandoned) session.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub items: Vec<SummaryItem>,
    /// Mean score over evaluated questions, one decimal place.
    pub average: f64,
    pub band: Band,
    pub transcript: String,
    pub feedback: String,
}

impl SummaryReport {
    /// Compute the report for `state` against `questions`.
    pub fn compute(questions: &QuestionSet, state: &SessionState) -> Self {
        let items: Vec<SummaryItem> = questions
            .iter()
            .map(|q| SummaryItem {
                question_id: q.id.clone(),
                question: q.question.clone(),
                answer: state.answer(&q.id).unwrap_or_default().to_string(),
                evaluation: state.evaluation(&q.id).cloned(),
            })
            .collect();

        let scores: Vec<f64> = state.evaluations().map(|e| e.score).collect();
        let average = round_one_decimal(average_score(&scores));
        let band = Band::from_average(average);

        let transcript = items
            .iter()
            .map(|item| {
                format!(
                    "Q: {}\nA: {}\nScore: {:.1}\n",
                    item.question,
                    item.answer,
                    item.evaluation.as_ref().map_or(0.0, |e| e.score)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut feedback = format!("Overall: {average:.1}/5 ({band})\n");
        let lines: Vec<String> = items
            .iter()
            .map(|item| {
                let rationale = item
                    .evaluation
                    .as_ref()
                    .map_or("", |e| e.rationale.as_str());
                format!("- {}: {}", item.question_id, rationale)
            })
            .collect();
        feedback.push_str(&lines.join("\n"));

        Self {
            items,
            average,
            band,
            transcript,
            feedback,
        }
    }
}

/// Arithmetic mean, `0.0` for no scores.
pub fn average_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn questions(n: usize) -> QuestionSet {
        QuestionSet::new(
            (1..=n)
                .map(|i| Question {
                    id: format!("q{i}"),
                    question: format!("Question {i}?"),
                    expected_answer_description: String::new(),
                    evaluation_criteria: String::new(),
                })
                .collect(),
        )
    }

    fn state_with_scores(scores: &[f64]) -> SessionState {
        let mut state = SessionState::new(scores.len());
        for (i, score) in scores.iter().enumerate() {
            state.record(
                &format!("q{}", i + 1),
                format!("answer {}", i + 1),
                Evaluation::new(*score, format!("rationale {}", i + 1)),
            );
        }
        state
    }

    #[test]
    fn average_and_band_boundaries() {
        let cases: &[(&[f64], f64, Band)] = &[
            (&[5.0, 5.0, 5.0, 5.0], 5.0, Band::Excellent),
            (&[3.0, 3.0, 3.0, 3.0], 3.0, Band::Competent),
            (&[2.0, 2.0], 2.0, Band::NeedsImprovement),
            (&[], 0.0, Band::NeedsImprovement),
        ];
        for (scores, average, band) in cases {
            let report = SummaryReport::compute(&questions(scores.len()), &state_with_scores(scores));
            assert_eq!(report.average, *average, "scores {scores:?}");
            assert_eq!(report.band, *band, "scores {scores:?}");
        }
    }

    #[test]
    fn average_ignores_unanswered_questions() {
        let report = SummaryReport::compute(&questions(3), &state_with_scores(&[4.0]));
        assert_eq!(report.average, 4.0);
        assert_eq!(report.items.len(), 3);
        assert!(report.items[1].evaluation.is_none());
        assert_eq!(report.items[1].answer, "");
    }

    #[test]
    fn average_is_rounded_before_banding() {
        let report = SummaryReport::compute(&questions(3), &state_with_scores(&[4.0, 4.0, 3.9]));
        assert_eq!(report.average, 4.0);
        assert_eq!(report.band, Band::Excellent);
    }

    #[test]
    fn transcript_and_feedback_text() {
        let report = SummaryReport::compute(&questions(2), &state_with_scores(&[4.0, 2.5]));
        assert_eq!(
            report.transcript,
            "Q: Question 1?\nA: answer 1\nScore: 4.0\n\nQ: Question 2?\nA: answer 2\nScore: 2.5\n"
        );
        assert_eq!(
            report.feedback,
            "Overall: 3.3/5 (Competent)\n- q1: rationale 1\n- q2: rationale 2"
        );
    }
}
