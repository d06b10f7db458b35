//! Core data model types for quizgrade.
//!
//! Questions come from a static dataset, evaluations are produced once per
//! submitted answer, and bands summarise a finished session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single interview question together with its grading rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the question set.
    pub id: String,
    /// The question shown to the candidate.
    pub question: String,
    /// What a good answer should contain.
    #[serde(default)]
    pub expected_answer_description: String,
    /// How the answer should be scored.
    #[serde(default)]
    pub evaluation_criteria: String,
}

/// An ordered sequence of questions. Presentation order is file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at a zero-based position, if any.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

/// Lowest score the rubric allows.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score the rubric allows.
pub const MAX_SCORE: f64 = 5.0;

/// The scored judgement of one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Score in `[0, 5]`, one decimal place.
    pub score: f64,
    /// Free-text justification shown back to the candidate.
    pub rationale: String,
}

impl Evaluation {
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score,
            rationale: rationale.into(),
        }
    }

    /// Zero-score evaluation substituted when scoring could not complete.
    pub fn sentinel(rationale: impl Into<String>) -> Self {
        Self::new(MIN_SCORE, rationale)
    }
}

/// Round to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Qualitative label derived from the average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Excellent,
    Competent,
    NeedsImprovement,
}

/// Presentation hint attached to a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

impl Band {
    /// Inclusive lower bound for [`Band::Excellent`].
    pub const EXCELLENT_THRESHOLD: f64 = 4.0;
    /// Inclusive lower bound for [`Band::Competent`].
    pub const COMPETENT_THRESHOLD: f64 = 3.0;

    pub fn from_average(average: f64) -> Self {
        if average >= Self::EXCELLENT_THRESHOLD {
            Band::Excellent
        } else if average >= Self::COMPETENT_THRESHOLD {
            Band::Competent
        } else {
            Band::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Excellent => "Excellent",
            Band::Competent => "Competent",
            Band::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Band::Excellent => Severity::Success,
            Band::Competent => Severity::Info,
            Band::NeedsImprovement => Severity::Warning,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_thresholds_are_inclusive() {
        assert_eq!(Band::from_average(5.0), Band::Excellent);
        assert_eq!(Band::from_average(4.0), Band::Excellent);
        assert_eq!(Band::from_average(3.9), Band::Competent);
        assert_eq!(Band::from_average(3.0), Band::Competent);
        assert_eq!(Band::from_average(2.9), Band::NeedsImprovement);
        assert_eq!(Band::from_average(0.0), Band::NeedsImprovement);
    }

    #[test]
    fn band_labels_and_severity() {
        assert_eq!(Band::Excellent.to_string(), "Excellent");
        assert_eq!(Band::NeedsImprovement.label(), "Needs Improvement");
        assert_eq!(Band::Excellent.severity(), Severity::Success);
        assert_eq!(Band::Competent.severity(), Severity::Info);
        assert_eq!(Band::NeedsImprovement.severity().to_string(), "warning");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_one_decimal(3.14159), 3.1);
        assert_eq!(round_one_decimal(4.0), 4.0);
        assert_eq!(round_one_decimal(2.96), 3.0);
    }

    #[test]
    fn question_set_deserializes_from_array() {
        let json = r#"[
            {"id": "q1", "question": "What is VLOOKUP?"},
            {"id": "q2", "question": "Pivot tables?", "evaluation_criteria": "mentions grouping"}
        ]"#;
        let set: QuestionSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().expected_answer_description, "");
        assert_eq!(set.get(1).unwrap().evaluation_criteria, "mentions grouping");
        assert!(set.get(2).is_none());
    }
}
