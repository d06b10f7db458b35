//! JSON question-set loader.
//!
//! Loads question sets from JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{Question, QuestionSet};

/// Parse a JSON file into a `QuestionSet`.
pub fn load_question_set(path: &Path) -> Result<QuestionSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question set: {}", path.display()))?;

    parse_question_set_str(&content, path)
}

/// Parse a JSON string into a `QuestionSet` (useful for testing).
pub fn parse_question_set_str(content: &str, source_path: &Path) -> Result<QuestionSet> {
    let questions: Vec<Question> = serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))?;
    Ok(QuestionSet::new(questions))
}

/// Load every `.json` question set in a directory (non-recursive).
///
/// Files that fail to parse are skipped with a warning.
pub fn load_question_directory(dir: &Path) -> Result<Vec<(String, QuestionSet)>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    let mut sets = Vec::new();
    for entry in entries {
        let path = entry.path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        match load_question_set(&path) {
            Ok(set) => sets.push((path.display().to_string(), set)),
            Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
        }
    }

    Ok(sets)
}

/// A warning from question-set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Warnings that make the set unusable for a session.
    pub fn is_fatal(&self) -> bool {
        self.message.starts_with("duplicate question ID") || self.message == "empty question ID"
    }
}

/// Validate a question set for common issues.
pub fn validate_question_set(set: &QuestionSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if set.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "question set is empty".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for q in set.iter() {
        if q.id.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: None,
                message: "empty question ID".into(),
            });
            continue;
        }
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in set.iter() {
        if q.question.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "question text is empty".into(),
            });
        }
        if q.expected_answer_description.trim().is_empty() && q.evaluation_criteria.trim().is_empty()
        {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "no expected answer or evaluation criteria; scoring will be unguided"
                    .into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_JSON: &str = r#"[
  {
    "id": "vlookup",
    "question": "Explain how VLOOKUP works and one of its limitations.",
    "expected_answer_description": "Looks up a value in the first column of a range and returns a value from another column.",
    "evaluation_criteria": "Mentions exact vs approximate match and the left-lookup limitation."
  },
  {
    "id": "pivot",
    "question": "When would you use a pivot table?",
    "expected_answer_description": "Summarising large data sets by grouping and aggregating.",
    "evaluation_criteria": "Mentions rows/columns/values areas and refresh."
  }
]"#;

    #[test]
    fn parse_valid_json() {
        let set = parse_question_set_str(VALID_JSON, &PathBuf::from("q.json")).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().id, "vlookup");
        assert_eq!(set.get(1).unwrap().id, "pivot");
        assert!(validate_question_set(&set).is_empty());
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_question_set_str("{ not json ]", &PathBuf::from("bad.json"));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let json = r#"[{"id": "q1"}]"#;
        assert!(parse_question_set_str(json, &PathBuf::from("q.json")).is_err());
    }

    #[test]
    fn validate_duplicate_ids() {
        let json = r#"[
            {"id": "same", "question": "First?", "evaluation_criteria": "x"},
            {"id": "same", "question": "Second?", "evaluation_criteria": "y"}
        ]"#;
        let set = parse_question_set_str(json, &PathBuf::from("q.json")).unwrap();
        let warnings = validate_question_set(&set);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(ValidationWarning::is_fatal));
    }

    #[test]
    fn validate_empty_text_and_rubric() {
        let json = r#"[{"id": "q1", "question": "  "}]"#;
        let set = parse_question_set_str(json, &PathBuf::from("q.json")).unwrap();
        let warnings = validate_question_set(&set);
        assert!(warnings.iter().any(|w| w.message == "question text is empty"));
        assert!(warnings.iter().any(|w| w.message.contains("unguided")));
        assert!(!warnings.iter().any(ValidationWarning::is_fatal));
    }

    #[test]
    fn validate_empty_set() {
        let warnings = validate_question_set(&QuestionSet::default());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].message, "question set is empty");
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("excel.json"), VALID_JSON).unwrap();
        std::fs::write(dir.path().join("broken.json"), "nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = load_question_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(sets[0].0.ends_with("excel.json"));
        assert_eq!(sets[0].1.len(), 2);
    }
}
