//! Durable transcript and feedback artifacts for completed sessions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

/// Timestamp format of log ids: sortable and filesystem-safe.
pub const LOG_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes session logs under a root directory.
///
/// Layout:
/// - `<root>/transcripts/<id>_transcript.txt`
/// - `<root>/reports/<id>_feedback.txt`
#[derive(Debug, Clone)]
pub struct LogWriter {
    root: PathBuf,
}

impl LogWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transcript_path(&self, log_id: &str) -> PathBuf {
        self.root
            .join("transcripts")
            .join(format!("{log_id}_transcript.txt"))
    }

    pub fn feedback_path(&self, log_id: &str) -> PathBuf {
        self.root
            .join("reports")
            .join(format!("{log_id}_feedback.txt"))
    }

    /// Write both artifacts and return the shared log id.
    ///
    /// Two sessions finishing within the same second overwrite each other.
    pub fn persist(&self, transcript: &str, feedback: &str) -> Result<String> {
        let log_id = Local::now().format(LOG_ID_FORMAT).to_string();

        for (path, content) in [
            (self.transcript_path(&log_id), transcript),
            (self.feedback_path(&log_id), feedback),
        ] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory: {}", parent.display())
                })?;
            }
            std::fs::write(&path, content)
                .with_context(|| format!("failed to write log: {}", path.display()))?;
        }

        tracing::info!(log_id = %log_id, root = %self.root.display(), "session logs written");
        Ok(log_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LogWriter::new(dir.path().join("logs"));

        let id = writer.persist("Q: a\nA: b\nScore: 1.0\n", "Overall: 1.0/5").unwrap();
        assert_eq!(id.len(), "20250101_120000".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&id, LOG_ID_FORMAT).is_ok());

        let transcript = std::fs::read_to_string(writer.transcript_path(&id)).unwrap();
        let feedback = std::fs::read_to_string(writer.feedback_path(&id)).unwrap();
        assert_eq!(transcript, "Q: a\nA: b\nScore: 1.0\n");
        assert_eq!(feedback, "Overall: 1.0/5");

        let transcripts: Vec<_> = std::fs::read_dir(dir.path().join("logs/transcripts"))
            .unwrap()
            .collect();
        let reports: Vec<_> = std::fs::read_dir(dir.path().join("logs/reports"))
            .unwrap()
            .collect();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn persist_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let writer = LogWriter::new(&blocker);
        assert!(writer.persist("t", "f").is_err());
    }
}
