//! The `quizgrade init` command.

use std::path::Path;

use anyhow::{Context, Result};

use quizgrade_providers::config::LOCAL_CONFIG_FILE;

const STARTER_QUESTIONS_PATH: &str = "data/questions.json";

pub fn execute() -> Result<()> {
    init_in(Path::new("."))
}

fn init_in(root: &Path) -> Result<()> {
    write_if_missing(&root.join(LOCAL_CONFIG_FILE), SAMPLE_CONFIG, LOCAL_CONFIG_FILE)?;

    let questions = root.join(STARTER_QUESTIONS_PATH);
    if let Some(parent) = questions.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    write_if_missing(&questions, STARTER_QUESTIONS, STARTER_QUESTIONS_PATH)?;

    println!("\nNext steps:");
    println!("  1. Set GOOGLE_API_KEY or edit {LOCAL_CONFIG_FILE}");
    println!("  2. Run: quizgrade validate --questions {STARTER_QUESTIONS_PATH}");
    println!("  3. Run: quizgrade serve");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str, label: &str) -> Result<()> {
    if path.exists() {
        println!("{label} already exists, skipping.");
        return Ok(());
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Created {label}");
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgrade configuration

default_provider = "gemini"
default_model = "gemini-1.5-flash-latest"
temperature = 0.0
max_tokens = 1024
eval_timeout_secs = 60

subject = "Excel"
questions = "data/questions.json"
log_dir = "logs"
bind = "0.0.0.0:5000"
# session_dir = "sessions"
session_ttl_secs = 86400
max_sessions = 500

[providers.gemini]
type = "gemini"
api_key = "${GOOGLE_API_KEY}"

# [providers.openai]
# type = "openai"
# api_key = "${OPENAI_API_KEY}"

# [providers.anthropic]
# type = "anthropic"
# api_key = "${ANTHROPIC_API_KEY}"

[providers.mock]
type = "mock"
"#;

const STARTER_QUESTIONS: &str = r#"[
  {
    "id": "vlookup_limits",
    "question": "Explain how VLOOKUP works and describe one of its main limitations.",
    "expected_answer_description": "VLOOKUP searches the first column of a table range for a lookup value and returns the value from a specified column in the same row.",
    "evaluation_criteria": "Mentions lookup value, table range, column index and match type, and names a limitation such as only looking to the right."
  },
  {
    "id": "absolute_references",
    "question": "What is the difference between relative, absolute and mixed cell references?",
    "expected_answer_description": "Relative references shift when copied, absolute references ($A$1) stay fixed, mixed references fix only the row or the column.",
    "evaluation_criteria": "Correct notation for all three types and at least one sensible use case."
  },
  {
    "id": "pivot_tables",
    "question": "Describe how you would use a pivot table to summarise monthly sales by region.",
    "expected_answer_description": "Region in rows, month grouped from a date in columns, sales summed in values.",
    "evaluation_criteria": "Mentions rows/columns/values areas, aggregation choice and refreshing when the source changes."
  }
]
"#;
