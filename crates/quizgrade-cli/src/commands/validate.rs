//! The `quizgrade validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgrade_core::model::QuestionSet;
use quizgrade_core::parser::{load_question_directory, load_question_set, validate_question_set};

pub fn execute(questions_path: PathBuf) -> Result<()> {
    let sets = if questions_path.is_dir() {
        load_question_directory(&questions_path)?
    } else {
        vec![(
            questions_path.display().to_string(),
            load_question_set(&questions_path)?,
        )]
    };

    let mut total_warnings = 0;
    let mut fatal = 0;

    for (source, set) in &sets {
        println!("Question set: {source} ({} questions)", set.len());
        if !set.is_empty() {
            println!("{}", question_table(set));
        }

        let warnings = validate_question_set(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            let level = if w.is_fatal() { "ERROR" } else { "WARNING" };
            println!("{prefix} {level}: {}", w.message);
            if w.is_fatal() {
                fatal += 1;
            }
        }
        total_warnings += warnings.len();
    }

    if fatal > 0 {
        anyhow::bail!("{fatal} question set error(s) found");
    }

    if total_warnings == 0 {
        println!("All question sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn question_table(set: &QuestionSet) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Question", "Rubric"]);

    for (i, q) in set.iter().enumerate() {
        let rubric = match (
            q.expected_answer_description.trim().is_empty(),
            q.evaluation_criteria.trim().is_empty(),
        ) {
            (false, false) => "answer + criteria",
            (false, true) => "answer",
            (true, false) => "criteria",
            (true, true) => "none",
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&q.id),
            Cell::new(truncate(&q.question, 60)),
            Cell::new(rubric),
        ]);
    }

    table
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
