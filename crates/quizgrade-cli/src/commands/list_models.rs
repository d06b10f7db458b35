//! The `quizgrade list-models` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgrade_providers::{create_provider, load_config_from};

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<_> = config.providers.keys().cloned().collect();
    names.sort();

    let mut table = Table::new();
    table.set_header(vec!["Provider", "Model", "Name", "Context"]);
    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|f| *f != name) {
            continue;
        }
        let Some(provider_config) = config.providers.get(&name) else {
            continue;
        };

        let provider = create_provider(provider_config)?;
        for model in provider.available_models() {
            found_any = true;
            let marker = if name == config.default_provider && model.id == config.default_model {
                " (default)"
            } else {
                ""
            };
            table.add_row(vec![
                Cell::new(&name),
                Cell::new(format!("{}{marker}", model.id)),
                Cell::new(&model.name),
                Cell::new(format!("{}K", model.max_context / 1000)),
            ]);
        }
    }

    if found_any {
        println!("{table}");
    } else {
        println!("No providers configured. Run `quizgrade init` to create a config file.");
    }

    Ok(())
}
