//! quizgrade CLI — serves the mock interview and manages question sets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod serve;

#[derive(Parser)]
#[command(name = "quizgrade", version, about = "LLM-graded mock interview server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interview web server
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to listen on (e.g. "127.0.0.1:5000")
        #[arg(long)]
        bind: Option<String>,

        /// Path to the question set JSON file
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Directory for transcripts and feedback reports
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Provider used for grading (e.g. "gemini", "openai", "mock")
        #[arg(long)]
        provider: Option<String>,

        /// Model id passed to the provider
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate a question set file or directory
    Validate {
        /// Path to question set JSON file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and question set
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizgrade=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            bind,
            questions,
            log_dir,
            provider,
            model,
        } => {
            serve::start(serve::ServeOptions {
                config,
                bind,
                questions,
                log_dir,
                provider,
                model,
            })
            .await
        }
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
