//! `quizgrade serve` -- the interview page flow over HTTP.
//!
//! Endpoints:
//! - GET  /          - Reset the session and show the intro page
//! - POST /          - Reset the session and go to the first question
//! - GET  /question  - Current question, or redirect to /summary when done
//! - POST /question  - Submit the `answer` form field and advance
//! - GET  /summary   - Scores, band and feedback; writes logs on the first
//!                      view after the last answer
//! - GET  /health    - Server status and question count
//!
//! Sessions are tracked with the `quizgrade_session` cookie and kept in
//! memory, or on disk when `session_dir` is configured.

mod cookie;
mod handlers;
mod state;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use quizgrade_core::evaluator::Evaluator;
use quizgrade_core::flow::FlowController;
use quizgrade_core::logs::LogWriter;
use quizgrade_core::model::QuestionSet;
use quizgrade_core::parser::{load_question_set, validate_question_set};
use quizgrade_core::session::{FileSessionStore, MemorySessionStore, SessionStore};
use quizgrade_providers::{load_config_from, provider_by_name};

use self::handlers::{
    handle_answer, handle_health, handle_intro, handle_not_found, handle_question,
    handle_start, handle_summary,
};
use self::state::{AppState, SessionLocks};

/// Command-line overrides for `serve`; unset fields fall back to config.
pub(crate) struct ServeOptions {
    pub(crate) config: Option<PathBuf>,
    pub(crate) bind: Option<String>,
    pub(crate) questions: Option<PathBuf>,
    pub(crate) log_dir: Option<PathBuf>,
    pub(crate) provider: Option<String>,
    pub(crate) model: Option<String>,
}

/// Build the page-flow router over a ready application state.
pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_intro).post(handle_start))
        .route("/question", get(handle_question).post(handle_answer))
        .route("/summary", get(handle_summary))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load and check the question set. Sets whose ids cannot key a session
/// are rejected.
fn load_questions(path: &std::path::Path) -> Result<QuestionSet> {
    let questions = load_question_set(path)?;

    let mut fatal = Vec::new();
    for warning in validate_question_set(&questions) {
        if warning.is_fatal() {
            fatal.push(warning.message);
        } else {
            warn!(
                question = warning.question_id.as_deref().unwrap_or("-"),
                "{}", warning.message
            );
        }
    }
    if !fatal.is_empty() {
        anyhow::bail!(
            "invalid question set {}: {}",
            path.display(),
            fatal.join("; ")
        );
    }

    Ok(questions)
}

pub(crate) async fn start(opts: ServeOptions) -> Result<()> {
    let config = load_config_from(opts.config.as_deref())?;

    let bind = opts.bind.unwrap_or_else(|| config.bind.clone());
    let questions_path = opts.questions.unwrap_or_else(|| config.questions.clone());
    let log_dir = opts.log_dir.unwrap_or_else(|| config.log_dir.clone());
    let provider_name = opts
        .provider
        .unwrap_or_else(|| config.default_provider.clone());
    let model = opts.model.unwrap_or_else(|| config.default_model.clone());

    let questions = load_questions(&questions_path)?;
    info!(
        "loaded {} questions from {}",
        questions.len(),
        questions_path.display()
    );

    let provider = provider_by_name(&config, &provider_name)?;
    let evaluator = Evaluator::new(provider, config.evaluator_config(&model));
    info!("grading with {provider_name}/{model}");

    let sessions: Arc<dyn SessionStore> = match &config.session_dir {
        Some(dir) => {
            info!("storing sessions in {}", dir.display());
            Arc::new(FileSessionStore::new(dir)?)
        }
        None => Arc::new(MemorySessionStore::with_limits(
            Duration::from_secs(config.session_ttl_secs),
            config.max_sessions,
        )),
    };

    let state = Arc::new(AppState {
        flow: FlowController::new(
            Arc::new(questions),
            Arc::new(evaluator),
            LogWriter::new(log_dir),
        ),
        sessions,
        locks: SessionLocks::new(),
    });

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("quizgrade listening on http://{bind}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("received shutdown signal");
}
