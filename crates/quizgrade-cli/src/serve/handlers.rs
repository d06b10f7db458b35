//! Page handlers: intro, question loop, summary, health.

use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error};

use quizgrade_core::flow::QuestionView;
use quizgrade_core::session::{SessionId, SessionState};
use quizgrade_report::html;

use super::cookie::{self, with_session};
use super::state::AppState;

/// Anything that went wrong while serving a page.
pub(crate) struct PageError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for PageError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!("request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(html::error_page(
                "Something went wrong",
                "The interview could not continue. Please start again.",
            )),
        )
            .into_response()
    }
}

type PageResult = Result<Response, PageError>;

/// The request's session, or a fresh one at the first question.
struct Resumed {
    id: SessionId,
    state: SessionState,
    minted: bool,
}

async fn resume(app: &AppState, headers: &HeaderMap) -> anyhow::Result<Resumed> {
    if let Some(id) = cookie::session_id(headers) {
        if let Some(state) = app.sessions.load(id).await? {
            return Ok(Resumed {
                id,
                state,
                minted: false,
            });
        }
        debug!(session = %id, "unknown session, starting fresh");
        return Ok(Resumed {
            id,
            state: app.flow.begin(),
            minted: false,
        });
    }
    Ok(Resumed {
        id: SessionId::new(),
        state: app.flow.begin(),
        minted: true,
    })
}

/// Hold the request's session exclusively. Freshly minted ids need no lock.
async fn lock_session(app: &AppState, headers: &HeaderMap) -> Option<OwnedMutexGuard<()>> {
    match cookie::session_id(headers) {
        Some(id) => Some(app.locks.acquire(id).await),
        None => None,
    }
}

/// Reset the session, keeping its id when the request carried one.
async fn restart(app: &AppState, headers: &HeaderMap) -> anyhow::Result<(SessionId, bool)> {
    let (id, minted) = match cookie::session_id(headers) {
        Some(id) => (id, false),
        None => (SessionId::new(), true),
    };
    app.sessions.save(id, &app.flow.begin()).await?;
    Ok((id, minted))
}

/// GET /
pub(crate) async fn handle_intro(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PageResult {
    let (id, minted) = restart(&app, &headers).await?;
    let subject = &app.flow.evaluator().config().subject;
    let page = html::intro_page(subject, app.flow.questions().len());
    Ok(with_session(id, minted, Html(page)))
}

/// POST /
pub(crate) async fn handle_start(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PageResult {
    let (id, minted) = restart(&app, &headers).await?;
    Ok(with_session(id, minted, Redirect::to("/question")))
}

/// GET /question
pub(crate) async fn handle_question(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PageResult {
    let session = resume(&app, &headers).await?;
    if session.minted {
        app.sessions.save(session.id, &session.state).await?;
    }

    let response = match app.flow.view(&session.state) {
        QuestionView::Ask {
            question,
            number,
            total,
            progress,
        } => Html(html::question_page(question, number, total, progress)).into_response(),
        QuestionView::Summary => Redirect::to("/summary").into_response(),
    };
    Ok(with_session(session.id, session.minted, response))
}

#[derive(Deserialize)]
pub(crate) struct AnswerForm {
    #[serde(default)]
    answer: String,
    /// Position of the question the form was rendered for.
    #[serde(default)]
    index: Option<usize>,
}

/// POST /question
pub(crate) async fn handle_answer(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AnswerForm>,
) -> PageResult {
    let _guard = lock_session(&app, &headers).await;
    let session = resume(&app, &headers).await?;

    if form.index.is_some_and(|i| i != session.state.index()) {
        debug!(session = %session.id, "stale answer ignored");
        return Ok(with_session(
            session.id,
            session.minted,
            Redirect::to("/question"),
        ));
    }

    let submission = app.flow.submit(session.state, &form.answer).await;
    app.sessions.save(session.id, &submission.state).await?;
    Ok(with_session(
        session.id,
        session.minted,
        Redirect::to("/question"),
    ))
}

/// GET /summary
pub(crate) async fn handle_summary(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PageResult {
    let _guard = lock_session(&app, &headers).await;
    let session = resume(&app, &headers).await?;
    let view = app.flow.summary(session.state)?;
    if view.log_id.is_some() {
        app.sessions.save(session.id, &view.state).await?;
    }
    let page = html::summary_page(&view.report, view.log_id.as_deref());
    Ok(with_session(session.id, session.minted, Html(page)))
}

/// GET /health
pub(crate) async fn handle_health(State(app): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "questions": app.flow.questions().len(),
    });
    (StatusCode::OK, Json(response))
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Html(html::error_page("Not found", "There is no page at this address.")),
    )
}
