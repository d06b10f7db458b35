//! Per-candidate session state and the stores that keep it between requests.
//!
//! `SessionState` is a plain value: flow transitions take one and hand back
//! the next, and the HTTP layer loads and saves it through a `SessionStore`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

use crate::model::Evaluation;

/// Opaque identifier for one candidate's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An answer and the evaluation it received, written together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub answer: String,
    pub evaluation: Evaluation,
}

/// Progress of one candidate through the question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    index: usize,
    total: usize,
    responses: BTreeMap<String, AnsweredQuestion>,
    #[serde(default)]
    log_id: Option<String>,
}

impl SessionState {
    /// Fresh state at the first question.
    pub fn new(total: usize) -> Self {
        Self {
            index: 0,
            total,
            responses: BTreeMap::new(),
            log_id: None,
        }
    }

    /// Zero-based index of the question currently being asked.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether every question has been answered.
    pub fn is_complete(&self) -> bool {
        self.index >= self.total
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    pub fn response(&self, question_id: &str) -> Option<&AnsweredQuestion> {
        self.responses.get(question_id)
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.response(question_id).map(|r| r.answer.as_str())
    }

    pub fn evaluation(&self, question_id: &str) -> Option<&Evaluation> {
        self.response(question_id).map(|r| &r.evaluation)
    }

    /// Evaluations in question-id order.
    pub fn evaluations(&self) -> impl Iterator<Item = &Evaluation> {
        self.responses.values().map(|r| &r.evaluation)
    }

    /// Id of the persisted transcript/feedback artifacts, once written.
    pub fn log_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }

    /// Store the response for `question_id` and advance to the next question.
    pub(crate) fn record(&mut self, question_id: &str, answer: String, evaluation: Evaluation) {
        self.responses.insert(
            question_id.to_string(),
            AnsweredQuestion { answer, evaluation },
        );
        self.index += 1;
    }

    pub(crate) fn set_log_id(&mut self, log_id: String) {
        self.log_id = Some(log_id);
    }
}

/// Persistence for session state, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, or `None` if it does not exist.
    async fn load(&self, id: SessionId) -> Result<Option<SessionState>>;

    /// Insert or replace a session.
    async fn save(&self, id: SessionId, state: &SessionState) -> Result<()>;

    /// Forget a session. Removing an unknown id is not an error.
    async fn remove(&self, id: SessionId) -> Result<()>;
}

/// Idle time after which an in-memory session is dropped.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum number of in-memory sessions kept at once.
pub const DEFAULT_MAX_SESSIONS: usize = 500;

struct StoredSession {
    state: SessionState,
    touched: Instant,
}

/// Process-local session store.
///
/// Entries idle longer than the TTL are treated as missing and are pruned on
/// `save`. When the store is full, the least recently used entry is evicted.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, StoredSession>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: SessionId) -> Result<Option<SessionState>> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        match sessions.get_mut(&id) {
            Some(entry) if now.duration_since(entry.touched) <= self.ttl => {
                entry.touched = now;
                Ok(Some(entry.state.clone()))
            }
            Some(_) => {
                sessions.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: SessionId, state: &SessionState) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        sessions.retain(|_, entry| now.duration_since(entry.touched) <= self.ttl);

        if !sessions.contains_key(&id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(key, _)| *key);
            if let Some(oldest) = oldest {
                debug!(session = %oldest, "session store full, evicting");
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            id,
            StoredSession {
                state: state.clone(),
                touched: now,
            },
        );
        Ok(())
    }

    async fn remove(&self, id: SessionId) -> Result<()> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }
}

/// Session store writing one JSON file per session into a directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create the store, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create session directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: SessionId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: SessionId) -> Result<Option<SessionState>> {
        let path = self.path_for(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read session: {}", path.display()))
            }
        };
        let state = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session: {}", path.display()))?;
        Ok(Some(state))
    }

    async fn save(&self, id: SessionId, state: &SessionState) -> Result<()> {
        let path = self.path_for(id);
        let json = serde_json::to_string(state).context("failed to serialize session")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write session: {}", path.display()))
    }

    async fn remove(&self, id: SessionId) -> Result<()> {
        let path = self.path_for(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove session: {}", path.display()))
            }
        }
    }
}
