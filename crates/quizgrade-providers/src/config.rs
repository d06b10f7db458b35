//! Configuration loading and provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizgrade_core::evaluator::EvaluatorConfig;
use quizgrade_core::traits::LlmProvider;

use crate::anthropic::AnthropicProvider;
use crate::gemini::GeminiProvider;
use crate::mock::{MockProvider, DEFAULT_MOCK_RESPONSE};
use crate::openai::OpenAiProvider;

/// File name searched for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "quizgrade.toml";

/// Configuration for a single provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Anthropic {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    Mock {
        #[serde(default = "default_mock_response")]
        response: String,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini { base_url, .. } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                base_url, org_id, ..
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Anthropic { base_url, .. } => f
                .debug_struct("Anthropic")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::Mock { response } => {
                f.debug_struct("Mock").field("response", response).finish()
            }
        }
    }
}

fn default_mock_response() -> String {
    DEFAULT_MOCK_RESPONSE.to_string()
}

/// Top-level quizgrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizgradeConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for scoring.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Model used for scoring.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature (0.0 keeps grading repeatable).
    #[serde(default)]
    pub temperature: f64,
    /// Max tokens for a verdict.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on one scoring call, in seconds.
    #[serde(default = "default_eval_timeout")]
    pub eval_timeout_secs: u64,
    /// Subject the interviewer persona is an expert in.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Question dataset (JSON).
    #[serde(default = "default_questions")]
    pub questions: PathBuf,
    /// Root directory for transcripts and feedback reports.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory for file-backed sessions; in-memory when unset.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    /// Idle seconds before an in-memory session is dropped.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Cap on in-memory sessions; the least recently used is evicted.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_eval_timeout() -> u64 {
    60
}
fn default_subject() -> String {
    "Excel".to_string()
}
fn default_questions() -> PathBuf {
    PathBuf::from("data/questions.json")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}
fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}
fn default_session_ttl() -> u64 {
    quizgrade_core::session::DEFAULT_SESSION_TTL.as_secs()
}
fn default_max_sessions() -> usize {
    quizgrade_core::session::DEFAULT_MAX_SESSIONS
}

impl Default for QuizgradeConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            eval_timeout_secs: default_eval_timeout(),
            subject: default_subject(),
            questions: default_questions(),
            log_dir: default_log_dir(),
            bind: default_bind(),
            session_dir: None,
            session_ttl_secs: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl QuizgradeConfig {
    /// Evaluator settings derived from this config.
    pub fn evaluator_config(&self, model: &str) -> EvaluatorConfig {
        EvaluatorConfig {
            model: model.to_string(),
            subject: self.subject.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.eval_timeout_secs),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + len];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + len + 1..]);
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    let opt = |v: &Option<String>| v.as_deref().map(resolve_env_vars);
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
            org_id: opt(org_id),
        },
        ProviderConfig::Anthropic { api_key, base_url } => ProviderConfig::Anthropic {
            api_key: resolve_env_vars(api_key),
            base_url: opt(base_url),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Overwrite (or insert) the API key of the named provider.
fn apply_key_override(config: &mut QuizgradeConfig, name: &str, key: String) {
    let entry = config
        .providers
        .entry(name.to_string())
        .or_insert_with(|| match name {
            "openai" => ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            },
            "anthropic" => ProviderConfig::Anthropic {
                api_key: String::new(),
                base_url: None,
            },
            _ => ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            },
        });
    match entry {
        ProviderConfig::Gemini { api_key, .. }
        | ProviderConfig::OpenAI { api_key, .. }
        | ProviderConfig::Anthropic { api_key, .. } => *api_key = key,
        ProviderConfig::Mock { .. } => {}
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgrade.toml` in the current directory
/// 2. `~/.config/quizgrade/config.toml`
///
/// Environment variable overrides: `GOOGLE_API_KEY` or `QUIZGRADE_GEMINI_KEY`,
/// `QUIZGRADE_OPENAI_KEY`, `QUIZGRADE_ANTHROPIC_KEY`.
pub fn load_config() -> Result<QuizgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgradeConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from(LOCAL_CONFIG_FILE)), global_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizgradeConfig::default(),
    };

    let gemini_key = std::env::var("QUIZGRADE_GEMINI_KEY")
        .or_else(|_| std::env::var("GOOGLE_API_KEY"))
        .ok();
    let overrides = [
        ("gemini", gemini_key),
        ("openai", std::env::var("QUIZGRADE_OPENAI_KEY").ok()),
        ("anthropic", std::env::var("QUIZGRADE_ANTHROPIC_KEY").ok()),
    ];
    for (name, key) in overrides {
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            apply_key_override(&mut config, name, key);
        }
    }

    Ok(config)
}

/// Parse a TOML config string and expand `${VAR}` references.
pub fn parse_config_str(content: &str) -> Result<QuizgradeConfig> {
    let mut config: QuizgradeConfig = toml::from_str(content)?;
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    Ok(config)
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("quizgrade")
            .join("config.toml")
    })
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Arc::new(GeminiProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Arc::new(OpenAiProvider::new(api_key, base_url.clone(), org_id.clone())?),
        ProviderConfig::Anthropic { api_key, base_url } => {
            Arc::new(AnthropicProvider::new(api_key, base_url.clone())?)
        }
        ProviderConfig::Mock { response } => Arc::new(MockProvider::with_fixed_response(response)),
    };
    Ok(provider)
}

/// Look up `name` in the config and build it.
///
/// `mock` is always available, answering with the default canned verdict
/// unless the config defines its own.
pub fn provider_by_name(config: &QuizgradeConfig, name: &str) -> Result<Arc<dyn LlmProvider>> {
    let Some(pconfig) = config.providers.get(name) else {
        if name == "mock" {
            return Ok(Arc::new(MockProvider::default()));
        }
        let mut available: Vec<_> = config.providers.keys().collect();
        available.sort();
        anyhow::bail!(
            "provider '{name}' not found in config. Available: {available:?}. \
             Set GOOGLE_API_KEY or add a [providers.{name}] table to {LOCAL_CONFIG_FILE}"
        );
    };
    create_provider(pconfig)
}
