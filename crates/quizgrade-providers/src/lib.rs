//! quizgrade-providers — text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for Google Gemini, OpenAI-compatible
//! endpoints, and Anthropic, plus a mock for tests and offline demos.

pub mod anthropic;
pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use config::{
    create_provider, load_config, load_config_from, provider_by_name, ProviderConfig,
    QuizgradeConfig,
};
pub use quizgrade_core::error::ProviderError;
