//! Mock provider for tests and offline demos.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizgrade_core::error::ProviderError;
use quizgrade_core::traits::{
    GenerateRequest, GenerateResponse, LlmProvider, ModelInfo, TokenUsage,
};

/// Default verdict returned when nothing else is configured.
pub const DEFAULT_MOCK_RESPONSE: &str =
    r#"{"score": 3, "rationale": "Mock evaluation: answer received."}"#;

enum Behavior {
    /// Ordered (prompt substring, response) pairs, with a fallback.
    Respond {
        rules: Vec<(String, String)>,
        fallback: String,
    },
    /// Every call fails with a network error carrying this message.
    Fail(String),
}

/// A scripted provider that never touches the network.
pub struct MockProvider {
    behavior: Behavior,
    call_count: AtomicU32,
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always reply with `response`.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::with_behavior(Behavior::Respond {
            rules: Vec::new(),
            fallback: response.to_string(),
        })
    }

    /// Reply with the first rule whose key appears in the prompt, else `fallback`.
    pub fn with_rules(rules: Vec<(String, String)>, fallback: &str) -> Self {
        Self::with_behavior(Behavior::Respond {
            rules,
            fallback: fallback.to_string(),
        })
    }

    /// Fail every call as if the network were down.
    pub fn failing(message: &str) -> Self {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::with_fixed_response(DEFAULT_MOCK_RESPONSE)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let content = match &self.behavior {
            Behavior::Fail(message) => {
                return Err(ProviderError::NetworkError(message.clone()).into())
            }
            Behavior::Respond { rules, fallback } => rules
                .iter()
                .find(|(key, _)| request.prompt.contains(key.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| fallback.clone()),
        };

        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;
        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response(r#"{"score": 1}"#);
        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, r#"{"score": 1}"#);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn prompt_matching() {
        let provider = MockProvider::with_rules(
            vec![
                ("VLOOKUP".into(), r#"{"score": 5}"#.into()),
                ("pivot".into(), r#"{"score": 2}"#.into()),
            ],
            r#"{"score": 0}"#,
        );

        let resp = provider.generate(&request("Explain VLOOKUP")).await.unwrap();
        assert_eq!(resp.content, r#"{"score": 5}"#);
        let resp = provider.generate(&request("Use a pivot table")).await.unwrap();
        assert_eq!(resp.content, r#"{"score": 2}"#);
        let resp = provider.generate(&request("Something else")).await.unwrap();
        assert_eq!(resp.content, r#"{"score": 0}"#);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_provider() {
        let provider = MockProvider::failing("simulated outage");
        let err = provider.generate(&request("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "network error: simulated outage");
        assert_eq!(provider.call_count(), 1);
    }
}
