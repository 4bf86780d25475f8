//! LLM provider clients.
//!
//! One `reqwest::Client` per provider is built at startup and reused for
//! every request. The wire format of each provider lives in its own module
//! as a `ProviderApi` pair of plain functions; `api_for` is the only place
//! that maps a provider to its format.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use arena_core::error::MoveServiceError;
use arena_core::players::{CatalogEntry, Provider};

use crate::config::{Config, ProviderSettings};

/// A single completion request, independent of provider.
#[derive(Debug, Clone)]
pub struct Completion<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
}

pub type BuildFn = fn(&Client, &str, &str, &Completion<'_>) -> RequestBuilder;
pub type ParseFn = fn(&Value) -> Option<String>;

/// Request builder and response parser for one wire format.
#[derive(Clone, Copy)]
pub struct ProviderApi {
    pub build: BuildFn,
    pub parse: ParseFn,
}

pub fn api_for(provider: Provider) -> ProviderApi {
    match provider {
        Provider::OpenAi | Provider::Xai | Provider::DeepSeek | Provider::Moonshot => openai::API,
        Provider::Anthropic => anthropic::API,
        Provider::Gemini => gemini::API,
    }
}

struct ProviderClient {
    client: Client,
    settings: ProviderSettings,
}

/// Process-wide registry of provider clients.
pub struct LlmClients {
    providers: HashMap<Provider, ProviderClient>,
}

impl LlmClients {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut providers = HashMap::new();
        for provider in Provider::ALL {
            let client = Client::builder()
                .user_agent("LlmChessArena/1.0")
                .timeout(Duration::from_secs(config.llm_timeout_secs))
                .build()?;
            let settings = config.provider(provider).clone();
            if settings.api_key.is_none() {
                tracing::info!("{} API key not set - its players will move randomly", provider.label());
            }
            providers.insert(provider, ProviderClient { client, settings });
        }
        Ok(Self { providers })
    }

    /// Send one completion to the entry's provider and return the reply text.
    pub async fn complete(
        &self,
        entry: &CatalogEntry,
        system: &str,
        prompt: &str,
    ) -> Result<String, MoveServiceError> {
        let label = entry.backend.label();
        let provider = self
            .providers
            .get(&entry.backend)
            .ok_or(MoveServiceError::MissingApiKey(label))?;
        let api_key = provider
            .settings
            .api_key
            .as_deref()
            .ok_or(MoveServiceError::MissingApiKey(label))?;

        let api = api_for(entry.backend);
        let completion = Completion {
            model: entry.model,
            system,
            prompt,
        };
        let resp = (api.build)(&provider.client, &provider.settings.base_url, api_key, &completion)
            .send()
            .await
            .map_err(|e| MoveServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MoveServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| MoveServiceError::Response(format!("Body parse error: {e}")))?;
        (api.parse)(&body)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| MoveServiceError::Response(format!("No text in {label} reply")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a request and return (url, headers, json body).
    pub(crate) fn inspect(
        api: ProviderApi,
        model: &str,
    ) -> (reqwest::Url, reqwest::header::HeaderMap, Value) {
        let client = Client::new();
        let completion = Completion {
            model,
            system: "system text",
            prompt: "user text",
        };
        let request = (api.build)(&client, "http://llm.test/v1", "secret", &completion)
            .build()
            .unwrap();
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| serde_json::from_slice(b).unwrap())
            .unwrap_or(Value::Null);
        (request.url().clone(), request.headers().clone(), body)
    }

    #[test]
    fn test_dispatch_table_covers_catalog() {
        for entry in arena_core::players::LLM_PLAYERS {
            let (url, _, _) = inspect(api_for(entry.backend), entry.model);
            assert!(url.as_str().starts_with("http://llm.test/v1/"));
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let mut config = Config::with_stub_backend("http://127.0.0.1:9");
        config.anthropic.api_key = None;
        let clients = LlmClients::new(&config).unwrap();
        let entry = arena_core::players::lookup("claude-3.5-sonnet").unwrap();
        let err = clients.complete(entry, "s", "p").await.unwrap_err();
        assert_eq!(err, MoveServiceError::MissingApiKey("Anthropic"));
    }
}
