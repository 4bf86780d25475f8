use std::env;

use arena_core::players::Provider;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const XAI_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const KIMI_BASE_URL: &str = "https://api.moonshot.cn/v1";

/// Endpoint and credential for one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub gemini: ProviderSettings,
    pub xai: ProviderSettings,
    pub deepseek: ProviderSettings,
    pub kimi: ProviderSettings,
    pub llm_timeout_secs: u64,
    pub ai_move_delay_ms: u64,
}

fn provider(key_var: &str, url_var: &str, default_url: &str) -> ProviderSettings {
    ProviderSettings {
        api_key: env::var(key_var).ok().filter(|k| !k.trim().is_empty()),
        base_url: env::var(url_var)
            .unwrap_or_else(|_| default_url.to_string())
            .trim_end_matches('/')
            .to_string(),
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            openai: provider("OPENAI_API_KEY", "OPENAI_BASE_URL", OPENAI_BASE_URL),
            anthropic: provider("ANTHROPIC_API_KEY", "ANTHROPIC_BASE_URL", ANTHROPIC_BASE_URL),
            gemini: provider("GEMINI_API_KEY", "GEMINI_BASE_URL", GEMINI_BASE_URL),
            xai: provider("XAI_API_KEY", "XAI_BASE_URL", XAI_BASE_URL),
            deepseek: provider("DEEPSEEK_API_KEY", "DEEPSEEK_BASE_URL", DEEPSEEK_BASE_URL),
            kimi: provider("KIMI_API_KEY", "KIMI_BASE_URL", KIMI_BASE_URL),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            ai_move_delay_ms: env::var("AI_MOVE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
        }
    }

    pub fn provider(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Gemini => &self.gemini,
            Provider::Xai => &self.xai,
            Provider::DeepSeek => &self.deepseek,
            Provider::Moonshot => &self.kimi,
        }
    }

    /// Every provider pointed at `base_url` with a dummy key. Used by tests.
    pub fn with_stub_backend(base_url: &str) -> Self {
        let stub = ProviderSettings {
            api_key: Some("test-key".to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            openai: stub.clone(),
            anthropic: stub.clone(),
            gemini: stub.clone(),
            xai: stub.clone(),
            deepseek: stub.clone(),
            kimi: stub,
            llm_timeout_secs: 5,
            ai_move_delay_ms: 0,
        }
    }
}
