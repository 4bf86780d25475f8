//! Player catalog: the fixed set of LLM backends plus the human entry.

use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

pub const HUMAN_PLAYER_ID: &str = "human";

/// Upstream API family used to reach a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    Xai,
    DeepSeek,
    Moonshot,
}

impl Provider {
    pub const ALL: [Provider; 6] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::Xai,
        Provider::DeepSeek,
        Provider::Moonshot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Google",
            Provider::Xai => "xAI",
            Provider::DeepSeek => "DeepSeek",
            Provider::Moonshot => "Moonshot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    #[serde(skip)]
    pub backend: Provider,
    #[serde(skip)]
    pub model: &'static str,
}

pub const LLM_PLAYERS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "gpt-4o",
        name: "GPT-4o",
        provider: "OpenAI",
        backend: Provider::OpenAi,
        model: "gpt-4o",
    },
    CatalogEntry {
        id: "gemini-2.5-pro",
        name: "Gemini 2.5 Pro",
        provider: "Google",
        backend: Provider::Gemini,
        model: "gemini-2.5-pro",
    },
    CatalogEntry {
        id: "claude-3.5-sonnet",
        name: "Claude 3.5 Sonnet",
        provider: "Anthropic",
        backend: Provider::Anthropic,
        model: "claude-3-5-sonnet-20241022",
    },
    CatalogEntry {
        id: "grok-4",
        name: "Grok 4",
        provider: "xAI",
        backend: Provider::Xai,
        model: "grok-2-1212",
    },
    CatalogEntry {
        id: "gpt-5",
        name: "GPT-5",
        provider: "OpenAI",
        backend: Provider::OpenAi,
        model: "gpt-5",
    },
    CatalogEntry {
        id: "kimi-k2",
        name: "Kimi K2",
        provider: "Moonshot",
        backend: Provider::Moonshot,
        model: "moonshot-v1-8k",
    },
    CatalogEntry {
        id: "deepseek-v3",
        name: "DeepSeek-V3",
        provider: "DeepSeek",
        backend: Provider::DeepSeek,
        model: "deepseek-chat",
    },
];

pub fn lookup(id: &str) -> Option<&'static CatalogEntry> {
    LLM_PLAYERS.iter().find(|p| p.id == id)
}

/// Who controls one side of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayerIdentity {
    Human { name: String },
    Ai { id: &'static str, name: &'static str },
}

impl PlayerIdentity {
    /// Resolve a selection: `"human"` with a name, or a catalog id.
    pub fn resolve(id: &str, human_name: Option<&str>) -> Result<Self, ArenaError> {
        if id == HUMAN_PLAYER_ID {
            let name = human_name.map(str::trim).unwrap_or_default();
            if name.is_empty() {
                return Err(ArenaError::MissingHumanName);
            }
            return Ok(PlayerIdentity::Human {
                name: name.to_string(),
            });
        }
        let entry = lookup(id).ok_or_else(|| ArenaError::UnknownPlayer(id.to_string()))?;
        Ok(PlayerIdentity::Ai {
            id: entry.id,
            name: entry.name,
        })
    }

    pub fn display_name(&self) -> &str {
        match self {
            PlayerIdentity::Human { name } => name.as_str(),
            PlayerIdentity::Ai { name, .. } => *name,
        }
    }

    pub fn ai_id(&self) -> Option<&'static str> {
        match self {
            PlayerIdentity::Ai { id, .. } => Some(*id),
            PlayerIdentity::Human { .. } => None,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, PlayerIdentity::Human { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in LLM_PLAYERS.iter().enumerate() {
            assert!(LLM_PLAYERS[i + 1..].iter().all(|b| b.id != a.id));
            assert_eq!(a.provider, a.backend.label());
        }
    }

    #[test]
    fn test_resolve_ai_player() {
        let player = PlayerIdentity::resolve("claude-3.5-sonnet", None).unwrap();
        assert_eq!(player.display_name(), "Claude 3.5 Sonnet");
        assert_eq!(player.ai_id(), Some("claude-3.5-sonnet"));
        assert!(!player.is_human());
    }

    #[test]
    fn test_resolve_human_requires_name() {
        assert_eq!(
            PlayerIdentity::resolve("human", Some("  ")),
            Err(ArenaError::MissingHumanName)
        );
        let player = PlayerIdentity::resolve("human", Some(" Magnus ")).unwrap();
        assert_eq!(player.display_name(), "Magnus");
        assert!(player.is_human());
    }

    #[test]
    fn test_resolve_unknown_player() {
        assert_eq!(
            PlayerIdentity::resolve("gpt-2", None),
            Err(ArenaError::UnknownPlayer("gpt-2".to_string()))
        );
    }
}
