use lazy_static::lazy_static;
use std::collections::BTreeMap;

use super::model::{
    Capabilities, Catalog, Connector, Consumer, ModelEntry, Provider, ProviderClass, WireApi,
};

/// A bundled preset a new provider can be seeded from.
pub(crate) struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub class: ProviderClass,
    pub env_key: &'static str,
    pub codex: Option<(&'static str, WireApi)>,
    pub claude_code: Option<&'static str>,
    pub models: &'static [(&'static str, Capabilities)],
}

const FULL: Capabilities = Capabilities {
    reasoning: true,
    tool_use: true,
    vision: true,
    long_context: true,
};

const TOOLS: Capabilities = Capabilities {
    reasoning: false,
    tool_use: true,
    vision: false,
    long_context: true,
};

const REASONING: Capabilities = Capabilities {
    reasoning: true,
    tool_use: true,
    vision: false,
    long_context: true,
};

lazy_static! {
    // Vendors change their model line-ups without notice, so these lists only
    // seed a catalog. Users are expected to edit them after creation.
    pub(crate) static ref TEMPLATES: [Template; 5] = [
        Template {
            id: "openai",
            name: "OpenAI",
            class: ProviderClass::OpenAICompatible,
            env_key: "OPENAI_API_KEY",
            codex: Some(("https://api.openai.com/v1", WireApi::Responses)),
            claude_code: None,
            models: &[("gpt-5", FULL), ("gpt-5-mini", FULL), ("gpt-4.1", TOOLS)],
        },
        Template {
            id: "anthropic",
            name: "Anthropic",
            class: ProviderClass::Anthropic,
            env_key: "ANTHROPIC_API_KEY",
            codex: None,
            claude_code: Some("https://api.anthropic.com"),
            models: &[
                ("claude-sonnet-4-5", FULL),
                ("claude-opus-4-1", FULL),
                ("claude-haiku-4-5", TOOLS),
            ],
        },
        Template {
            id: "deepseek",
            name: "DeepSeek",
            class: ProviderClass::OpenAICompatible,
            env_key: "DEEPSEEK_API_KEY",
            codex: Some(("https://api.deepseek.com/v1", WireApi::Chat)),
            claude_code: Some("https://api.deepseek.com/anthropic"),
            models: &[("deepseek-chat", TOOLS), ("deepseek-reasoner", REASONING)],
        },
        Template {
            id: "moonshot",
            name: "Moonshot",
            class: ProviderClass::OpenAICompatible,
            env_key: "MOONSHOT_API_KEY",
            codex: Some(("https://api.moonshot.ai/v1", WireApi::Chat)),
            claude_code: Some("https://api.moonshot.ai/anthropic"),
            models: &[("kimi-k2-turbo-preview", TOOLS), ("kimi-k2-thinking", REASONING)],
        },
        Template {
            id: "openrouter",
            name: "OpenRouter",
            class: ProviderClass::OpenAICompatible,
            env_key: "OPENROUTER_API_KEY",
            codex: Some(("https://openrouter.ai/api/v1", WireApi::Chat)),
            claude_code: None,
            models: &[("openai/gpt-5", FULL), ("anthropic/claude-sonnet-4.5", FULL)],
        },
    ];
}

pub(crate) fn find(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

impl Template {
    /// Instantiates the template under `id`.
    pub(crate) fn instantiate(&self, id: &str) -> Provider {
        let mut connectors = BTreeMap::new();

        if let Some((base_url, wire_api)) = self.codex {
            connectors.insert(
                Consumer::Codex,
                Connector {
                    wire_api,
                    ..Connector::with_base_url(base_url)
                },
            );
        }

        if let Some(base_url) = self.claude_code {
            connectors.insert(Consumer::ClaudeCode, Connector::with_base_url(base_url));
        }

        Provider {
            id: id.to_string(),
            name: Some(self.name.to_string()),
            class: self.class,
            managed_flag: false,
            env_key_or_token: Some(self.env_key.to_string()),
            connectors,
            catalog: Some(Catalog {
                models: self
                    .models
                    .iter()
                    .map(|(id, capabilities)| ModelEntry {
                        vendor_model_id: id.to_string(),
                        capabilities: *capabilities,
                    })
                    .collect(),
            }),
            recommended: None,
            custom_icon: None,
        }
    }
}
