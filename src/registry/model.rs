//! Record types for the persisted registry document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A downstream CLI tool that reads the resolved provider and model.
///
/// The `to_string` and `FromStr` forms are part of the CLI and of the
/// persisted document, so they should remain stable.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub(crate) enum Consumer {
    #[strum(serialize = "codex")]
    Codex,
    #[strum(to_string = "claudeCode", serialize = "claude-code", serialize = "claude")]
    ClaudeCode,
}

/// The protocol family a provider speaks.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub(crate) enum ProviderClass {
    #[default]
    #[serde(rename = "openai-compatible")]
    #[strum(to_string = "openai-compatible", serialize = "openai")]
    OpenAICompatible,
    #[serde(rename = "anthropic")]
    #[strum(serialize = "anthropic")]
    Anthropic,
}

/// Request/response shape expected by an OpenAI-compatible connector.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum WireApi {
    #[default]
    Chat,
    Responses,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Capabilities {
    pub reasoning: bool,
    pub tool_use: bool,
    pub vision: bool,
    pub long_context: bool,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelEntry {
    /// Identifier sent to the vendor API. Never empty once persisted.
    pub vendor_model_id: String,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl ModelEntry {
    pub(crate) fn new(vendor_model_id: &str) -> ModelEntry {
        ModelEntry {
            vendor_model_id: vendor_model_id.to_string(),
            capabilities: Capabilities::default(),
        }
    }
}

/// The models a provider exposes. Insertion order is display order.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub(crate) struct Catalog {
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl Catalog {
    pub(crate) fn model_ids(&self) -> Vec<String> {
        self.models
            .iter()
            .map(|m| m.vendor_model_id.clone())
            .collect()
    }

    pub(crate) fn contains(&self, model_id: &str) -> bool {
        self.models.iter().any(|m| m.vendor_model_id == model_id)
    }

    /// Trims ids, then drops entries with an empty id and later duplicates,
    /// keeping order.
    pub(crate) fn dedup(&mut self) {
        let mut seen = std::collections::HashSet::new();

        for model in self.models.iter_mut() {
            let trimmed = model.vendor_model_id.trim();

            if trimmed.len() != model.vendor_model_id.len() {
                model.vendor_model_id = trimmed.to_string();
            }
        }

        self.models
            .retain(|m| !m.vendor_model_id.is_empty() && seen.insert(m.vendor_model_id.clone()));
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Recommended {
    #[serde(default)]
    pub default_model_for: BTreeMap<Consumer, String>,
}

/// Consumer-specific connection details for one provider.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub(crate) struct Connector {
    #[serde(rename = "baseURL", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "wireAPI", default)]
    pub wire_api: WireApi,
    #[serde(
        rename = "envKeyOrToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub env_key_or_token: Option<String>,
    #[serde(
        rename = "modelAliases",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub model_aliases: BTreeMap<String, String>,
}

impl Connector {
    pub(crate) fn with_base_url(base_url: &str) -> Connector {
        Connector {
            base_url: Some(base_url.to_string()),
            ..Connector::default()
        }
    }

    /// Maps a model id through the connector's alias table.
    pub(crate) fn resolve_model<'a>(&'a self, model_id: &'a str) -> &'a str {
        self.model_aliases
            .get(model_id)
            .map(|s| s.as_str())
            .unwrap_or(model_id)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Provider {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub class: ProviderClass,
    #[serde(default)]
    pub managed_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_key_or_token: Option<String>,
    #[serde(default)]
    pub connectors: BTreeMap<Consumer, Connector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Catalog>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<Recommended>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
}

impl Provider {
    pub(crate) fn blank(id: &str, class: ProviderClass) -> Provider {
        Provider {
            id: id.to_string(),
            class,
            ..Provider::default()
        }
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub(crate) fn model_ids(&self) -> Vec<String> {
        self.catalog
            .as_ref()
            .map(|c| c.model_ids())
            .unwrap_or_default()
    }

    pub(crate) fn recommended_default(&self, consumer: Consumer) -> Option<&str> {
        self.recommended
            .as_ref()
            .and_then(|r| r.default_model_for.get(&consumer))
            .map(|s| s.as_str())
    }

    /// The credential field to probe with: the provider-level value wins.
    pub(crate) fn effective_credential_field(&self, consumer: Consumer) -> Option<&str> {
        non_empty(self.env_key_or_token.as_deref()).or_else(|| {
            self.connectors
                .get(&consumer)
                .and_then(|c| non_empty(c.env_key_or_token.as_deref()))
        })
    }

    /// Clears connector-level credentials shadowed by a provider-level one.
    pub(crate) fn normalize_credentials(&mut self) {
        if non_empty(self.env_key_or_token.as_deref()).is_none() {
            self.env_key_or_token = None;
            return;
        }

        for connector in self.connectors.values_mut() {
            connector.env_key_or_token = None;
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Process-wide record of the active provider and model per consumer.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Bindings {
    #[serde(default)]
    pub active_provider: BTreeMap<Consumer, String>,
    #[serde(default)]
    pub default_model: BTreeMap<Consumer, String>,
}

impl Bindings {
    pub(crate) fn active_provider(&self, consumer: Consumer) -> Option<&str> {
        self.active_provider.get(&consumer).map(|s| s.as_str())
    }

    pub(crate) fn default_model(&self, consumer: Consumer) -> Option<&str> {
        self.default_model.get(&consumer).map(|s| s.as_str())
    }

    /// Removes every binding that references `provider_id`. Returns the
    /// consumers that lost their active provider.
    pub(crate) fn release_provider(&mut self, provider_id: &str) -> Vec<Consumer> {
        let released: Vec<Consumer> = self
            .active_provider
            .iter()
            .filter(|(_, id)| id.as_str() == provider_id)
            .map(|(consumer, _)| *consumer)
            .collect();

        for consumer in &released {
            self.active_provider.remove(consumer);
            self.default_model.remove(consumer);
        }

        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_consumer_forms() {
        assert_eq!(Consumer::ClaudeCode.to_string(), "claudeCode");
        assert_eq!(Consumer::from_str("claude-code").unwrap(), Consumer::ClaudeCode);
        assert_eq!(Consumer::from_str("codex").unwrap(), Consumer::Codex);
        assert!(Consumer::from_str("gemini").is_err());

        assert_eq!(
            serde_json::to_string(&Consumer::ClaudeCode).unwrap(),
            "\"claudeCode\""
        );
    }

    #[test]
    fn test_provider_document_shape() {
        let mut provider = Provider::blank("gw", ProviderClass::Anthropic);
        provider
            .connectors
            .insert(Consumer::ClaudeCode, Connector::with_base_url("https://gw.example.com"));

        let value = serde_json::to_value(&provider).unwrap();

        assert_eq!(value["class"], "anthropic");
        assert_eq!(value["managedFlag"], false);
        assert_eq!(
            value["connectors"]["claudeCode"]["baseURL"],
            "https://gw.example.com"
        );
        assert_eq!(value["connectors"]["claudeCode"]["wireAPI"], "chat");
        assert!(value.get("catalog").is_none());
    }

    #[test]
    fn test_provider_credential_wins() {
        let mut provider = Provider::blank("p", ProviderClass::OpenAICompatible);
        provider.env_key_or_token = Some("OPENAI_API_KEY".to_string());

        let mut connector = Connector::with_base_url("https://api.example.com");
        connector.env_key_or_token = Some("OTHER_KEY".to_string());
        provider.connectors.insert(Consumer::Codex, connector);

        assert_eq!(
            provider.effective_credential_field(Consumer::Codex),
            Some("OPENAI_API_KEY")
        );

        provider.normalize_credentials();

        assert_eq!(provider.connectors[&Consumer::Codex].env_key_or_token, None);
    }

    #[test]
    fn test_connector_credential_kept_without_provider_value() {
        let mut provider = Provider::blank("p", ProviderClass::OpenAICompatible);
        provider.env_key_or_token = Some("  ".to_string());

        let mut connector = Connector::default();
        connector.env_key_or_token = Some("CODEX_KEY".to_string());
        provider.connectors.insert(Consumer::Codex, connector);

        provider.normalize_credentials();

        assert_eq!(provider.env_key_or_token, None);
        assert_eq!(
            provider.effective_credential_field(Consumer::Codex),
            Some("CODEX_KEY")
        );
    }

    #[test]
    fn test_catalog_dedup() {
        let mut catalog = Catalog {
            models: vec![
                ModelEntry::new("a"),
                ModelEntry::new(""),
                ModelEntry::new(" b "),
                ModelEntry::new("a"),
                ModelEntry::new("b"),
            ],
        };

        catalog.dedup();

        assert_eq!(catalog.model_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_model_aliases() {
        let mut connector = Connector::default();
        connector
            .model_aliases
            .insert("sonnet".to_string(), "claude-sonnet-4-5".to_string());

        assert_eq!(connector.resolve_model("sonnet"), "claude-sonnet-4-5");
        assert_eq!(connector.resolve_model("opus"), "opus");
    }

    #[test]
    fn test_release_provider() {
        let mut bindings = Bindings::default();
        bindings.active_provider.insert(Consumer::Codex, "a".to_string());
        bindings.default_model.insert(Consumer::Codex, "m".to_string());
        bindings
            .active_provider
            .insert(Consumer::ClaudeCode, "b".to_string());

        assert_eq!(bindings.release_provider("a"), vec![Consumer::Codex]);
        assert_eq!(bindings.active_provider(Consumer::Codex), None);
        assert_eq!(bindings.default_model(Consumer::Codex), None);
        assert_eq!(bindings.active_provider(Consumer::ClaudeCode), Some("b"));
    }
}
