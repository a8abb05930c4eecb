//! Effective model lists and default model resolution.
//!
//! Nothing here touches the network or the disk. The same
//! [`resolve_default_model`] rule is used when a provider is saved (to
//! recompute its recommended defaults) and when a selection is seeded, so the
//! two paths cannot disagree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use super::model::{Consumer, Provider, Recommended};

/// Keeps `current_default` when it is still a candidate, otherwise falls back
/// to the first candidate.
pub(crate) fn resolve_default_model<S: AsRef<str>>(
    candidate_model_ids: &[S],
    current_default: Option<&str>,
) -> Option<String> {
    if let Some(current) = current_default.filter(|c| !c.is_empty()) {
        if candidate_model_ids.iter().any(|id| id.as_ref() == current) {
            return Some(current.to_string());
        }
    }

    candidate_model_ids.first().map(|id| id.as_ref().to_string())
}

/// Per-consumer model allow-lists keyed by provider id. An override replaces
/// the catalog for display and selection only; the catalog itself is never
/// modified.
#[derive(Debug, Default, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ModelOverrides {
    by_consumer: BTreeMap<Consumer, BTreeMap<String, Vec<String>>>,
}

impl ModelOverrides {
    pub(crate) fn get(&self, consumer: Consumer, provider_id: &str) -> Option<&[String]> {
        self.by_consumer
            .get(&consumer)
            .and_then(|m| m.get(provider_id))
            .map(|v| v.as_slice())
    }

    pub(crate) fn set(&mut self, consumer: Consumer, provider_id: &str, models: Vec<String>) {
        let models: Vec<String> = models
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        if models.is_empty() {
            self.clear(consumer, provider_id);
            return;
        }

        self.by_consumer
            .entry(consumer)
            .or_default()
            .insert(provider_id.to_string(), models);
    }

    pub(crate) fn clear(&mut self, consumer: Consumer, provider_id: &str) -> bool {
        let removed = match self.by_consumer.get_mut(&consumer) {
            Some(map) => map.remove(provider_id).is_some(),
            None => false,
        };

        self.by_consumer.retain(|_, map| !map.is_empty());

        removed
    }

    pub(crate) fn remove_provider(&mut self, provider_id: &str) {
        for consumer in Consumer::iter() {
            self.clear(consumer, provider_id);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_consumer.is_empty()
    }
}

/// The override list when it is non-empty, otherwise the catalog order.
pub(crate) fn effective_models(
    catalog_models: &[String],
    override_models: Option<&[String]>,
) -> Vec<String> {
    match override_models {
        Some(models) if !models.is_empty() => models.to_vec(),
        _ => catalog_models.to_vec(),
    }
}

/// Effective models for one provider as seen by one consumer.
pub(crate) fn effective_models_for(
    provider: &Provider,
    consumer: Consumer,
    overrides: &ModelOverrides,
) -> Vec<String> {
    effective_models(&provider.model_ids(), overrides.get(consumer, &provider.id))
}

/// Recomputes `recommended.default_model_for` against the current catalog.
/// Consumers without a connector and empty catalogs lose their entry.
pub(crate) fn recompute_recommended(provider: &mut Provider) {
    let candidates = provider.model_ids();
    let previous = provider.recommended.take().unwrap_or_default();

    let mut recommended = Recommended::default();

    for consumer in provider.connectors.keys() {
        let current = previous.default_model_for.get(consumer).map(|s| s.as_str());

        if let Some(model) = resolve_default_model(&candidates, current) {
            recommended.default_model_for.insert(*consumer, model);
        }
    }

    provider.recommended = if recommended.default_model_for.is_empty() {
        None
    } else {
        Some(recommended)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::model::{Catalog, Connector, ModelEntry, ProviderClass};

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_stable() {
        let candidates = ids(&["a", "b", "c"]);

        for current in &candidates {
            assert_eq!(
                resolve_default_model(&candidates, Some(current)).as_deref(),
                Some(current.as_str())
            );
        }
    }

    #[test]
    fn test_default_falls_back_to_first() {
        let candidates = ids(&["a", "b"]);

        assert_eq!(resolve_default_model(&candidates, None).as_deref(), Some("a"));
        assert_eq!(resolve_default_model(&candidates, Some("")).as_deref(), Some("a"));
        assert_eq!(
            resolve_default_model(&candidates, Some("gone")).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_default_of_nothing() {
        let candidates: Vec<String> = Vec::new();

        assert_eq!(resolve_default_model(&candidates, Some("a")), None);
        assert_eq!(resolve_default_model(&candidates, None), None);
    }

    #[test]
    fn test_effective_models_prefers_override() {
        let catalog = ids(&["a", "b", "c"]);
        let over = ids(&["z"]);

        assert_eq!(effective_models(&catalog, Some(&over)), over);
        assert_eq!(effective_models(&catalog, Some(&[])), catalog);
        assert_eq!(effective_models(&catalog, None), catalog);
    }

    #[test]
    fn test_overrides_set_and_clear() {
        let mut overrides = ModelOverrides::default();

        overrides.set(Consumer::Codex, "p", ids(&[" a ", "", "b"]));
        assert_eq!(overrides.get(Consumer::Codex, "p"), Some(&ids(&["a", "b"])[..]));
        assert_eq!(overrides.get(Consumer::ClaudeCode, "p"), None);

        overrides.set(Consumer::Codex, "p", ids(&["", " "]));
        assert_eq!(overrides.get(Consumer::Codex, "p"), None);
        assert!(overrides.is_empty());

        overrides.set(Consumer::Codex, "p", ids(&["a"]));
        overrides.set(Consumer::ClaudeCode, "p", ids(&["b"]));
        overrides.remove_provider("p");
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_overrides_document_shape() {
        let mut overrides = ModelOverrides::default();
        overrides.set(Consumer::ClaudeCode, "gw", ids(&["m"]));

        let value = serde_json::to_value(&overrides).unwrap();

        assert_eq!(value["claudeCode"]["gw"][0], "m");
    }

    #[test]
    fn test_recompute_recommended() {
        let mut provider = Provider::blank("p", ProviderClass::OpenAICompatible);
        provider.connectors.insert(Consumer::Codex, Connector::default());
        provider.catalog = Some(Catalog {
            models: vec![ModelEntry::new("a"), ModelEntry::new("b")],
        });

        recompute_recommended(&mut provider);
        assert_eq!(provider.recommended_default(Consumer::Codex), Some("a"));
        assert_eq!(provider.recommended_default(Consumer::ClaudeCode), None);

        provider
            .recommended
            .as_mut()
            .unwrap()
            .default_model_for
            .insert(Consumer::Codex, "b".to_string());
        recompute_recommended(&mut provider);
        assert_eq!(provider.recommended_default(Consumer::Codex), Some("b"));

        provider.catalog = Some(Catalog {
            models: vec![ModelEntry::new("c")],
        });
        recompute_recommended(&mut provider);
        assert_eq!(provider.recommended_default(Consumer::Codex), Some("c"));

        provider.catalog = None;
        recompute_recommended(&mut provider);
        assert_eq!(provider.recommended, None);
    }
}
