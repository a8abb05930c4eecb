//! Keeps a consumer's `(provider, model)` selection consistent while the
//! provider list, the catalogs and the model overrides change underneath it.
//!
//! Catalog answers are eventually consistent: a provider may have been
//! deleted while its id was still bound, or its catalog may not have been
//! loaded yet. [`normalize`] tolerates both. An unknown provider collapses to
//! no selection, and an empty model list leaves the model untouched so that
//! the next reload can settle it.
//!
//! Normalization is idempotent. Running it again on its own output changes
//! nothing, which is what allows it to be triggered freely from events.

pub(crate) mod queue;
pub(crate) mod registry_catalog;

use tracing::debug;

use crate::registry::catalog::{effective_models, resolve_default_model, ModelOverrides};
use crate::registry::Consumer;

/// The collaborator that knows which providers and models currently exist.
pub(crate) trait CatalogService {
    /// Catalog model ids of a provider, in display order.
    fn models(&self, provider_id: &str) -> Vec<String>;

    fn is_provider_available(&self, provider_id: &str) -> bool;

    /// A short explanation of why a provider is unavailable.
    fn availability_hint(&self, provider_id: &str) -> Option<String>;

    /// Maps a raw id to a known provider id. Stale or unknown ids become
    /// `None`.
    fn normalize_provider_id(&self, raw: Option<&str>) -> Option<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NormalizeOutcome {
    pub provider_id: Option<String>,
    pub model_id: Option<String>,
    pub provider_changed: bool,
}

/// Reconciles a selection against the catalog.
///
/// Switching providers always clears the model: a model id from one vendor
/// must never be carried over to another.
pub(crate) fn normalize<C: CatalogService + ?Sized>(
    catalog: &C,
    overrides: Option<&[String]>,
    raw_provider_id: Option<&str>,
    last_known_provider_id: Option<&str>,
    current_model_id: Option<&str>,
) -> NormalizeOutcome {
    let provider_id = catalog.normalize_provider_id(raw_provider_id);

    let provider_changed = match last_known_provider_id {
        Some(last) => provider_id.as_deref() != Some(last),
        None => false,
    };

    let provider = match &provider_id {
        Some(provider) => provider,
        None => {
            return NormalizeOutcome {
                provider_id: None,
                model_id: None,
                provider_changed,
            }
        }
    };

    if provider_changed {
        return NormalizeOutcome {
            provider_id,
            model_id: None,
            provider_changed,
        };
    }

    let models = effective_models(&catalog.models(provider), overrides);

    let model_id = if models.is_empty() {
        current_model_id.map(|m| m.to_string())
    } else {
        current_model_id
            .filter(|m| models.iter().any(|id| id == m))
            .map(|m| m.to_string())
    };

    NormalizeOutcome {
        provider_id,
        model_id,
        provider_changed,
    }
}

/// Selection held for one consumer between normalization passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectionState {
    consumer: Consumer,
    provider_id: Option<String>,
    model_id: Option<String>,
    last_known_provider_id: Option<String>,
    hint: Option<String>,
}

impl SelectionState {
    pub(crate) fn new(consumer: Consumer) -> SelectionState {
        SelectionState {
            consumer,
            provider_id: None,
            model_id: None,
            last_known_provider_id: None,
            hint: None,
        }
    }

    /// Restores a previously persisted selection. The provider counts as
    /// already known so that loading does not look like a switch.
    pub(crate) fn restore(
        consumer: Consumer,
        provider_id: Option<&str>,
        model_id: Option<&str>,
    ) -> SelectionState {
        SelectionState {
            provider_id: provider_id.map(|s| s.to_string()),
            model_id: model_id.map(|s| s.to_string()),
            last_known_provider_id: provider_id.map(|s| s.to_string()),
            ..SelectionState::new(consumer)
        }
    }

    pub(crate) fn consumer(&self) -> Consumer {
        self.consumer
    }

    pub(crate) fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    pub(crate) fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub(crate) fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Records raw user input. Nothing is validated until the next
    /// [`SelectionState::normalize`].
    pub(crate) fn select(&mut self, provider_id: Option<String>, model_id: Option<String>) {
        self.provider_id = provider_id;
        self.model_id = model_id;
    }

    pub(crate) fn normalize<C: CatalogService + ?Sized>(
        &mut self,
        catalog: &C,
        overrides: &ModelOverrides,
    ) -> NormalizeOutcome {
        let override_models = self
            .provider_id
            .as_deref()
            .and_then(|id| catalog.normalize_provider_id(Some(id)))
            .and_then(|id| overrides.get(self.consumer, &id).map(|m| m.to_vec()));

        let outcome = normalize(
            catalog,
            override_models.as_deref(),
            self.provider_id.as_deref(),
            self.last_known_provider_id.as_deref(),
            self.model_id.as_deref(),
        );

        if outcome.provider_id != self.provider_id || outcome.model_id != self.model_id {
            debug!(
                consumer = %self.consumer,
                provider = ?outcome.provider_id,
                model = ?outcome.model_id,
                provider_changed = outcome.provider_changed,
                "selection normalized"
            );
        }

        self.provider_id = outcome.provider_id.clone();
        self.model_id = outcome.model_id.clone();
        self.last_known_provider_id = outcome.provider_id.clone();
        self.hint = match &outcome.provider_id {
            Some(id) if !catalog.is_provider_available(id) => catalog.availability_hint(id),
            _ => None,
        };

        outcome
    }

    /// Picks a model when none is selected, preferring `preferred` (usually
    /// the provider's recommended default).
    pub(crate) fn seed_model<C: CatalogService + ?Sized>(
        &mut self,
        catalog: &C,
        overrides: &ModelOverrides,
        preferred: Option<&str>,
    ) -> Option<&str> {
        if self.model_id.is_none() {
            if let Some(provider) = self.provider_id.as_deref() {
                let models =
                    effective_models(&catalog.models(provider), overrides.get(self.consumer, provider));

                self.model_id = resolve_default_model(&models, preferred);
            }
        }

        self.model_id.as_deref()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// A catalog service answering from a fixed table.
    #[derive(Default)]
    pub(crate) struct StubCatalog {
        pub providers: BTreeMap<String, Vec<String>>,
    }

    impl StubCatalog {
        pub(crate) fn with(entries: &[(&str, &[&str])]) -> StubCatalog {
            StubCatalog {
                providers: entries
                    .iter()
                    .map(|(id, models)| {
                        (id.to_string(), models.iter().map(|m| m.to_string()).collect())
                    })
                    .collect(),
            }
        }
    }

    impl CatalogService for StubCatalog {
        fn models(&self, provider_id: &str) -> Vec<String> {
            self.providers.get(provider_id).cloned().unwrap_or_default()
        }

        fn is_provider_available(&self, provider_id: &str) -> bool {
            !self.models(provider_id).is_empty()
        }

        fn availability_hint(&self, provider_id: &str) -> Option<String> {
            Some(format!("{provider_id} has not loaded its models yet"))
        }

        fn normalize_provider_id(&self, raw: Option<&str>) -> Option<String> {
            raw.filter(|id| self.providers.contains_key(*id))
                .map(|id| id.to_string())
        }
    }

    #[test]
    fn test_unknown_provider_clears_everything() {
        let catalog = StubCatalog::with(&[("a", &["m"])]);

        let outcome = normalize(&catalog, None, Some("ghost"), None, Some("m"));

        assert_eq!(outcome, NormalizeOutcome::default());
    }

    #[test]
    fn test_provider_switch_clears_model() {
        let catalog = StubCatalog::with(&[("a", &["m"]), ("b", &["m", "n"])]);

        // "m" is a member of b's catalog and is still cleared.
        let outcome = normalize(&catalog, None, Some("b"), Some("a"), Some("m"));

        assert_eq!(outcome.provider_id.as_deref(), Some("b"));
        assert_eq!(outcome.model_id, None);
        assert!(outcome.provider_changed);
    }

    #[test]
    fn test_deleted_provider_counts_as_change() {
        let catalog = StubCatalog::with(&[]);

        let outcome = normalize(&catalog, None, Some("a"), Some("a"), Some("m"));

        assert_eq!(outcome.provider_id, None);
        assert_eq!(outcome.model_id, None);
        assert!(outcome.provider_changed);
    }

    #[test]
    fn test_empty_catalog_keeps_model() {
        let catalog = StubCatalog::with(&[("a", &[])]);

        let outcome = normalize(&catalog, None, Some("a"), Some("a"), Some("pending"));

        assert_eq!(outcome.model_id.as_deref(), Some("pending"));
        assert!(!outcome.provider_changed);
    }

    #[test]
    fn test_membership() {
        let catalog = StubCatalog::with(&[("a", &["m", "n"])]);

        let kept = normalize(&catalog, None, Some("a"), None, Some("n"));
        assert_eq!(kept.model_id.as_deref(), Some("n"));

        let dropped = normalize(&catalog, None, Some("a"), None, Some("x"));
        assert_eq!(dropped.model_id, None);
    }

    #[test]
    fn test_override_restricts_membership() {
        let catalog = StubCatalog::with(&[("a", &["m", "n"])]);
        let over = vec!["x".to_string()];

        let outcome = normalize(&catalog, Some(&over), Some("a"), None, Some("m"));
        assert_eq!(outcome.model_id, None);

        let outcome = normalize(&catalog, Some(&over), Some("a"), None, Some("x"));
        assert_eq!(outcome.model_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let catalog = StubCatalog::with(&[("a", &["m", "n"]), ("b", &[]), ("c", &["z"])]);
        let overrides = ModelOverrides::default();

        let providers = [None, Some("a"), Some("b"), Some("c"), Some("ghost")];
        let models = [None, Some("m"), Some("z"), Some("q")];

        for last in providers {
            for raw in providers {
                for model in models {
                    let mut state = SelectionState::restore(Consumer::Codex, last, None);
                    state.select(raw.map(String::from), model.map(String::from));

                    state.normalize(&catalog, &overrides);
                    let once = state.clone();

                    let outcome = state.normalize(&catalog, &overrides);

                    assert_eq!(state, once, "last={last:?} raw={raw:?} model={model:?}");
                    assert!(!outcome.provider_changed);
                }
            }
        }
    }

    #[test]
    fn test_state_uses_consumer_overrides() {
        let catalog = StubCatalog::with(&[("a", &["m", "n"])]);
        let mut overrides = ModelOverrides::default();
        overrides.set(Consumer::ClaudeCode, "a", vec!["n".to_string()]);

        let mut codex = SelectionState::restore(Consumer::Codex, Some("a"), Some("m"));
        let mut claude = SelectionState::restore(Consumer::ClaudeCode, Some("a"), Some("m"));

        codex.normalize(&catalog, &overrides);
        claude.normalize(&catalog, &overrides);

        assert_eq!(codex.model_id(), Some("m"));
        assert_eq!(claude.model_id(), None);
    }

    #[test]
    fn test_hint_for_unavailable_provider() {
        let catalog = StubCatalog::with(&[("a", &[])]);
        let mut state = SelectionState::restore(Consumer::Codex, Some("a"), None);

        state.normalize(&catalog, &ModelOverrides::default());

        assert_eq!(state.hint(), Some("a has not loaded its models yet"));
    }

    #[test]
    fn test_seed_model() {
        let catalog = StubCatalog::with(&[("a", &["m", "n"])]);
        let overrides = ModelOverrides::default();

        let mut state = SelectionState::restore(Consumer::Codex, Some("a"), None);
        assert_eq!(state.seed_model(&catalog, &overrides, Some("n")), Some("n"));

        let mut state = SelectionState::restore(Consumer::Codex, Some("a"), None);
        assert_eq!(state.seed_model(&catalog, &overrides, Some("gone")), Some("m"));

        let mut state = SelectionState::restore(Consumer::Codex, Some("a"), Some("x"));
        assert_eq!(state.seed_model(&catalog, &overrides, None), Some("x"));
    }
}
