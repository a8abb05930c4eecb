//! The single writer over the registry.
//!
//! Every mutation goes through `&mut Settings`, is committed to the store,
//! and then enqueues the selection events it implies. The queue is drained
//! against the snapshot visible after the write, changed selections are
//! written back as bindings, and provider switches are handed to the config
//! sync hook.

use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::catalog::{effective_models_for, ModelOverrides};
use crate::registry::id::slug_from_name;
use crate::registry::staging::ModelRowArena;
use crate::registry::{templates, Consumer, Provider, ProviderClass, RegistryStore, StoreError};
use crate::selection::queue::{SelectionEvent, SelectionQueue};
use crate::selection::registry_catalog::RegistryCatalog;
use crate::selection::SelectionState;
use crate::sync::{self, ConfigSync};

#[derive(Error, Debug)]
pub(crate) enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown template \"{0}\"")]
    UnknownTemplate(String),
    #[error("provider \"{0}\" already exists")]
    DuplicateProvider(String),
    #[error("cannot derive a provider id from {0:?}, pass one explicitly")]
    NoId(Option<String>),
}

/// What to create in [`Settings::add_provider`].
#[derive(Debug, Default, Clone)]
pub(crate) struct NewProvider {
    pub id: Option<String>,
    pub name: Option<String>,
    pub template: Option<String>,
    pub class: ProviderClass,
    /// Provider-level environment variable name or token.
    pub key: Option<String>,
}

pub(crate) struct Settings<S: RegistryStore, Y: ConfigSync> {
    store: S,
    sync: Y,
    overrides: ModelOverrides,
    selections: Vec<SelectionState>,
    queue: SelectionQueue,
    last_error: Option<String>,
}

impl<S: RegistryStore, Y: ConfigSync> Settings<S, Y> {
    /// Restores the persisted selections and reconciles them with the
    /// current catalogs. Bindings to providers that no longer exist are
    /// cleared.
    pub(crate) fn load(store: S, sync: Y) -> Result<Settings<S, Y>, SettingsError> {
        let bindings = store.get_bindings();

        let selections = Consumer::iter()
            .map(|consumer| {
                SelectionState::restore(
                    consumer,
                    bindings.active_provider(consumer),
                    bindings.default_model(consumer),
                )
            })
            .collect();

        let mut settings = Settings {
            overrides: store.model_overrides(),
            store,
            sync,
            selections,
            queue: SelectionQueue::new(),
            last_error: None,
        };

        settings.queue.emit(SelectionEvent::CatalogReloaded);
        settings.reconcile()?;

        Ok(settings)
    }

    pub(crate) fn providers(&self) -> Vec<Provider> {
        self.store.list_providers()
    }

    pub(crate) fn provider(&self, id: &str) -> Result<Provider, SettingsError> {
        self.store
            .provider(id)
            .ok_or_else(|| StoreError::ProviderNotFound(id.to_string()).into())
    }

    pub(crate) fn selection(&self, consumer: Consumer) -> Option<&SelectionState> {
        self.selections.iter().find(|s| s.consumer() == consumer)
    }

    /// The most recent failed mutation, as shown to the user.
    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Creates a provider, blank or from a template. Without an explicit id
    /// one is derived from the name, then from the template.
    pub(crate) fn add_provider(&mut self, new: NewProvider) -> Result<Provider, SettingsError> {
        let result = self.build_provider(new);
        let provider = self.record(result)?;

        let result = self.store.upsert_provider(provider);
        let provider = self.record(result)?;

        debug!(provider = %provider.id, "provider added");

        self.queue.emit(SelectionEvent::ProvidersChanged);
        self.reconcile()?;

        Ok(provider)
    }

    fn build_provider(&self, new: NewProvider) -> Result<Provider, SettingsError> {
        let template = match new.template.as_deref() {
            Some(id) => Some(
                templates::find(id).ok_or_else(|| SettingsError::UnknownTemplate(id.to_string()))?,
            ),
            None => None,
        };

        let id = new
            .id
            .clone()
            .or_else(|| new.name.as_deref().and_then(slug_from_name))
            .or_else(|| template.map(|t| t.id.to_string()))
            .ok_or_else(|| SettingsError::NoId(new.name.clone()))?;

        if self.store.provider(&id).is_some() {
            return Err(SettingsError::DuplicateProvider(id));
        }

        let mut provider = match template {
            Some(template) => template.instantiate(&id),
            None => Provider::blank(&id, new.class),
        };

        if new.name.is_some() {
            provider.name = new.name;
        }

        if new.key.is_some() {
            provider.env_key_or_token = new.key;
        }

        Ok(provider)
    }

    /// Replaces an existing provider. Consumers bound to it are re-synced,
    /// since their endpoint or credential may have changed.
    pub(crate) fn update_provider(&mut self, provider: Provider) -> Result<Provider, SettingsError> {
        self.provider(&provider.id)?;

        let result = self.store.upsert_provider(provider);
        let provider = self.record(result)?;

        self.queue.emit(SelectionEvent::CatalogReloaded);
        self.reconcile()?;

        let bindings = self.store.get_bindings();

        for consumer in Consumer::iter() {
            if bindings.active_provider(consumer) == Some(provider.id.as_str()) {
                sync::apply(&mut self.sync, consumer, Some(&provider));
            }
        }

        Ok(provider)
    }

    /// Stages the catalog of a provider for editing.
    pub(crate) fn stage_catalog(&self, id: &str) -> Result<ModelRowArena, SettingsError> {
        let provider = self.provider(id)?;

        Ok(ModelRowArena::from_catalog(provider.catalog.as_ref()))
    }

    /// Saves staged rows as the catalog of a provider. Rows without a model
    /// id are dropped.
    pub(crate) fn save_catalog(
        &mut self,
        id: &str,
        rows: &ModelRowArena,
    ) -> Result<Provider, SettingsError> {
        let mut provider = self.provider(id)?;
        let catalog = rows.materialize();

        provider.catalog = if catalog.models.is_empty() {
            None
        } else {
            Some(catalog)
        };

        self.update_provider(provider)
    }

    /// Deletes a provider along with its bindings and overrides.
    pub(crate) fn remove_provider(&mut self, id: &str) -> Result<Vec<Consumer>, SettingsError> {
        let result = self.store.delete_provider(id);
        let released = self.record(result)?;

        self.overrides.remove_provider(id);
        self.queue.emit(SelectionEvent::ProvidersChanged);
        self.reconcile()?;

        // The store already dropped these bindings, so reconcile sees no
        // provider change for them.
        for consumer in &released {
            sync::apply(&mut self.sync, *consumer, None);
        }

        Ok(released)
    }

    /// Binds a provider and optionally a model to `consumer`.
    ///
    /// The provider switch is applied first, so a model that is not offered
    /// by the new provider is dropped and replaced by its default.
    pub(crate) fn select(
        &mut self,
        consumer: Consumer,
        provider_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<Option<&SelectionState>, SettingsError> {
        let current_model = self
            .selection(consumer)
            .and_then(|s| s.model_id())
            .map(|s| s.to_string());

        self.queue.emit(SelectionEvent::SelectionChanged {
            consumer,
            provider_id: provider_id.map(|s| s.to_string()),
            model_id: current_model,
        });

        if let Some(model_id) = model_id {
            self.queue.emit(SelectionEvent::SelectionChanged {
                consumer,
                provider_id: provider_id.map(|s| s.to_string()),
                model_id: Some(model_id.to_string()),
            });
        }

        self.reconcile()?;

        Ok(self.selection(consumer))
    }

    pub(crate) fn set_override(
        &mut self,
        consumer: Consumer,
        provider_id: &str,
        models: Vec<String>,
    ) -> Result<(), SettingsError> {
        self.provider(provider_id)?;

        let mut overrides = self.overrides.clone();
        overrides.set(consumer, provider_id, models);

        self.commit_overrides(consumer, overrides)
    }

    /// Returns false when there was no override to clear.
    pub(crate) fn clear_override(
        &mut self,
        consumer: Consumer,
        provider_id: &str,
    ) -> Result<bool, SettingsError> {
        let mut overrides = self.overrides.clone();

        if !overrides.clear(consumer, provider_id) {
            return Ok(false);
        }

        self.commit_overrides(consumer, overrides)?;

        Ok(true)
    }

    fn commit_overrides(
        &mut self,
        consumer: Consumer,
        overrides: ModelOverrides,
    ) -> Result<(), SettingsError> {
        let result = self.store.set_model_overrides(overrides.clone());
        self.record(result)?;

        self.overrides = overrides;
        self.queue.emit(SelectionEvent::OverridesChanged { consumer });
        self.reconcile()
    }

    /// Models offered for `consumer` by a provider, after overrides.
    pub(crate) fn effective_models(
        &self,
        consumer: Consumer,
        provider_id: &str,
    ) -> Result<Vec<String>, SettingsError> {
        let provider = self.provider(provider_id)?;

        Ok(effective_models_for(&provider, consumer, &self.overrides))
    }

    /// Drains pending selection events, seeds missing models from the
    /// recommended defaults, and writes every selection that differs from
    /// the stored bindings back. A failed write restores the selections as
    /// they were before the drain, so memory never runs ahead of the store.
    fn reconcile(&mut self) -> Result<(), SettingsError> {
        let providers = self.store.list_providers();
        let snapshot = self.selections.clone();

        let normalized = self.queue.drain(
            &mut self.selections,
            |consumer| RegistryCatalog::new(&providers, consumer),
            &self.overrides,
        );

        if !normalized.is_empty() {
            debug!(?normalized, "selections normalized");
        }

        for state in self.selections.iter_mut() {
            if state.model_id().is_some() {
                continue;
            }

            let consumer = state.consumer();
            let catalog = RegistryCatalog::new(&providers, consumer);
            let preferred = state
                .provider_id()
                .and_then(|id| providers.iter().find(|p| p.id == id))
                .and_then(|p| p.recommended_default(consumer));

            state.seed_model(&catalog, &self.overrides, preferred);
        }

        let stored = self.store.get_bindings();

        let pending: Vec<(Consumer, Option<String>, Option<String>)> = self
            .selections
            .iter()
            .filter(|state| {
                let consumer = state.consumer();

                stored.active_provider(consumer) != state.provider_id()
                    || stored.default_model(consumer) != state.model_id()
            })
            .map(|state| {
                (
                    state.consumer(),
                    state.provider_id().map(|s| s.to_string()),
                    state.model_id().map(|s| s.to_string()),
                )
            })
            .collect();

        for (consumer, provider_id, model_id) in pending {
            let result = self
                .store
                .set_binding(consumer, provider_id.as_deref(), model_id.as_deref());

            if let Err(err) = self.record(result) {
                self.selections = snapshot;
                return Err(err);
            }

            debug!(%consumer, ?provider_id, ?model_id, "binding written");

            if stored.active_provider(consumer) != provider_id.as_deref() {
                let provider = provider_id
                    .as_deref()
                    .and_then(|id| providers.iter().find(|p| p.id == id));

                sync::apply(&mut self.sync, consumer, provider);
            }
        }

        Ok(())
    }

    fn record<T, E: Into<SettingsError>>(
        &mut self,
        result: Result<T, E>,
    ) -> Result<T, SettingsError> {
        result.map_err(|err| {
            let err = err.into();
            warn!(%err, "settings change failed");
            self.last_error = Some(err.to_string());
            err
        })
    }
}
