use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::catalog::{recompute_recommended, ModelOverrides};
use super::id::{validate_id, IdError};
use super::model::{Bindings, Consumer, Provider};

/// Every variant is a persistence failure from the caller's point of view.
#[derive(Error, Debug)]
pub(crate) enum StoreError {
    #[error(transparent)]
    InvalidId(#[from] IdError),
    #[error("provider \"{0}\" does not exist")]
    ProviderNotFound(String),
    #[error("failed to read registry \"{}\": {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write registry \"{}\": {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("registry \"{}\" is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// The whole persisted document. It is always read and written as a unit.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegistryDocument {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub bindings: Bindings,
    #[serde(default, skip_serializing_if = "ModelOverrides::is_empty")]
    pub model_overrides: ModelOverrides,
}

/// Data access for providers and bindings.
///
/// Implementations assume a single writer within a single process; callers
/// are expected to serialize mutations (see [`crate::settings::Settings`]).
pub(crate) trait RegistryStore {
    fn list_providers(&self) -> Vec<Provider>;

    fn provider(&self, id: &str) -> Option<Provider> {
        self.list_providers().into_iter().find(|p| p.id == id)
    }

    /// Inserts or replaces a provider. Returns the provider as stored, after
    /// credential normalization and default recomputation.
    fn upsert_provider(&mut self, provider: Provider) -> Result<Provider, StoreError>;

    /// Deletes a provider and every binding and override that references it.
    /// Returns the consumers whose active provider was cleared.
    fn delete_provider(&mut self, id: &str) -> Result<Vec<Consumer>, StoreError>;

    fn get_bindings(&self) -> Bindings;

    fn set_active_provider(
        &mut self,
        consumer: Consumer,
        provider_id: Option<&str>,
    ) -> Result<(), StoreError>;

    fn set_default_model(
        &mut self,
        consumer: Consumer,
        model_id: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Sets the active provider and the default model of `consumer` in one
    /// write. Either both change or neither does.
    fn set_binding(
        &mut self,
        consumer: Consumer,
        provider_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<(), StoreError>;

    fn model_overrides(&self) -> ModelOverrides;

    fn set_model_overrides(&mut self, overrides: ModelOverrides) -> Result<(), StoreError>;
}

/// A [`RegistryStore`] over an in-memory [`RegistryDocument`], optionally
/// backed by a JSON file that is rewritten after every mutation.
#[derive(Debug, Default)]
pub(crate) struct DocumentStore {
    document: RegistryDocument,
    path: Option<PathBuf>,
}

impl DocumentStore {
    #[cfg(test)]
    pub(crate) fn in_memory() -> DocumentStore {
        DocumentStore::default()
    }

    /// Opens the registry at `path`. A missing file is an empty registry.
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<DocumentStore, StoreError> {
        let path = path.as_ref().to_path_buf();

        let document = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<RegistryDocument>(&raw).map_err(|source| {
                StoreError::Malformed {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "registry does not exist yet");
                RegistryDocument::default()
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        for provider in &document.providers {
            if let Err(err) = validate_id(&provider.id) {
                warn!(%err, "registry contains an invalid provider id");
            }
        }

        Ok(DocumentStore {
            document,
            path: Some(path),
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };

        let raw = serde_json::to_string_pretty(&self.document).map_err(StoreError::Serialize)?;

        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, raw).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;

        debug!(path = %path.display(), "registry written");

        Ok(())
    }

    /// Applies `mutate` and persists the result. The in-memory document is
    /// restored if either step fails.
    fn transact<R, F>(&mut self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut RegistryDocument) -> Result<R, StoreError>,
    {
        let snapshot = self.document.clone();

        let result = mutate(&mut self.document).and_then(|r| self.persist().map(|_| r));

        if result.is_err() {
            self.document = snapshot;
        }

        result
    }
}

fn bind_provider(
    doc: &mut RegistryDocument,
    consumer: Consumer,
    provider_id: Option<&str>,
) -> Result<(), StoreError> {
    match provider_id {
        Some(id) => {
            if !doc.providers.iter().any(|p| p.id == id) {
                return Err(StoreError::ProviderNotFound(id.to_string()));
            }

            doc.bindings.active_provider.insert(consumer, id.to_string());
        }
        None => {
            doc.bindings.active_provider.remove(&consumer);
        }
    }

    Ok(())
}

fn bind_model(doc: &mut RegistryDocument, consumer: Consumer, model_id: Option<&str>) {
    match model_id.filter(|m| !m.is_empty()) {
        Some(model) => {
            doc.bindings.default_model.insert(consumer, model.to_string());
        }
        None => {
            doc.bindings.default_model.remove(&consumer);
        }
    }
}

impl RegistryStore for DocumentStore {
    fn list_providers(&self) -> Vec<Provider> {
        self.document.providers.clone()
    }

    fn provider(&self, id: &str) -> Option<Provider> {
        self.document.providers.iter().find(|p| p.id == id).cloned()
    }

    fn upsert_provider(&mut self, mut provider: Provider) -> Result<Provider, StoreError> {
        validate_id(&provider.id)?;

        provider.normalize_credentials();

        if let Some(catalog) = provider.catalog.as_mut() {
            catalog.dedup();
        }

        recompute_recommended(&mut provider);

        let stored = provider.clone();

        self.transact(move |doc| {
            match doc.providers.iter_mut().find(|p| p.id == provider.id) {
                Some(existing) => *existing = provider,
                None => doc.providers.push(provider),
            }

            Ok(())
        })?;

        info!(provider = %stored.id, "provider saved");

        Ok(stored)
    }

    fn delete_provider(&mut self, id: &str) -> Result<Vec<Consumer>, StoreError> {
        let released = self.transact(|doc| {
            let before = doc.providers.len();
            doc.providers.retain(|p| p.id != id);

            if doc.providers.len() == before {
                return Err(StoreError::ProviderNotFound(id.to_string()));
            }

            doc.model_overrides.remove_provider(id);

            Ok(doc.bindings.release_provider(id))
        })?;

        info!(provider = %id, released = ?released, "provider deleted");

        Ok(released)
    }

    fn get_bindings(&self) -> Bindings {
        self.document.bindings.clone()
    }

    fn set_active_provider(
        &mut self,
        consumer: Consumer,
        provider_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.transact(|doc| bind_provider(doc, consumer, provider_id))
    }

    fn set_default_model(
        &mut self,
        consumer: Consumer,
        model_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.transact(|doc| {
            bind_model(doc, consumer, model_id);
            Ok(())
        })
    }

    fn set_binding(
        &mut self,
        consumer: Consumer,
        provider_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.transact(|doc| {
            bind_provider(doc, consumer, provider_id)?;
            bind_model(doc, consumer, model_id);
            Ok(())
        })
    }

    fn model_overrides(&self) -> ModelOverrides {
        self.document.model_overrides.clone()
    }

    fn set_model_overrides(&mut self, overrides: ModelOverrides) -> Result<(), StoreError> {
        self.transact(|doc| {
            doc.model_overrides = overrides;
            Ok(())
        })
    }
}
