use crate::registry::{Consumer, Provider};

use super::CatalogService;

/// Answers catalog questions from a snapshot of the registry, as seen by one
/// consumer.
pub(crate) struct RegistryCatalog<'r> {
    providers: &'r [Provider],
    consumer: Consumer,
}

impl<'r> RegistryCatalog<'r> {
    pub(crate) fn new(providers: &'r [Provider], consumer: Consumer) -> RegistryCatalog<'r> {
        RegistryCatalog {
            providers,
            consumer,
        }
    }

    fn find(&self, provider_id: &str) -> Option<&'r Provider> {
        self.providers.iter().find(|p| p.id == provider_id)
    }

    fn has_endpoint(&self, provider: &Provider) -> bool {
        provider
            .connectors
            .get(&self.consumer)
            .and_then(|c| c.base_url.as_deref())
            .is_some_and(|url| !url.trim().is_empty())
    }
}

impl CatalogService for RegistryCatalog<'_> {
    fn models(&self, provider_id: &str) -> Vec<String> {
        self.find(provider_id)
            .map(|p| p.model_ids())
            .unwrap_or_default()
    }

    fn is_provider_available(&self, provider_id: &str) -> bool {
        self.find(provider_id)
            .is_some_and(|p| self.has_endpoint(p) && !p.model_ids().is_empty())
    }

    fn availability_hint(&self, provider_id: &str) -> Option<String> {
        let provider = match self.find(provider_id) {
            Some(provider) => provider,
            None => return Some(format!("provider \"{provider_id}\" no longer exists")),
        };

        if !self.has_endpoint(provider) {
            Some(format!(
                "\"{}\" has no {} endpoint configured",
                provider.display_name(),
                self.consumer
            ))
        } else if provider.model_ids().is_empty() {
            Some(format!("\"{}\" has no models in its catalog", provider.display_name()))
        } else {
            None
        }
    }

    fn normalize_provider_id(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw.map(str::trim).filter(|id| !id.is_empty())?;

        self.find(raw).map(|p| p.id.clone())
    }
}
