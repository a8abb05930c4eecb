//! Hook through which a change of active provider reaches the external CLI
//! that consumes it. Translating a provider into a tool's own configuration
//! files happens behind this trait.

use thiserror::Error;
use tracing::{info, warn};

use crate::registry::{Consumer, Provider};

#[derive(Error, Debug)]
pub(crate) enum SyncError {
    #[error("failed to update {consumer} configuration: {reason}")]
    Rejected { consumer: Consumer, reason: String },
}

pub(crate) trait ConfigSync {
    /// `None` means the consumer no longer has an active provider.
    fn apply_active_provider_to_config(
        &mut self,
        consumer: Consumer,
        provider: Option<&Provider>,
    ) -> Result<(), SyncError>;
}

/// Applies a change through `sync`. A failure is logged and otherwise
/// ignored; it is not retried.
pub(crate) fn apply<S: ConfigSync + ?Sized>(
    sync: &mut S,
    consumer: Consumer,
    provider: Option<&Provider>,
) {
    if let Err(err) = sync.apply_active_provider_to_config(consumer, provider) {
        warn!(%consumer, %err, "config sync failed");
    }
}

/// Records every change in the log and nothing else. A provider without a
/// base URL for the consumer is rejected, since there is nothing the consumer
/// could be pointed at.
#[derive(Debug, Default)]
pub(crate) struct LoggingSync;

impl ConfigSync for LoggingSync {
    fn apply_active_provider_to_config(
        &mut self,
        consumer: Consumer,
        provider: Option<&Provider>,
    ) -> Result<(), SyncError> {
        let provider = match provider {
            Some(provider) => provider,
            None => {
                info!(%consumer, "active provider cleared");
                return Ok(());
            }
        };

        let base_url = provider
            .connectors
            .get(&consumer)
            .and_then(|c| c.base_url.as_deref())
            .ok_or_else(|| SyncError::Rejected {
                consumer,
                reason: format!("\"{}\" has no base URL for it", provider.id),
            })?;

        info!(%consumer, provider = %provider.id, base_url, "active provider changed");

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Remembers every call; optionally fails all of them.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSync {
        pub calls: Vec<(Consumer, Option<String>)>,
        pub fail: bool,
    }

    impl ConfigSync for RecordingSync {
        fn apply_active_provider_to_config(
            &mut self,
            consumer: Consumer,
            provider: Option<&Provider>,
        ) -> Result<(), SyncError> {
            self.calls.push((consumer, provider.map(|p| p.id.clone())));

            if self.fail {
                return Err(SyncError::Rejected {
                    consumer,
                    reason: "read-only file system".to_string(),
                });
            }

            Ok(())
        }
    }

    #[test]
    fn test_failure_is_swallowed() {
        let mut sync = RecordingSync {
            fail: true,
            ..RecordingSync::default()
        };

        apply(&mut sync, Consumer::Codex, None);
        apply(&mut sync, Consumer::Codex, None);

        // one attempt per change, no retries
        assert_eq!(sync.calls.len(), 2);
    }

    #[test]
    fn test_error_message() {
        let err = SyncError::Rejected {
            consumer: Consumer::ClaudeCode,
            reason: "permission denied".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "failed to update claudeCode configuration: permission denied"
        );
    }

    #[test]
    fn test_logging_sync_needs_a_base_url() {
        let mut provider = Provider::blank("gw", crate::registry::ProviderClass::Anthropic);

        let err = LoggingSync
            .apply_active_provider_to_config(Consumer::ClaudeCode, Some(&provider))
            .unwrap_err();
        assert!(err.to_string().ends_with("\"gw\" has no base URL for it"));

        provider.connectors.entry(Consumer::ClaudeCode).or_default().base_url =
            Some("https://gw.example.com".to_string());

        assert!(LoggingSync
            .apply_active_provider_to_config(Consumer::ClaudeCode, Some(&provider))
            .is_ok());
        assert!(LoggingSync
            .apply_active_provider_to_config(Consumer::ClaudeCode, None)
            .is_ok());
    }
}
