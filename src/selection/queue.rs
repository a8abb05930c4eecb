//! Events that trigger normalization.
//!
//! Writers describe what happened; the single owner of the queue applies the
//! events in order, each one against the registry snapshot it is handed at
//! drain time. Because draining happens after the triggering write has been
//! committed, normalization never observes a stale catalog.

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};

use super::{CatalogService, SelectionState};
use crate::registry::catalog::ModelOverrides;
use crate::registry::Consumer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectionEvent {
    /// The user picked a provider and/or model for a consumer.
    SelectionChanged {
        consumer: Consumer,
        provider_id: Option<String>,
        model_id: Option<String>,
    },
    /// A provider catalog was saved or reloaded.
    CatalogReloaded,
    /// The model override list of a consumer changed.
    OverridesChanged { consumer: Consumer },
    /// A provider was added or removed.
    ProvidersChanged,
}

impl SelectionEvent {
    fn affects(&self, consumer: Consumer) -> bool {
        match self {
            SelectionEvent::SelectionChanged { consumer: c, .. }
            | SelectionEvent::OverridesChanged { consumer: c } => *c == consumer,
            SelectionEvent::CatalogReloaded | SelectionEvent::ProvidersChanged => true,
        }
    }
}

pub(crate) struct SelectionQueue {
    sender: UnboundedSender<SelectionEvent>,
    receiver: UnboundedReceiver<SelectionEvent>,
}

impl SelectionQueue {
    pub(crate) fn new() -> SelectionQueue {
        let (sender, receiver) = mpsc::unbounded_channel();

        SelectionQueue { sender, receiver }
    }

    pub(crate) fn emit(&self, event: SelectionEvent) {
        // The receiver lives in `self`, so this only fails while dropping.
        if let Err(err) = self.sender.send(event) {
            warn!(event = ?err.0, "selection queue is closed, event dropped");
        }
    }

    /// Applies every pending event. Returns the consumers whose selection
    /// ended up different from before the drain, in first-changed order.
    pub(crate) fn drain<C, F>(
        &mut self,
        states: &mut [SelectionState],
        catalog_for: F,
        overrides: &ModelOverrides,
    ) -> Vec<Consumer>
    where
        C: CatalogService,
        F: Fn(Consumer) -> C,
    {
        let before: Vec<(Option<String>, Option<String>)> = states
            .iter()
            .map(|s| (s.provider_id.clone(), s.model_id.clone()))
            .collect();

        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };

            trace!(?event, "selection event");

            for state in states.iter_mut().filter(|s| event.affects(s.consumer)) {
                if let SelectionEvent::SelectionChanged {
                    provider_id,
                    model_id,
                    ..
                } = &event
                {
                    state.select(provider_id.clone(), model_id.clone());
                }

                let catalog = catalog_for(state.consumer);
                state.normalize(&catalog, overrides);
            }
        }

        states
            .iter()
            .zip(before)
            .filter(|(s, (provider, model))| s.provider_id != *provider || s.model_id != *model)
            .map(|(s, _)| s.consumer)
            .collect()
    }
}
