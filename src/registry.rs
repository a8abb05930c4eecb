//! The registry is the persisted set of providers and the per-consumer
//! bindings that say which provider and model each downstream CLI tool uses.
//!
//! A provider is a configured remote endpoint (a vendor account, a gateway,
//! a local proxy). Each provider carries one connector per consumer it
//! serves, an ordered catalog of models, and the recommended default model
//! per consumer. The recommended default is never set by hand: it is
//! recomputed with [`catalog::resolve_default_model`] whenever the provider
//! is saved, so it always points into the current catalog.
//!
//! Users may also restrict the models a consumer sees for a provider with a
//! model override. Overrides change what is listed and selectable; they never
//! change the stored catalog.

pub(crate) mod catalog;
pub(crate) mod id;
pub(crate) mod model;
pub(crate) mod staging;
pub(crate) mod store;
pub(crate) mod templates;

pub(crate) use model::{Consumer, Provider, ProviderClass, WireApi};
pub(crate) use store::{DocumentStore, RegistryStore, StoreError};
