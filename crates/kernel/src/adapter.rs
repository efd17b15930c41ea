#![forbid(unsafe_code)]

use crate::{
    Error,
    domain::{EndpointKey, EndpointSpec, Override, PresetChoice, SelectionRecord, StatusChange},
    runtime::{Interception, Listener, Subscription},
};
use async_trait::async_trait;

/// Boundary against the mocking runtime.
///
/// Implementations translate selection intent into interception and report
/// every change to subscribers. Label validation is the runtime's job:
/// `use_mock` fails with [`Error::UnknownPreset`] for labels the endpoint
/// does not define.
#[async_trait]
pub trait MockRegistry: Send + Sync {
    /// Every registered endpoint with its presets, in registration order.
    fn endpoints(&self) -> Vec<EndpointSpec>;

    /// Current interception state, in the same shape subscribers receive.
    fn status(&self) -> StatusChange;

    /// Stop intercepting `key`; requests reach the real network.
    async fn use_real_api(&self, key: &EndpointKey) -> Result<(), Error>;

    /// Intercept `key` and answer with the preset named `label`.
    async fn use_mock(
        &self,
        key: &EndpointKey,
        label: &str,
        override_with: Option<Override>,
    ) -> Result<(), Error>;

    /// Return every endpoint to pass-through and forget the current profile.
    async fn reset(&self) -> Result<(), Error>;

    /// Return to the state the runtime started in: the catalog's initial
    /// selections and no current profile.
    async fn restore_initial(&self) -> Result<(), Error>;

    /// Record which profile is active, for display.
    async fn set_current_profile(&self, name: Option<String>) -> Result<(), Error>;

    /// Register a listener called after every change. Dropping the returned
    /// handle unsubscribes. Listeners receive changes in the order they were
    /// made.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Apply one persisted selection.
    async fn apply(&self, record: &SelectionRecord) -> Result<(), Error> {
        let key = record.key();
        match &record.preset {
            PresetChoice::RealApi => self.use_real_api(&key).await,
            PresetChoice::Preset(label) => {
                self.use_mock(&key, label, record.override_with.clone())
                    .await
            }
        }
    }
}

/// The request-interception side of a runtime.
pub trait Interceptor: Send + Sync {
    /// What a request to `key` would receive right now.
    fn resolve(&self, key: &EndpointKey) -> Interception;
}
