#![forbid(unsafe_code)]

mod inner;
mod listeners;

pub use listeners::{Listener, Subscription};

use crate::{
    Error,
    adapter::{Interceptor, MockRegistry},
    catalog::Catalog,
    domain::{EndpointKey, EndpointSpec, Override, StatusChange},
};
use async_trait::async_trait;
use inner::RuntimeInner;
use serde_json::Value;
use std::sync::Arc;

/// Answer the runtime gives for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    Mocked(MockResponse),
    PassThrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub preset: String,
    pub body: Value,
}

/// In-process mocking runtime built from a [`Catalog`].
///
/// Cloning is cheap and every clone drives the same state, so changes made
/// through one handle are reported to listeners registered through another.
#[derive(Clone)]
pub struct PresetRuntime(Arc<RuntimeInner>);

impl PresetRuntime {
    /// Build the runtime and apply the catalog's initial selections.
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(RuntimeInner::new(catalog)))
    }

    pub fn catalog(&self) -> &Catalog {
        self.0.catalog()
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.len()
    }
}

impl std::fmt::Debug for PresetRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresetRuntime")
            .field("status", &self.0.status())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MockRegistry for PresetRuntime {
    fn endpoints(&self) -> Vec<EndpointSpec> {
        self.0.catalog().endpoints().to_vec()
    }

    fn status(&self) -> StatusChange {
        self.0.status()
    }

    async fn use_real_api(&self, key: &EndpointKey) -> Result<(), Error> {
        self.0.use_real_api(key)
    }

    async fn use_mock(
        &self,
        key: &EndpointKey,
        label: &str,
        override_with: Option<Override>,
    ) -> Result<(), Error> {
        self.0.use_mock(key, label, override_with)
    }

    async fn reset(&self) -> Result<(), Error> {
        self.0.reset();
        Ok(())
    }

    async fn restore_initial(&self) -> Result<(), Error> {
        self.0.restore_initial();
        Ok(())
    }

    async fn set_current_profile(&self, name: Option<String>) -> Result<(), Error> {
        self.0.set_current_profile(name);
        Ok(())
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.0.listeners.add(listener)
    }
}

impl Interceptor for PresetRuntime {
    fn resolve(&self, key: &EndpointKey) -> Interception {
        self.0.resolve(key)
    }
}
