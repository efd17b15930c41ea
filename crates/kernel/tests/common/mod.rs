#![forbid(unsafe_code)]
#![allow(dead_code)]

use async_trait::async_trait;
use config::{Config, ResetPolicy};
use kernel::{
    Catalog, Error, MemoryStore, MockRegistry, PresetRuntime, Reconciler, SelectionStore,
    domain::{
        EndpointKey, EndpointSpec, HttpMethod, Override, PresetChoice, SelectionRecord,
        StatusChange,
    },
    runtime::{Listener, Subscription},
};
use parking_lot::Mutex;
use std::sync::Arc;

pub fn key(method: HttpMethod, path: &str) -> EndpointKey {
    EndpointKey::new(method, path)
}

pub fn user() -> EndpointKey {
    key(HttpMethod::Get, "/api/user")
}

pub fn posts() -> EndpointKey {
    key(HttpMethod::Get, "/api/posts")
}

pub fn record(key: EndpointKey, preset: &str) -> SelectionRecord {
    SelectionRecord::new(key, PresetChoice::preset(preset))
}

/// The sample catalog without initial selections.
pub fn catalog() -> Catalog {
    let mut config = Config::sample();
    for endpoint in &mut config.endpoints {
        endpoint.initial = None;
    }
    Catalog::from_config(&config).unwrap()
}

/// The sample catalog as configured, with `GET /api/user` initially mocked.
pub fn sample_catalog() -> Catalog {
    Catalog::from_config(&Config::sample()).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RealApi(EndpointKey),
    Mock(EndpointKey, String),
    Reset,
    RestoreInitial,
    Profile(Option<String>),
}

/// Runtime wrapper that records every mutating call.
#[derive(Debug, Clone)]
pub struct RecordingRegistry {
    pub runtime: PresetRuntime,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingRegistry {
    pub fn new(runtime: PresetRuntime) -> Self {
        Self {
            runtime,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl MockRegistry for RecordingRegistry {
    fn endpoints(&self) -> Vec<EndpointSpec> {
        self.runtime.endpoints()
    }

    fn status(&self) -> StatusChange {
        self.runtime.status()
    }

    async fn use_real_api(&self, key: &EndpointKey) -> Result<(), Error> {
        self.calls.lock().push(Call::RealApi(key.clone()));
        self.runtime.use_real_api(key).await
    }

    async fn use_mock(
        &self,
        key: &EndpointKey,
        label: &str,
        override_with: Option<Override>,
    ) -> Result<(), Error> {
        self.calls.lock().push(Call::Mock(key.clone(), label.to_owned()));
        self.runtime.use_mock(key, label, override_with).await
    }

    async fn reset(&self) -> Result<(), Error> {
        self.calls.lock().push(Call::Reset);
        self.runtime.reset().await
    }

    async fn restore_initial(&self) -> Result<(), Error> {
        self.calls.lock().push(Call::RestoreInitial);
        self.runtime.restore_initial().await
    }

    async fn set_current_profile(&self, name: Option<String>) -> Result<(), Error> {
        self.calls.lock().push(Call::Profile(name.clone()));
        self.runtime.set_current_profile(name).await
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        self.runtime.subscribe(listener)
    }
}

pub struct Harness {
    pub registry: RecordingRegistry,
    pub store: Arc<MemoryStore>,
    pub reconciler: Arc<Reconciler>,
}

impl Harness {
    pub fn new(saved: Vec<SelectionRecord>) -> Self {
        Self::with_policy(saved, ResetPolicy::Overwrite)
    }

    pub fn with_policy(saved: Vec<SelectionRecord>, policy: ResetPolicy) -> Self {
        Self::with_catalog(catalog(), saved, policy)
    }

    pub fn with_catalog(catalog: Catalog, saved: Vec<SelectionRecord>, policy: ResetPolicy) -> Self {
        let profiles = catalog.profiles().to_vec();
        let registry = RecordingRegistry::new(PresetRuntime::new(catalog));
        let store = Arc::new(MemoryStore::with_records(saved));
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(registry.clone()),
            Arc::clone(&store) as Arc<dyn SelectionStore>,
            profiles,
            policy,
        ));
        Self {
            registry,
            store,
            reconciler,
        }
    }

    pub fn saved(&self) -> Vec<SelectionRecord> {
        self.store.get_selections()
    }
}
