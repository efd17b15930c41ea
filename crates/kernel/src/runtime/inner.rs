#![forbid(unsafe_code)]

use super::{Interception, MockResponse, listeners::ListenerSet};
use crate::{
    Error,
    catalog::Catalog,
    domain::{EndpointKey, MockingStatus, Override, StatusChange},
};
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
struct ActiveMock {
    label: String,
    override_with: Option<Override>,
}

#[derive(Debug, Default)]
struct RuntimeState {
    active: HashMap<EndpointKey, ActiveMock>,
    current_profile: Option<String>,
}

pub(crate) struct RuntimeInner {
    catalog: Catalog,
    state: Mutex<RuntimeState>,
    /// Held from snapshot through delivery so listeners see changes in the
    /// order they were made. Reentrant for listeners that mutate again.
    delivery: ReentrantMutex<()>,
    pub(crate) listeners: ListenerSet,
}

impl RuntimeInner {
    pub(crate) fn new(catalog: Catalog) -> Self {
        let state = Self::initial_state(&catalog);
        Self {
            catalog,
            state: Mutex::new(state),
            delivery: ReentrantMutex::new(()),
            listeners: ListenerSet::default(),
        }
    }

    fn initial_state(catalog: &Catalog) -> RuntimeState {
        let active = catalog
            .initial()
            .iter()
            .map(|(key, label)| {
                let mock = ActiveMock {
                    label: label.clone(),
                    override_with: None,
                };
                (key.clone(), mock)
            })
            .collect();
        RuntimeState {
            active,
            current_profile: None,
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn use_real_api(&self, key: &EndpointKey) -> Result<(), Error> {
        if self.catalog.get(key).is_none() {
            return Err(Error::UnknownEndpoint(key.clone()));
        }
        debug!(endpoint = %key, "passing through to the network");
        self.mutate(|state| {
            state.active.remove(key);
        });
        Ok(())
    }

    pub(crate) fn use_mock(
        &self,
        key: &EndpointKey,
        label: &str,
        override_with: Option<Override>,
    ) -> Result<(), Error> {
        let spec = self
            .catalog
            .get(key)
            .ok_or_else(|| Error::UnknownEndpoint(key.clone()))?;
        if spec.preset(label).is_none() {
            return Err(Error::UnknownPreset {
                endpoint: key.clone(),
                label: label.to_owned(),
            });
        }

        debug!(endpoint = %key, preset = label, "intercepting");
        self.mutate(|state| {
            state.active.insert(
                key.clone(),
                ActiveMock {
                    label: label.to_owned(),
                    override_with,
                },
            );
        });
        Ok(())
    }

    pub(crate) fn reset(&self) {
        debug!("resetting every endpoint to pass-through");
        self.mutate(|state| {
            state.active.clear();
            state.current_profile = None;
        });
    }

    pub(crate) fn restore_initial(&self) {
        debug!(initial = self.catalog.initial().len(), "restoring initial selections");
        let initial = Self::initial_state(&self.catalog);
        self.mutate(|state| *state = initial);
    }

    pub(crate) fn set_current_profile(&self, name: Option<String>) {
        self.mutate(|state| state.current_profile = name);
    }

    pub(crate) fn status(&self) -> StatusChange {
        Self::snapshot(&self.catalog, &self.state.lock())
    }

    pub(crate) fn resolve(&self, key: &EndpointKey) -> Interception {
        let state = self.state.lock();
        let Some(active) = state.active.get(key) else {
            return Interception::PassThrough;
        };
        let Some(preset) = self.catalog.get(key).and_then(|spec| spec.preset(&active.label)) else {
            return Interception::PassThrough;
        };
        Interception::Mocked(MockResponse {
            status: preset.status,
            preset: preset.label.clone(),
            body: merge_override(&preset.response, active.override_with.as_ref()),
        })
    }

    /// Apply a change, then notify listeners with the state lock released.
    fn mutate(&self, f: impl FnOnce(&mut RuntimeState)) {
        let _delivery = self.delivery.lock();
        let change = {
            let mut state = self.state.lock();
            f(&mut state);
            Self::snapshot(&self.catalog, &state)
        };
        self.listeners.notify(&change);
    }

    fn snapshot(catalog: &Catalog, state: &RuntimeState) -> StatusChange {
        let status = catalog
            .endpoints()
            .iter()
            .filter_map(|spec| {
                state.active.get(&spec.key).map(|active| MockingStatus {
                    key: spec.key.clone(),
                    current_preset: active.label.clone(),
                })
            })
            .collect();
        StatusChange {
            status,
            current_profile: state.current_profile.clone(),
        }
    }
}

/// Shallow-merge `override_with` into an object payload. Non-object payloads
/// are replaced by the override.
pub(crate) fn merge_override(response: &Value, override_with: Option<&Override>) -> Value {
    match (response, override_with) {
        (_, None) => response.clone(),
        (Value::Object(base), Some(patch)) => {
            let mut merged = base.clone();
            merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
            Value::Object(merged)
        }
        (_, Some(patch)) => Value::Object(patch.clone()),
    }
}
