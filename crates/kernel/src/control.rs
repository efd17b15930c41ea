#![forbid(unsafe_code)]

use crate::{
    Error,
    domain::{EndpointKey, Override, PresetChoice},
    reconciler::Reconciler,
};
use std::sync::Arc;

/// One preset as shown in the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetSummary {
    pub label: String,
    pub status: u16,
}

/// One row of the endpoint list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointView {
    pub key: EndpointKey,
    pub presets: Vec<PresetSummary>,
    pub current: PresetChoice,
}

/// Read model and action entry point for a control panel.
///
/// Holds no state of its own; every view is derived from the runtime's
/// endpoint list and the reconciler's live status at call time.
#[derive(Debug, Clone)]
pub struct ControlSurface {
    reconciler: Arc<Reconciler>,
}

impl ControlSurface {
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self { reconciler }
    }

    pub fn is_ready(&self) -> bool {
        self.reconciler.is_ready()
    }

    pub fn endpoints(&self) -> Vec<EndpointView> {
        let live = self.reconciler.live_status();
        self.reconciler
            .registry()
            .endpoints()
            .into_iter()
            .map(|spec| EndpointView {
                current: live.choice(&spec.key),
                presets: spec
                    .presets
                    .iter()
                    .map(|preset| PresetSummary {
                        label: preset.label.clone(),
                        status: preset.status,
                    })
                    .collect(),
                key: spec.key,
            })
            .collect()
    }

    /// Number of endpoints currently intercepted.
    pub fn active_count(&self) -> usize {
        self.reconciler.live_status().active_count()
    }

    pub fn profiles(&self) -> Vec<String> {
        self.reconciler
            .profiles()
            .iter()
            .map(|profile| profile.name.clone())
            .collect()
    }

    pub fn current_profile(&self) -> Option<String> {
        self.reconciler
            .live_status()
            .current_profile()
            .map(str::to_owned)
    }

    pub async fn select(&self, key: EndpointKey, choice: PresetChoice) -> Result<(), Error> {
        self.reconciler.set_preset(key, choice).await
    }

    pub async fn select_with_override(
        &self,
        key: EndpointKey,
        choice: PresetChoice,
        override_with: Override,
    ) -> Result<(), Error> {
        self.reconciler
            .set_preset_with_override(key, choice, Some(override_with))
            .await
    }

    pub async fn reset_endpoint(&self, key: EndpointKey) -> Result<(), Error> {
        self.reconciler.reset_endpoint(key).await
    }

    pub async fn reset_all(&self) -> Result<(), Error> {
        self.reconciler.reset().await
    }

    pub async fn activate_profile(&self, name: &str) -> Result<(), Error> {
        self.reconciler.activate_profile(name).await
    }
}
