#![forbid(unsafe_code)]

use super::{EndpointKey, PresetChoice};
use std::collections::HashMap;

/// One intercepted endpoint as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockingStatus {
    pub key: EndpointKey,
    pub current_preset: String,
}

/// Payload delivered to subscribers after every runtime change.
///
/// Endpoints absent from `status` are passing through to the network.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusChange {
    pub status: Vec<MockingStatus>,
    pub current_profile: Option<String>,
}

/// In-memory view of the runtime, rebuilt from each [`StatusChange`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveStatus {
    presets: HashMap<EndpointKey, String>,
    current_profile: Option<String>,
}

impl LiveStatus {
    pub fn choice(&self, key: &EndpointKey) -> PresetChoice {
        self.presets
            .get(key)
            .map_or(PresetChoice::RealApi, |label| PresetChoice::Preset(label.clone()))
    }

    pub fn active_count(&self) -> usize {
        self.presets.len()
    }

    pub fn current_profile(&self) -> Option<&str> {
        self.current_profile.as_deref()
    }
}

impl From<&StatusChange> for LiveStatus {
    fn from(change: &StatusChange) -> Self {
        Self {
            presets: change
                .status
                .iter()
                .map(|status| (status.key.clone(), status.current_preset.clone()))
                .collect(),
            current_profile: change.current_profile.clone(),
        }
    }
}
