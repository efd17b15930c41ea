#![forbid(unsafe_code)]

use crate::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mockable route as written in the configuration file.
///
/// Nothing here is validated; the kernel checks labels, statuses and
/// references when it registers the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EndpointConfig {
    pub method: HttpMethod,

    pub path: String,

    /// Preset applied when the runtime is constructed, before any saved
    /// selection is replayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,

    #[serde(default)]
    pub presets: Vec<PresetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetConfig {
    pub label: String,

    pub status: u16,

    #[serde(default)]
    pub response: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProfileConfig {
    pub name: String,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionConfig {
    pub method: HttpMethod,

    pub path: String,

    pub preset: String,

    #[serde(rename = "override", default, skip_serializing_if = "Option::is_none")]
    pub override_with: Option<Map<String, Value>>,
}

impl EndpointConfig {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            initial: None,
            presets: Vec::new(),
        }
    }

    pub fn with_preset(mut self, label: impl Into<String>, status: u16, response: Value) -> Self {
        self.presets.push(PresetConfig {
            label: label.into(),
            status,
            response,
        });
        self
    }

    pub fn with_initial(mut self, label: impl Into<String>) -> Self {
        self.initial = Some(label.into());
        self
    }
}

impl ProfileConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(
        mut self,
        method: HttpMethod,
        path: impl Into<String>,
        preset: impl Into<String>,
    ) -> Self {
        self.actions.push(ActionConfig {
            method,
            path: path.into(),
            preset: preset.into(),
            override_with: None,
        });
        self
    }
}
