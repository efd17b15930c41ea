#![forbid(unsafe_code)]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::{convert::Infallible, fmt, str::FromStr};

/// A canned response registered for one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetDescriptor {
    pub label: String,
    pub status: u16,
    pub response: Value,
}

impl PresetDescriptor {
    pub fn new(label: impl Into<String>, status: u16, response: Value) -> Self {
        Self {
            label: label.into(),
            status,
            response,
        }
    }
}

/// What an endpoint should do: hit the real network or answer with a preset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PresetChoice {
    #[default]
    RealApi,
    Preset(String),
}

impl PresetChoice {
    /// Sentinel label for pass-through.
    pub const REAL_API: &'static str = "real-api";

    pub fn preset(label: impl Into<String>) -> Self {
        let label = label.into();
        if label == Self::REAL_API {
            Self::RealApi
        } else {
            Self::Preset(label)
        }
    }

    pub fn is_real_api(&self) -> bool {
        matches!(self, Self::RealApi)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::RealApi => Self::REAL_API,
            Self::Preset(label) => label,
        }
    }
}

impl fmt::Display for PresetChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetChoice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::preset(s))
    }
}

impl From<&str> for PresetChoice {
    fn from(value: &str) -> Self {
        Self::preset(value)
    }
}

impl Serialize for PresetChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PresetChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::preset)
    }
}
