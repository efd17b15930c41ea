#![forbid(unsafe_code)]

use super::{HttpMethod, PresetDescriptor};
use std::fmt;

/// Identity of a mockable route.
///
/// Equality is structural: the path is compared as a plain string, so
/// `/api/user/:id` and `/api/user/1` are different endpoints.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    pub method: HttpMethod,
    pub path: String,
}

impl EndpointKey {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Debug for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EndpointKey")
            .field(&self.method)
            .field(&self.path)
            .finish()
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// A registered endpoint together with its presets, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSpec {
    pub key: EndpointKey,
    pub presets: Vec<PresetDescriptor>,
}

impl EndpointSpec {
    pub fn new(key: EndpointKey, presets: Vec<PresetDescriptor>) -> Self {
        Self { key, presets }
    }

    pub fn preset(&self, label: &str) -> Option<&PresetDescriptor> {
        self.presets.iter().find(|preset| preset.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|preset| preset.label.as_str())
    }
}
