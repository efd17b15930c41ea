#![forbid(unsafe_code)]

use super::{EndpointKey, Override, PresetChoice, SelectionRecord};

/// Activating a profile with this name resets every endpoint instead.
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileAction {
    pub key: EndpointKey,
    pub choice: PresetChoice,
    pub override_with: Option<Override>,
}

impl ProfileAction {
    pub fn new(key: EndpointKey, choice: PresetChoice) -> Self {
        Self {
            key,
            choice,
            override_with: None,
        }
    }

    pub fn to_record(&self) -> SelectionRecord {
        SelectionRecord::new(self.key.clone(), self.choice.clone())
            .with_override(self.override_with.clone())
    }
}

/// A named, ordered bundle of preset selections.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileDefinition {
    pub name: String,
    pub actions: Vec<ProfileAction>,
}

impl ProfileDefinition {
    pub fn new(name: impl Into<String>, actions: Vec<ProfileAction>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }
}
