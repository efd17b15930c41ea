#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Persistence {
    /// Optional path to the selection file. When unset a per-user state
    /// directory is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selections_path: Option<PathBuf>,

    pub reset_policy: ResetPolicy,
}

/// What a global reset does to the persisted selections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Overwrite every persisted selection with `real-api`.
    #[default]
    Overwrite,
    /// Leave persisted selections untouched; only the live runtime is reset.
    Keep,
}

impl Persistence {
    /// Resolve the selection file location.
    ///
    /// Falls back to `$XDG_STATE_HOME/mockdeck/selections.json`, then to
    /// `.mockdeck/selections.json` in the working directory.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.selections_path {
            return path.clone();
        }
        match std::env::var_os("XDG_STATE_HOME") {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir).join("mockdeck/selections.json"),
            _ => PathBuf::from(".mockdeck/selections.json"),
        }
    }
}
