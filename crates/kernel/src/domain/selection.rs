#![forbid(unsafe_code)]

use super::{EndpointKey, HttpMethod, PresetChoice};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Object whose keys are merged over a preset's payload.
pub type Override = Map<String, Value>;

/// The user's choice for one endpoint, exactly as it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub method: HttpMethod,

    pub path: String,

    pub preset: PresetChoice,

    #[serde(rename = "override", default, skip_serializing_if = "Option::is_none")]
    pub override_with: Option<Override>,
}

impl SelectionRecord {
    pub fn new(key: EndpointKey, preset: PresetChoice) -> Self {
        Self {
            method: key.method,
            path: key.path,
            preset,
            override_with: None,
        }
    }

    pub fn with_override(mut self, override_with: Option<Override>) -> Self {
        self.override_with = override_with;
        self
    }

    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.method, self.path.clone())
    }

    pub fn same_key(&self, other: &SelectionRecord) -> bool {
        self.method == other.method && self.path == other.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn persisted_layout() {
        let record = SelectionRecord::new(
            EndpointKey::new(HttpMethod::Get, "/api/user"),
            PresetChoice::preset("success"),
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "method": "GET", "path": "/api/user", "preset": "success" })
        );

        let parsed: SelectionRecord = serde_json::from_value(json!({
            "method": "get",
            "path": "/api/user",
            "preset": "real-api",
            "override": { "name": "Jane" },
        }))
        .unwrap();
        assert_eq!(parsed.preset, PresetChoice::RealApi);
        assert_eq!(parsed.method, HttpMethod::Get);
        assert_eq!(parsed.override_with.unwrap()["name"], json!("Jane"));
    }
}
