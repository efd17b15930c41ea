#![forbid(unsafe_code)]

mod catalog;
mod dashboard;
mod error;
mod http_method;
mod persistence;

pub use catalog::{ActionConfig, EndpointConfig, PresetConfig, ProfileConfig};
pub use dashboard::Dashboard;
pub use error::Error;
pub use http_method::HttpMethod;
pub use persistence::{Persistence, ResetPolicy};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;

/// Environment variables with this prefix override file values. Nested keys
/// are separated by `__`, e.g. `MOCKDECK_DASHBOARD__BASE_URL`.
pub const ENV_PREFIX: &str = "MOCKDECK_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub persistence: Persistence,

    pub dashboard: Dashboard,

    pub endpoints: Vec<EndpointConfig>,

    pub profiles: Vec<ProfileConfig>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML file and layer `MOCKDECK_*` environment variables on top.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        Self::extract(Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)))
    }

    /// Defaults overridden by `MOCKDECK_*` environment variables only.
    pub fn from_env() -> Result<Self, Error> {
        Self::extract(Figment::from(Serialized::defaults(Config::default())))
    }

    fn extract(figment: Figment) -> Result<Self, Error> {
        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(Self {
            dashboard: config.dashboard.clamp(),
            ..config
        })
    }

    /// Render the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    /// A small catalog that exercises every feature; written by `mockdeck init`.
    pub fn sample() -> Self {
        use HttpMethod::{Get, Post};

        let endpoints = vec![
            EndpointConfig::new(Get, "/api/user")
                .with_preset("success", 200, json!({ "name": "John Doe", "age": 30 }))
                .with_preset("error", 404, json!({ "error": "User not found" }))
                .with_initial("success"),
            EndpointConfig::new(Get, "/api/posts")
                .with_preset(
                    "has posts",
                    200,
                    json!({ "posts": [
                        { "id": 1, "title": "First Post" },
                        { "id": 2, "title": "Second Post" },
                    ] }),
                )
                .with_preset("empty", 200, json!({ "posts": [] })),
            EndpointConfig::new(Get, "/api/credit/score")
                .with_preset("high", 200, json!({ "score": 910, "grade": 1 }))
                .with_preset("low", 200, json!({ "score": 420, "grade": 8 })),
            EndpointConfig::new(Post, "/api/loans")
                .with_preset("approved", 201, json!({ "id": "L-1001", "state": "approved" }))
                .with_preset("rejected", 422, json!({ "error": "Loan rejected" })),
            EndpointConfig::new(Get, "/api/loans/status")
                .with_preset("pending", 200, json!({ "state": "pending" }))
                .with_preset("done", 200, json!({ "state": "done" })),
        ];

        let profiles = vec![
            ProfileConfig::new("신용대출 신청")
                .with_action(Get, "/api/user", "success")
                .with_action(Get, "/api/credit/score", "high")
                .with_action(Post, "/api/loans", "approved")
                .with_action(Get, "/api/loans/status", "pending"),
            ProfileConfig::new("신규 사용자")
                .with_action(Get, "/api/user", "success")
                .with_action(Get, "/api/posts", "empty"),
        ];

        Self {
            endpoints,
            profiles,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn loads_file_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "mockdeck.toml",
                r#"
                [persistence]
                reset_policy = "keep"

                [dashboard]
                timeout = 3

                [[endpoints]]
                method = "get"
                path = "/api/user"
                presets = [
                    { label = "success", status = 200, response = { name = "John Doe", age = 30 } },
                ]

                [[profiles]]
                name = "happy"
                actions = [ { method = "GET", path = "/api/user", preset = "success" } ]
                "#,
            )?;
            jail.set_env("MOCKDECK_DASHBOARD__BASE_URL", "http://127.0.0.1:9000");

            let config = Config::load("mockdeck.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.persistence.reset_policy, ResetPolicy::Keep);
            assert_eq!(config.dashboard.base_url, "http://127.0.0.1:9000");
            assert_eq!(config.dashboard.timeout, Duration::from_secs(3));
            assert_eq!(config.endpoints.len(), 1);
            assert_eq!(config.endpoints[0].method, HttpMethod::Get);
            assert_eq!(
                config.endpoints[0].presets[0].response,
                json!({ "name": "John Doe", "age": 30 })
            );
            assert_eq!(config.profiles[0].actions[0].preset, "success");
            Ok(())
        });
    }

    #[test]
    fn sample_survives_toml_rendering() {
        Jail::expect_with(|jail| {
            let sample = Config::sample();
            let rendered = sample.to_toml().map_err(|e| e.to_string())?;
            jail.create_file("sample.toml", &rendered)?;

            let loaded = Config::load("sample.toml").map_err(|e| e.to_string())?;
            assert_eq!(loaded, sample);
            Ok(())
        });
    }
}
