use crate::domain::EndpointKey;

/// Represents all possible errors that can occur in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error occurred while loading the configuration file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(#[from] config::Error),

    /// The catalog of endpoints, presets and profiles is inconsistent.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The endpoint is not registered with the runtime.
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(EndpointKey),

    /// The preset label is not registered for the endpoint.
    ///
    /// Usually caused by a saved selection that predates the removal of a
    /// preset.
    #[error("Unknown preset `{label}` for {endpoint}")]
    UnknownPreset { endpoint: EndpointKey, label: String },

    /// No profile with this name exists.
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    /// Selections were changed before saved selections finished replaying.
    #[error("Saved selections are still being restored")]
    NotReady,

    /// Error occurred while reading or writing a file.
    #[error("Failed to access file: {0}")]
    FileAccessFailed(#[from] std::io::Error),

    /// Error occurred while encoding or decoding JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The test request could not be completed.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The dashboard base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
