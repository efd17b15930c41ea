use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use config::HttpMethod;
use kernel::domain::Override;
use std::path::{Path, PathBuf};

/// mockdeck: preset switchboard for mocked APIs
///
/// Pick, per endpoint, between the real network and one of its canned
/// response presets, apply whole profiles at once, and keep the selection
/// across restarts.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// Defaults to `mockdeck.toml` in the working directory when present.
    #[arg(short, long, value_parser = validate_file)]
    pub config: Option<PathBuf>,

    /// File to load and save preset selections to.
    ///
    /// Overrides `persistence.selections_path` from the configuration.
    #[arg(short, long, conflicts_with = "ephemeral")]
    pub state: Option<PathBuf>,

    /// Keep selections in memory only.
    #[arg(short, long)]
    pub ephemeral: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Write a sample configuration file.
    Init {
        #[arg(default_value = "mockdeck.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },

    /// List endpoints, their presets and the active choice.
    Endpoints,

    /// Select a preset (or `real-api`) for one endpoint.
    Set {
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        path: String,
        preset: String,

        /// JSON object merged over the preset's payload.
        #[arg(long = "override", value_parser = parse_override)]
        override_with: Option<Override>,
    },

    /// Send one endpoint back to the real network.
    ResetEndpoint {
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        path: String,
    },

    /// Send every endpoint back to the real network.
    Reset,

    /// List available profiles.
    Profiles,

    /// Apply a profile (`default` resets everything).
    Profile { name: String },

    /// Show what a request to an endpoint would receive.
    Resolve {
        #[arg(value_parser = parse_method)]
        method: HttpMethod,
        path: String,
    },

    /// Send test requests; every endpoint when none is given.
    Test {
        #[arg(value_parser = parse_method, requires = "path")]
        method: Option<HttpMethod>,
        path: Option<String>,
    },

    /// Restore selections and keep running.
    ///
    /// SIGUSR1 prints the live status, SIGUSR2 reloads the configuration and
    /// restores selections again, Ctrl-C exits.
    Watch,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

#[inline(always)]
fn parse_method(method: &str) -> Result<HttpMethod, String> {
    method.parse().map_err(|err: config::Error| err.to_string())
}

/// The override must be a JSON object.
fn parse_override(raw: &str) -> Result<Override, String> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err("override must be a JSON object".to_string()),
        Err(err) => Err(format!("override is not valid JSON: {err}")),
    }
}
