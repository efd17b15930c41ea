#![forbid(unsafe_code)]

mod endpoint;
mod preset;
mod profile;
mod selection;
mod status;

pub use config::HttpMethod;
pub use endpoint::{EndpointKey, EndpointSpec};
pub use preset::{PresetChoice, PresetDescriptor};
pub use profile::{DEFAULT_PROFILE, ProfileAction, ProfileDefinition};
pub use selection::{Override, SelectionRecord};
pub use status::{LiveStatus, MockingStatus, StatusChange};
