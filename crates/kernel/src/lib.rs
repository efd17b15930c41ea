pub mod adapter;
pub mod catalog;
pub mod control;
pub mod dashboard;
pub mod domain;
mod error;
pub mod reconciler;
pub mod runtime;
pub mod store;

pub use adapter::{Interceptor, MockRegistry};
pub use catalog::Catalog;
pub use control::ControlSurface;
pub use dashboard::{Dashboard, ReqwestTransport, TestResult, Transport};
pub use error::Error;
pub use reconciler::{BootstrapReport, Phase, Reconciler};
pub use runtime::PresetRuntime;
pub use store::{JsonFileStore, MemoryStore, SelectionStore};
