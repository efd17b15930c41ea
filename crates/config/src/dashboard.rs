#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Dashboard {
    /// Origin that pass-through test requests are sent to.
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub timeout: Duration,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Dashboard {
    const MAX_TIMEOUT: Duration = Duration::from_secs(300);

    /// Keep the timeout within 1..=300 seconds.
    pub fn clamp(self) -> Self {
        Self {
            timeout: self.timeout.clamp(Duration::from_secs(1), Self::MAX_TIMEOUT),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamp_limits_timeout(secs in 0u64..10_000) {
            let dashboard = Dashboard { timeout: Duration::from_secs(secs), ..Dashboard::default() }.clamp();
            prop_assert!((1..=300).contains(&dashboard.timeout.as_secs()));
        }
    }
}
