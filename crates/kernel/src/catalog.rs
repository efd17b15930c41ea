#![forbid(unsafe_code)]

use crate::{
    Error,
    domain::{
        DEFAULT_PROFILE, EndpointKey, EndpointSpec, PresetChoice, PresetDescriptor, ProfileAction,
        ProfileDefinition,
    },
};
use config::Config;
use itertools::Itertools;
use std::collections::HashMap;
use tracing::debug;

/// Validated set of endpoints, presets and profiles.
///
/// Everything the runtime and the reconciler look up by key comes from
/// here; once built it never changes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    endpoints: Vec<EndpointSpec>,
    index: HashMap<EndpointKey, usize>,
    profiles: Vec<ProfileDefinition>,
    initial: Vec<(EndpointKey, String)>,
}

impl Catalog {
    pub fn new(
        endpoints: Vec<EndpointSpec>,
        profiles: Vec<ProfileDefinition>,
    ) -> Result<Self, Error> {
        if let Some(key) = endpoints.iter().map(|spec| &spec.key).duplicates().next() {
            return Err(invalid(format!("endpoint {key} is registered twice")));
        }

        for spec in &endpoints {
            if let Some(label) = spec.labels().duplicates().next() {
                return Err(invalid(format!(
                    "preset `{label}` is registered twice for {}",
                    spec.key
                )));
            }
            for preset in &spec.presets {
                validate_preset(&spec.key, preset)?;
            }
        }

        let index = endpoints
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.key.clone(), i))
            .collect();

        let catalog = Self {
            endpoints,
            index,
            profiles: Vec::new(),
            initial: Vec::new(),
        };

        if let Some(name) = profiles.iter().map(|p| p.name.as_str()).duplicates().next() {
            return Err(invalid(format!("profile `{name}` is defined twice")));
        }
        for profile in &profiles {
            catalog.validate_profile(profile)?;
        }

        debug!(
            endpoints = catalog.endpoints.len(),
            profiles = profiles.len(),
            "catalog registered"
        );
        Ok(Self { profiles, ..catalog })
    }

    /// Build the catalog described by the configuration file.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let endpoints = config
            .endpoints
            .iter()
            .map(|endpoint| {
                EndpointSpec::new(
                    EndpointKey::new(endpoint.method, endpoint.path.clone()),
                    endpoint
                        .presets
                        .iter()
                        .map(|p| PresetDescriptor::new(p.label.clone(), p.status, p.response.clone()))
                        .collect(),
                )
            })
            .collect();

        let profiles = config
            .profiles
            .iter()
            .map(|profile| {
                ProfileDefinition::new(
                    profile.name.clone(),
                    profile
                        .actions
                        .iter()
                        .map(|action| ProfileAction {
                            key: EndpointKey::new(action.method, action.path.clone()),
                            choice: PresetChoice::preset(action.preset.clone()),
                            override_with: action.override_with.clone(),
                        })
                        .collect(),
                )
            })
            .collect();

        let catalog = Self::new(endpoints, profiles)?;
        let initial = config
            .endpoints
            .iter()
            .filter_map(|endpoint| {
                let label = endpoint.initial.clone()?;
                Some((EndpointKey::new(endpoint.method, endpoint.path.clone()), label))
            })
            .collect();
        catalog.with_initial(initial)
    }

    /// Presets applied when a runtime is built from this catalog.
    pub fn with_initial(mut self, initial: Vec<(EndpointKey, String)>) -> Result<Self, Error> {
        for (key, label) in &initial {
            let spec = self.get(key).ok_or_else(|| Error::UnknownEndpoint(key.clone()))?;
            if spec.preset(label).is_none() {
                return Err(Error::UnknownPreset {
                    endpoint: key.clone(),
                    label: label.clone(),
                });
            }
        }
        self.initial = initial;
        Ok(self)
    }

    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    pub fn get(&self, key: &EndpointKey) -> Option<&EndpointSpec> {
        self.index.get(key).map(|&i| &self.endpoints[i])
    }

    pub fn profiles(&self) -> &[ProfileDefinition] {
        &self.profiles
    }

    pub fn profile(&self, name: &str) -> Option<&ProfileDefinition> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    pub fn initial(&self) -> &[(EndpointKey, String)] {
        &self.initial
    }

    fn validate_profile(&self, profile: &ProfileDefinition) -> Result<(), Error> {
        if profile.name.trim().is_empty() {
            return Err(invalid("profile name must not be empty".into()));
        }
        if profile.name == DEFAULT_PROFILE {
            return Err(invalid(format!(
                "profile name `{DEFAULT_PROFILE}` is reserved for reset"
            )));
        }
        if profile.actions.is_empty() {
            return Err(invalid(format!("profile `{}` has no actions", profile.name)));
        }
        for action in &profile.actions {
            let Some(spec) = self.get(&action.key) else {
                return Err(invalid(format!(
                    "profile `{}` refers to unregistered endpoint {}",
                    profile.name, action.key
                )));
            };
            if let PresetChoice::Preset(label) = &action.choice {
                if spec.preset(label).is_none() {
                    return Err(invalid(format!(
                        "profile `{}` refers to unknown preset `{label}` of {}",
                        profile.name, action.key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn validate_preset(key: &EndpointKey, preset: &PresetDescriptor) -> Result<(), Error> {
    if preset.label.is_empty() {
        return Err(invalid(format!("{key} has a preset with an empty label")));
    }
    if preset.label == PresetChoice::REAL_API {
        return Err(invalid(format!(
            "{key}: `{}` is reserved for pass-through",
            PresetChoice::REAL_API
        )));
    }
    if !(100..=599).contains(&preset.status) {
        return Err(invalid(format!(
            "{key}: preset `{}` has invalid status {}",
            preset.label, preset.status
        )));
    }
    Ok(())
}

#[inline]
fn invalid(reason: String) -> Error {
    Error::InvalidCatalog(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HttpMethod;
    use serde_json::json;

    fn user() -> EndpointSpec {
        EndpointSpec::new(
            EndpointKey::new(HttpMethod::Get, "/api/user"),
            vec![
                PresetDescriptor::new("success", 200, json!({ "name": "John Doe" })),
                PresetDescriptor::new("error", 404, json!({ "error": "User not found" })),
            ],
        )
    }

    #[test]
    fn rejects_duplicate_endpoints() {
        let err = Catalog::new(vec![user(), user()], vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_reserved_and_duplicate_labels() {
        let mut spec = user();
        spec.presets.push(PresetDescriptor::new("real-api", 200, json!(null)));
        assert!(Catalog::new(vec![spec], vec![]).is_err());

        let mut spec = user();
        spec.presets.push(PresetDescriptor::new("success", 201, json!(null)));
        assert!(Catalog::new(vec![spec], vec![]).is_err());

        let mut spec = user();
        spec.presets[0].status = 42;
        assert!(Catalog::new(vec![spec], vec![]).is_err());
    }

    #[test]
    fn validates_profile_references() {
        let key = EndpointKey::new(HttpMethod::Get, "/api/user");
        let ok = ProfileDefinition::new(
            "happy",
            vec![
                ProfileAction::new(key.clone(), "success".into()),
                ProfileAction::new(key.clone(), PresetChoice::RealApi),
            ],
        );
        let catalog = Catalog::new(vec![user()], vec![ok]).unwrap();
        assert_eq!(catalog.profiles().len(), 1);
        assert!(catalog.profile("happy").is_some());

        let bad_preset =
            ProfileDefinition::new("sad", vec![ProfileAction::new(key.clone(), "missing".into())]);
        assert!(Catalog::new(vec![user()], vec![bad_preset]).is_err());

        let bad_endpoint = ProfileDefinition::new(
            "lost",
            vec![ProfileAction::new(
                EndpointKey::new(HttpMethod::Post, "/api/user"),
                "success".into(),
            )],
        );
        assert!(Catalog::new(vec![user()], vec![bad_endpoint]).is_err());

        let reserved =
            ProfileDefinition::new(DEFAULT_PROFILE, vec![ProfileAction::new(key, "success".into())]);
        assert!(Catalog::new(vec![user()], vec![reserved]).is_err());

        let empty = ProfileDefinition::new("empty", vec![]);
        assert!(Catalog::new(vec![user()], vec![empty]).is_err());
    }

    #[test]
    fn builds_from_sample_config() {
        let catalog = Catalog::from_config(&Config::sample()).unwrap();
        assert_eq!(catalog.endpoints().len(), 5);
        assert_eq!(catalog.profiles().len(), 2);
        assert_eq!(
            catalog.initial(),
            &[(EndpointKey::new(HttpMethod::Get, "/api/user"), "success".to_string())]
        );
    }

    #[test]
    fn initial_selection_must_exist() {
        let catalog = Catalog::new(vec![user()], vec![]).unwrap();
        let err = catalog
            .with_initial(vec![(EndpointKey::new(HttpMethod::Get, "/api/user"), "nope".into())])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownPreset { .. }));
    }
}
