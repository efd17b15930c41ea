#![forbid(unsafe_code)]

use crate::{
    Error,
    adapter::MockRegistry,
    domain::{
        DEFAULT_PROFILE, EndpointKey, LiveStatus, Override, PresetChoice, ProfileDefinition,
        SelectionRecord, StatusChange,
    },
    runtime::Subscription,
    store::SelectionStore,
};
use config::ResetPolicy;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Saved selections are being replayed; the write path is closed.
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapReport {
    pub applied: usize,
    pub failed: usize,
}

/// Keeps saved selections, the runtime and the live status view consistent.
///
/// Every change made through the reconciler is applied to the runtime and
/// then written to the store. Changes made to the runtime directly still
/// reach [`LiveStatus`] through the subscription but are not persisted.
pub struct Reconciler {
    registry: Arc<dyn MockRegistry>,
    store: Arc<dyn SelectionStore>,
    profiles: Vec<ProfileDefinition>,
    reset_policy: ResetPolicy,
    live: Arc<RwLock<LiveStatus>>,
    phase: RwLock<Phase>,
    /// Held for the whole replay and for each apply+persist sequence.
    write_lock: Mutex<()>,
    _subscription: Subscription,
}

impl Reconciler {
    pub fn new(
        registry: Arc<dyn MockRegistry>,
        store: Arc<dyn SelectionStore>,
        profiles: Vec<ProfileDefinition>,
        reset_policy: ResetPolicy,
    ) -> Self {
        let live = Arc::new(RwLock::new(LiveStatus::from(&registry.status())));
        let sink = Arc::clone(&live);
        let subscription = registry.subscribe(Arc::new(move |change: &StatusChange| {
            *sink.write() = LiveStatus::from(change);
        }));

        Self {
            registry,
            store,
            profiles,
            reset_policy,
            live,
            phase: RwLock::new(Phase::Loading),
            write_lock: Mutex::new(()),
            _subscription: subscription,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == Phase::Ready
    }

    pub fn live_status(&self) -> LiveStatus {
        self.live.read().clone()
    }

    pub fn registry(&self) -> &Arc<dyn MockRegistry> {
        &self.registry
    }

    pub fn profiles(&self) -> &[ProfileDefinition] {
        &self.profiles
    }

    /// Replay saved selections into the runtime, in order, one at a time.
    ///
    /// A selection that fails to apply is logged and skipped. The phase is
    /// `Ready` afterwards whatever happened. Calling this again starts a
    /// fresh cycle: the runtime goes back to its initial selections first, so
    /// nothing from the previous live state is merged in.
    pub async fn bootstrap(&self) -> BootstrapReport {
        self.cycle(false).await
    }

    /// Start a fresh cycle whatever the current phase.
    pub async fn rebootstrap(&self) -> BootstrapReport {
        self.cycle(true).await
    }

    async fn cycle(&self, force_fresh: bool) -> BootstrapReport {
        let _guard = self.write_lock.lock().await;

        let fresh_cycle = force_fresh || self.phase() == Phase::Ready;
        *self.phase.write() = Phase::Loading;
        if fresh_cycle {
            if let Err(err) = self.registry.restore_initial().await {
                warn!(%err, "failed to restore initial selections before replay");
            }
        }

        let report = self
            .replay()
            .instrument(info_span!("bootstrap", fresh_cycle))
            .await;

        *self.phase.write() = Phase::Ready;
        info!(applied = report.applied, failed = report.failed, "saved selections restored");
        report
    }

    async fn replay(&self) -> BootstrapReport {
        let mut report = BootstrapReport::default();
        for record in self.store.get_selections() {
            debug!(method = %record.method, path = %record.path, preset = %record.preset, "replaying");
            match self.registry.apply(&record).await {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(%err, "failed to apply saved preset");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Point `key` at `choice` and save it.
    pub async fn set_preset(&self, key: EndpointKey, choice: PresetChoice) -> Result<(), Error> {
        self.set_preset_with_override(key, choice, None).await
    }

    /// Like [`set_preset`](Self::set_preset), with a payload override.
    ///
    /// A single-endpoint change leaves the active profile behind, so the
    /// current profile is cleared.
    pub async fn set_preset_with_override(
        &self,
        key: EndpointKey,
        choice: PresetChoice,
        override_with: Option<Override>,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let _guard = self.write_lock.lock().await;
        self.apply_and_persist(SelectionRecord::new(key, choice).with_override(override_with))
            .await?;
        if self.registry.status().current_profile.is_some() {
            self.registry.set_current_profile(None).await?;
        }
        Ok(())
    }

    pub async fn reset_endpoint(&self, key: EndpointKey) -> Result<(), Error> {
        self.set_preset(key, PresetChoice::RealApi).await
    }

    /// Apply every action of the named profile in order as one batch.
    ///
    /// [`DEFAULT_PROFILE`] resets every endpoint instead.
    pub async fn activate_profile(&self, name: &str) -> Result<(), Error> {
        if name == DEFAULT_PROFILE {
            return self.reset().await;
        }
        self.ensure_ready()?;
        let profile = self
            .profiles
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| Error::UnknownProfile(name.to_owned()))?;

        let _guard = self.write_lock.lock().await;
        for action in &profile.actions {
            self.apply_and_persist(action.to_record()).await?;
        }
        self.registry
            .set_current_profile(Some(profile.name.clone()))
            .await?;
        info!(profile = name, actions = profile.actions.len(), "profile activated");
        Ok(())
    }

    /// Return every endpoint to pass-through.
    ///
    /// With [`ResetPolicy::Overwrite`] every saved selection and every
    /// intercepted endpoint is written as `real-api`, so the next start
    /// brings back neither. Initial selections from the catalog have no
    /// saved record of their own and are covered by the second group.
    pub async fn reset(&self) -> Result<(), Error> {
        self.ensure_ready()?;
        let _guard = self.write_lock.lock().await;
        let intercepted = self.registry.status().status;
        self.registry.reset().await?;

        if self.reset_policy == ResetPolicy::Overwrite {
            let mut stale: Vec<EndpointKey> = self
                .store
                .get_selections()
                .into_iter()
                .filter(|record| !record.preset.is_real_api() || record.override_with.is_some())
                .map(|record| record.key())
                .collect();
            for status in intercepted {
                if !stale.contains(&status.key) {
                    stale.push(status.key);
                }
            }
            for key in stale {
                self.store
                    .save_selection(SelectionRecord::new(key, PresetChoice::RealApi));
            }
        }
        info!(policy = ?self.reset_policy, "all endpoints reset");
        Ok(())
    }

    async fn apply_and_persist(&self, record: SelectionRecord) -> Result<(), Error> {
        self.registry.apply(&record).await?;
        self.store.save_selection(record);
        Ok(())
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        match self.phase() {
            Phase::Ready => Ok(()),
            Phase::Loading => Err(Error::NotReady),
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("phase", &self.phase())
            .field("live", &*self.live.read())
            .field("reset_policy", &self.reset_policy)
            .finish_non_exhaustive()
    }
}
