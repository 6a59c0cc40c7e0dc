//! One controller instance per page context: owns the mutable state the
//! watchdog and the inbound commands share, and wires both together.

use crate::config::WatchdogConfig;
use crate::page::HostPage;
use crate::persistence::PersistenceGateway;
use crate::transform::applier::{ApplyOutcome, TransformApplier};
use crate::transform::settings::TransformSettings;
use crate::watchdog::{self, WatchdogHandle};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Answer to the `get_settings` query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingsReport {
    pub settings: TransformSettings,
    /// True iff the remembered settings differ from identity.
    pub has_settings: bool,
}

/// Everything mutable the controller tracks for the current page context.
/// All access serializes on one async mutex; see the concurrency notes on
/// [`TransformApplier::apply`].
pub struct ControllerState {
    pub(crate) applier: TransformApplier,
    /// Settings remembered for the `get_settings` query and navigation
    /// reapplies. Updated only when persistence is enabled at apply time.
    pub(crate) saved_settings: TransformSettings,
    pub(crate) has_settings: bool,
    pub(crate) persistence_enabled: bool,
    /// Last observed page URL; identifies the current occupancy.
    pub(crate) last_url: Option<String>,
    /// Drift reapplies spent in this occupancy.
    pub(crate) drift_reapplies: u32,
    /// Set once the drift budget is exhausted; cleared on occupancy change
    /// or an explicit transform command.
    pub(crate) drift_exhausted: bool,
}

pub struct Controller<G: PersistenceGateway> {
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    watchdog_config: WatchdogConfig,
}

impl<G: PersistenceGateway> Controller<G> {
    pub fn new(page: Arc<dyn HostPage>, gateway: Arc<G>, watchdog_config: WatchdogConfig) -> Self {
        let state = ControllerState {
            applier: TransformApplier::new(page.clone()),
            saved_settings: TransformSettings::IDENTITY,
            has_settings: false,
            persistence_enabled: false,
            last_url: None,
            drift_reapplies: 0,
            drift_exhausted: false,
        };
        Self {
            page,
            gateway,
            state: Arc::new(Mutex::new(state)),
            watchdog_config,
        }
    }

    /// Loads the stored preference and record into memory, so queries and
    /// the first navigation poll reflect the previous session.
    pub async fn hydrate(&self) {
        let preference = match self.gateway.load_preference().await {
            Ok(p) => p.unwrap_or(false),
            Err(err) => {
                warn!("failed to load persistence preference: {}", err);
                false
            }
        };
        let record = match self.gateway.load().await {
            Ok(r) => r,
            Err(err) => {
                warn!("failed to load stored transform: {}", err);
                None
            }
        };

        let mut state = self.state.lock().await;
        state.persistence_enabled = preference;
        if let Some(settings) = record.map(|s| s.normalized()).filter(|s| !s.is_identity()) {
            state.saved_settings = settings;
            state.has_settings = true;
            debug!("hydrated stored transform: {:?}", settings);
        }
    }

    /// Starts the watchdog tasks. The returned handle aborts them on drop.
    pub fn start(&self) -> WatchdogHandle {
        watchdog::spawn(
            self.page.clone(),
            self.gateway.clone(),
            self.state.clone(),
            self.watchdog_config.clone(),
        )
    }

    /// Inbound `transform` command. Acknowledges (returns) only after the
    /// apply attempt, including any persistence write, has completed.
    pub async fn transform(&self, settings: TransformSettings, persist: bool) -> ApplyOutcome {
        let settings = settings.normalized();
        let mut state = self.state.lock().await;

        state.persistence_enabled = persist;

        // A fresh user intent resets the drift give-up state.
        state.drift_reapplies = 0;
        state.drift_exhausted = false;

        let outcome = state
            .applier
            .apply(self.gateway.as_ref(), settings, persist)
            .await;

        match &outcome {
            ApplyOutcome::Applied(applied) if persist => {
                state.saved_settings = *applied;
                state.has_settings = true;
            }
            ApplyOutcome::Reset => {
                state.saved_settings = TransformSettings::IDENTITY;
                state.has_settings = false;
            }
            _ => {}
        }

        outcome
    }

    /// Inbound `get_settings` query.
    pub async fn get_settings(&self) -> SettingsReport {
        let state = self.state.lock().await;
        SettingsReport {
            settings: state.saved_settings,
            has_settings: state.has_settings,
        }
    }

    /// Inbound `set_persistence` command. Disabling clears the stored record
    /// eagerly; the on-screen transform is left alone either way.
    pub async fn set_persistence(&self, enabled: bool) {
        self.state.lock().await.persistence_enabled = enabled;

        if let Err(err) = self.gateway.save_preference(enabled).await {
            warn!("failed to store persistence preference: {}", err);
        }
        if !enabled {
            if let Err(err) = self.gateway.clear().await {
                warn!("failed to clear stored transform: {}", err);
            }
        }
        debug!("persistence preference updated: {}", enabled);
    }
}
