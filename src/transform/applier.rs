use super::settings::TransformSettings;
use super::snapshot::StyleSnapshot;
use crate::geometry::{self, StyleProperty};
use crate::page::HostPage;
use crate::persistence::PersistenceGateway;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What an apply attempt amounted to. None of these are errors: a missing
/// element is recoverable (the watchdog retries), and a failed persistence
/// write never undoes the on-screen effect.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Geometry was written to the element; carries the settings as applied
    /// (angle normalized).
    Applied(TransformSettings),
    /// Identity settings: original styles restored, snapshot and stored
    /// record dropped.
    Reset,
    /// No video element is currently attached; nothing was mutated and no
    /// persistence call was made.
    NoTargetElement,
}

/// The only component that writes to the video element. Owns the snapshot
/// and the reset decision; orchestrates snapshot-then-mutate-then-persist.
pub struct TransformApplier {
    page: Arc<dyn HostPage>,
    snapshot: Option<StyleSnapshot>,
    last_applied: Option<TransformSettings>,
}

impl TransformApplier {
    pub fn new(page: Arc<dyn HostPage>) -> Self {
        Self {
            page,
            snapshot: None,
            last_applied: None,
        }
    }

    /// The settings most recently written to the element within this
    /// occupancy, used by drift detection. Never identity.
    pub fn last_applied(&self) -> Option<TransformSettings> {
        self.last_applied
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Occupancy change: the element this state referred to is gone, so the
    /// snapshot and the last-applied settings are both meaningless now.
    pub fn invalidate(&mut self) {
        self.snapshot = None;
        self.last_applied = None;
    }

    /// Applies `settings` to the current video element.
    ///
    /// The element mutation is one synchronous block; the persistence call
    /// afterwards is best-effort and never rolls the mutation back. Safe to
    /// invoke re-entrantly from any watchdog trigger: the element and the
    /// last-applied record always reflect the most recently completed call.
    pub async fn apply<G: PersistenceGateway>(
        &mut self,
        gateway: &G,
        settings: TransformSettings,
        persistence_enabled: bool,
    ) -> ApplyOutcome {
        let settings = settings.normalized();

        let Some(video) = self.page.query_video() else {
            debug!("no video element present; transform not applied");
            return ApplyOutcome::NoTargetElement;
        };

        if settings.is_identity() {
            if let Some(snapshot) = self.snapshot.take() {
                snapshot.restore(&video);
                info!("restored original video styles");
            }
            self.last_applied = None;
            // The stored record is cleared even when no snapshot was ever
            // captured in this occupancy.
            if let Err(err) = gateway.clear().await {
                warn!("failed to clear stored transform: {}", err);
            }
            return ApplyOutcome::Reset;
        }

        debug!(
            "applying transform: angle={}, zoom={}, fill={}, panX={}, panY={}",
            settings.angle, settings.zoom, settings.fill, settings.pan_x, settings.pan_y
        );

        // Capture once per occupancy, before the first mutation, so the
        // controller's own writes can never pollute the originals.
        if self.snapshot.is_none() {
            self.snapshot = Some(StyleSnapshot::capture(&video));
            debug!("captured original video styles");
        }

        let fullscreen = video.is_fullscreen();
        let container = video.bounding_rect();
        if let Some(update) = geometry::compute(&settings, container, fullscreen) {
            video.apply_update(&update);
            info!(
                "applied transform: {}",
                update.get(StyleProperty::Transform).unwrap_or("")
            );
        }
        self.last_applied = Some(settings);

        if persistence_enabled {
            if let Err(err) = gateway.save(&settings).await {
                warn!("failed to persist transform: {}", err);
            }
        }

        ApplyOutcome::Applied(settings)
    }
}
