//! Keeps the applied transform alive against the host page: URL polling for
//! navigation-triggered video replacement, style-attribute observation for
//! host interference, and fullscreen transitions. All three triggers funnel
//! into `TransformApplier::apply` behind the shared state mutex, which is
//! the single serialization point.

use crate::config::WatchdogConfig;
use crate::controller::ControllerState;
use crate::geometry::StyleProperty;
use crate::page::HostPage;
use crate::persistence::PersistenceGateway;
use crate::transform::settings::TransformSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

/// Owns the watchdog tasks; they are aborted when the handle drops.
pub struct WatchdogHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl WatchdogHandle {
    pub fn shutdown(mut self) {
        self.abort_all();
    }

    fn abort_all(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.tasks.clear();
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        self.abort_all();
    }
}

pub fn spawn<G: PersistenceGateway>(
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    config: WatchdogConfig,
) -> WatchdogHandle {
    let tasks = vec![
        tokio::spawn(navigation_poll(
            page.clone(),
            gateway.clone(),
            state.clone(),
            config.clone(),
        )),
        tokio::spawn(drift_watch(
            page.clone(),
            gateway.clone(),
            state.clone(),
            config.clone(),
        )),
        tokio::spawn(fullscreen_watch(page, gateway, state, config)),
    ];
    WatchdogHandle { tasks }
}

/// Polls the page URL; a change invalidates the occupancy and, when a
/// non-identity record is stored and persistence is on, schedules a bounded
/// reapply against the new video element.
async fn navigation_poll<G: PersistenceGateway>(
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    config: WatchdogConfig,
) {
    let mut ticker = interval(Duration::from_millis(config.poll_interval_ms));
    loop {
        ticker.tick().await;
        let url = page.current_url();

        let persistence_enabled;
        {
            let mut st = state.lock().await;
            if st.last_url.as_deref() == Some(url.as_str()) {
                continue;
            }
            let previous = st.last_url.replace(url.clone());
            st.applier.invalidate();
            st.drift_reapplies = 0;
            st.drift_exhausted = false;
            persistence_enabled = st.persistence_enabled;

            match previous {
                Some(old) => info!("navigation detected: {} -> {}", old, url),
                None => debug!("observing page: {}", url),
            }
        }

        if !persistence_enabled {
            debug!("persistence disabled; not reapplying to the new video");
            continue;
        }

        let record = match gateway.load().await {
            Ok(record) => record,
            Err(err) => {
                warn!("failed to load stored transform: {}", err);
                None
            }
        };
        let Some(saved) = record.map(|s| s.normalized()).filter(|s| !s.is_identity()) else {
            continue;
        };

        info!("reapplying stored transform to the new video: {:?}", saved);
        tokio::spawn(reapply_when_ready(
            page.clone(),
            gateway.clone(),
            state.clone(),
            config.clone(),
            url,
            saved,
        ));
    }
}

/// Bounded retry loop: waits for a video with nonzero decoded dimensions,
/// then applies. Gives up silently after the attempt cap. Each delayed
/// attempt re-checks the occupancy first so a stale retry can never mutate
/// a newer occupancy's element.
async fn reapply_when_ready<G: PersistenceGateway>(
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    config: WatchdogConfig,
    occupancy_url: String,
    settings: TransformSettings,
) {
    for attempt in 1..=config.reapply_attempts {
        sleep(Duration::from_millis(config.reapply_delay_ms)).await;

        if page.current_url() != occupancy_url {
            debug!("occupancy changed; dropping stale reapply");
            return;
        }

        let ready = page.query_video().map(|v| v.is_ready()).unwrap_or(false);
        if !ready {
            debug!("video not ready on attempt {}, retrying", attempt);
            continue;
        }

        let mut st = state.lock().await;
        // Re-check under the lock: a navigation may have won the race.
        if st.last_url.as_deref() != Some(occupancy_url.as_str()) {
            debug!("occupancy changed; dropping stale reapply");
            return;
        }
        let enabled = st.persistence_enabled;
        debug!("video ready on attempt {}, applying stored transform", attempt);
        st.applier.apply(gateway.as_ref(), settings, enabled).await;
        return;
    }
    warn!(
        "no ready video after {} attempts; stored transform not reapplied",
        config.reapply_attempts
    );
}

/// Watches style-attribute mutations. After a debounce, checks that the
/// element's transform still carries the applied geometry; if the host page
/// wiped it, reapplies the last-applied settings until the per-occupancy
/// budget runs out.
async fn drift_watch<G: PersistenceGateway>(
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    config: WatchdogConfig,
) {
    let mut mutations = page.style_mutations();
    loop {
        match mutations.recv().await {
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                debug!("style mutation stream lagged by {}", skipped);
                continue;
            }
            Err(RecvError::Closed) => break,
        }

        sleep(Duration::from_millis(config.drift_debounce_ms)).await;

        let mut st = state.lock().await;
        let Some(expected) = st.applier.last_applied() else {
            continue;
        };
        let Some(video) = page.query_video() else {
            continue;
        };

        let current = video.inline_style(StyleProperty::Transform);
        if transform_intact(&current) {
            continue;
        }

        if st.drift_exhausted {
            continue;
        }
        if st.drift_reapplies >= config.drift_reapply_limit {
            st.drift_exhausted = true;
            warn!(
                "host page keeps overwriting the transform; giving up after {} reapplies",
                st.drift_reapplies
            );
            continue;
        }
        st.drift_reapplies += 1;

        warn!(
            "host page overwrote the transform, reapplying ({}/{})",
            st.drift_reapplies, config.drift_reapply_limit
        );
        let enabled = st.persistence_enabled;
        st.applier.apply(gateway.as_ref(), expected, enabled).await;
    }
}

/// Every non-identity apply emits all three transform functions, so drift
/// shows up as any of them going missing.
fn transform_intact(current: &str) -> bool {
    current.contains("translate(") && current.contains("scale(") && current.contains("rotate(")
}

/// Fullscreen transitions change the element's effective container, so any
/// rotation-compensated scale is stale. Reload the record and reapply after
/// the platform has settled.
async fn fullscreen_watch<G: PersistenceGateway>(
    page: Arc<dyn HostPage>,
    gateway: Arc<G>,
    state: Arc<Mutex<ControllerState>>,
    config: WatchdogConfig,
) {
    let mut transitions = page.fullscreen_changes();
    loop {
        let change = match transitions.recv().await {
            Ok(change) => change,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        debug!("fullscreen transition (active={})", change.active);

        let record = match gateway.load().await {
            Ok(record) => record,
            Err(err) => {
                warn!("failed to load stored transform: {}", err);
                None
            }
        };

        sleep(Duration::from_millis(config.fullscreen_settle_ms)).await;

        let Some(saved) = record.map(|s| s.normalized()).filter(|s| !s.is_identity()) else {
            continue;
        };

        let mut st = state.lock().await;
        let enabled = st.persistence_enabled;
        st.applier.apply(gateway.as_ref(), saved, enabled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::page::SimulatedPage;
    use crate::persistence::MemoryStore;
    use crate::transform::applier::TransformApplier;
    use pretty_assertions::assert_eq;

    fn fast_config() -> WatchdogConfig {
        WatchdogConfig {
            poll_interval_ms: 50,
            reapply_attempts: 10,
            reapply_delay_ms: 20,
            drift_debounce_ms: 10,
            drift_reapply_limit: 3,
            fullscreen_settle_ms: 10,
        }
    }

    fn new_state(page: Arc<SimulatedPage>) -> Arc<Mutex<ControllerState>> {
        Arc::new(Mutex::new(ControllerState {
            applier: TransformApplier::new(page),
            saved_settings: TransformSettings::IDENTITY,
            has_settings: false,
            persistence_enabled: true,
            last_url: None,
            drift_reapplies: 0,
            drift_exhausted: false,
        }))
    }

    #[test]
    fn transform_intact_requires_all_three_functions() {
        assert!(transform_intact(
            "translate(5%, -5%) scale(0.6) rotate(90deg)"
        ));
        assert!(!transform_intact(""));
        assert!(!transform_intact("none"));
        assert!(!transform_intact("scale(1.2)"));
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_reapplies_once_the_new_video_is_ready() {
        let page = Arc::new(SimulatedPage::new("https://host.example/watch?v=1"));
        page.attach_video(Rect::new(400.0, 200.0), (1280, 720));
        let gateway = Arc::new(MemoryStore::new());
        let settings = TransformSettings::new(90, 1.2, false, 5.0, -5.0);
        gateway.save(&settings).await.unwrap();

        let state = new_state(page.clone());
        let handle = spawn(
            page.clone() as Arc<dyn HostPage>,
            gateway.clone(),
            state.clone(),
            fast_config(),
        );

        // Let the first poll observe the initial URL.
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Client-side navigation; the replacement video decodes later.
        page.navigate("https://host.example/watch?v=2");
        let video = page.attach_video(Rect::new(400.0, 200.0), (0, 0));
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(video.inline_style(StyleProperty::Transform), "");

        video.set_decoded_size(1920, 1080);
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert_eq!(
            video.inline_style(StyleProperty::Transform),
            "translate(5%, -5%) scale(0.6) rotate(90deg)"
        );
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn stale_retry_never_touches_a_newer_occupancy() {
        let page = Arc::new(SimulatedPage::new("https://host.example/watch?v=1"));
        page.attach_video(Rect::new(400.0, 200.0), (1280, 720));
        let gateway = Arc::new(MemoryStore::new());
        gateway
            .save(&TransformSettings::new(90, 1.2, false, 5.0, -5.0))
            .await
            .unwrap();

        let state = new_state(page.clone());
        let handle = spawn(
            page.clone() as Arc<dyn HostPage>,
            gateway.clone(),
            state.clone(),
            fast_config(),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;

        // First navigation: the retry loop starts against a not-ready video.
        page.navigate("https://host.example/watch?v=2");
        page.attach_video(Rect::new(400.0, 200.0), (0, 0));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second navigation before the retry resolves. Clear the record so
        // the new occupancy gets no reapply of its own; its video must stay
        // untouched even though it is ready.
        page.navigate("https://host.example/watch?v=3");
        gateway.clear().await.unwrap();
        let newest = page.attach_video(Rect::new(400.0, 200.0), (1920, 1080));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(newest.inline_style(StyleProperty::Transform), "");
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn drift_is_reconciled_after_the_debounce() {
        let page = Arc::new(SimulatedPage::new("https://host.example/watch?v=1"));
        let video = page.attach_video(Rect::new(400.0, 200.0), (1280, 720));
        let gateway = Arc::new(MemoryStore::new());
        let state = new_state(page.clone());

        let settings = TransformSettings::new(90, 1.2, false, 5.0, -5.0);
        state
            .lock()
            .await
            .applier
            .apply(gateway.as_ref(), settings, false)
            .await;

        let handle = spawn(
            page.clone() as Arc<dyn HostPage>,
            gateway.clone(),
            state.clone(),
            fast_config(),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Host page wipes the inline transform on its own re-render.
        video.set_inline_style(StyleProperty::Transform, "none");
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            video.inline_style(StyleProperty::Transform),
            "translate(5%, -5%) scale(0.6) rotate(90deg)"
        );
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn drift_reconciliation_gives_up_after_the_budget() {
        let page = Arc::new(SimulatedPage::new("https://host.example/watch?v=1"));
        let video = page.attach_video(Rect::new(400.0, 200.0), (1280, 720));
        let gateway = Arc::new(MemoryStore::new());
        let state = new_state(page.clone());

        let settings = TransformSettings::new(90, 1.0, false, 0.0, 0.0);
        state
            .lock()
            .await
            .applier
            .apply(gateway.as_ref(), settings, false)
            .await;

        let config = fast_config();
        let handle = spawn(
            page.clone() as Arc<dyn HostPage>,
            gateway.clone(),
            state.clone(),
            config.clone(),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The host fights back more times than the budget allows.
        for _ in 0..(config.drift_reapply_limit + 2) {
            video.set_inline_style(StyleProperty::Transform, "none");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let st = state.lock().await;
        assert!(st.drift_exhausted);
        assert_eq!(st.drift_reapplies, config.drift_reapply_limit);
        drop(st);

        // Terminal give-up state: the last overwrite stays.
        assert_eq!(video.inline_style(StyleProperty::Transform), "none");
        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn fullscreen_transition_recomputes_against_the_viewport() {
        let page = Arc::new(SimulatedPage::new("https://host.example/watch?v=1"));
        let video = page.attach_video(Rect::new(400.0, 200.0), (1280, 720));
        let gateway = Arc::new(MemoryStore::new());
        let settings = TransformSettings::new(90, 1.0, false, 0.0, 0.0);
        gateway.save(&settings).await.unwrap();

        let state = new_state(page.clone());
        state
            .lock()
            .await
            .applier
            .apply(gateway.as_ref(), settings, true)
            .await;
        assert_eq!(
            video.inline_style(StyleProperty::Transform),
            "translate(0%, 0%) scale(0.5) rotate(90deg)"
        );

        let handle = spawn(
            page.clone() as Arc<dyn HostPage>,
            gateway.clone(),
            state.clone(),
            fast_config(),
        );
        tokio::time::sleep(Duration::from_millis(20)).await;

        page.set_fullscreen(true, Some(Rect::new(1920.0, 1080.0)));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Fullscreen forces the viewport layout with swapped dimensions.
        assert_eq!(video.inline_style(StyleProperty::Position), "fixed");
        assert_eq!(video.inline_style(StyleProperty::Width), "100vh");
        assert_eq!(video.inline_style(StyleProperty::Height), "100vw");
        handle.shutdown();
    }
}
