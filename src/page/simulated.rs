//! In-memory host page with scripted navigation, video replacement, host
//! style interference and fullscreen transitions.

use super::{FullscreenChange, HostPage, StyleMutation, VideoHandle};
use crate::geometry::Rect;
use std::sync::Mutex;
use tokio::sync::broadcast;

struct PageState {
    url: String,
    video: Option<VideoHandle>,
}

pub struct SimulatedPage {
    state: Mutex<PageState>,
    style_tx: broadcast::Sender<StyleMutation>,
    fullscreen_tx: broadcast::Sender<FullscreenChange>,
}

impl SimulatedPage {
    pub fn new(url: &str) -> Self {
        let (style_tx, _) = broadcast::channel(64);
        let (fullscreen_tx, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(PageState {
                url: url.to_string(),
                video: None,
            }),
            style_tx,
            fullscreen_tx,
        }
    }

    /// Attaches a fresh video element and returns its handle. Replaces any
    /// previous element, the way a host page swaps players.
    pub fn attach_video(&self, rect: Rect, decoded_size: (u32, u32)) -> VideoHandle {
        let video = VideoHandle::new(rect, decoded_size, self.style_tx.clone());
        self.state.lock().unwrap().video = Some(video.clone());
        video
    }

    pub fn detach_video(&self) {
        self.state.lock().unwrap().video = None;
    }

    /// Client-side navigation: the URL changes; whether and when a new video
    /// element appears is up to the caller's script.
    pub fn navigate(&self, url: &str) {
        self.state.lock().unwrap().url = url.to_string();
    }

    /// Toggles fullscreen on the current video and fires the transition
    /// event, optionally with the viewport rect the element now occupies.
    pub fn set_fullscreen(&self, active: bool, viewport: Option<Rect>) {
        if let Some(video) = self.query_video() {
            video.set_fullscreen(active);
            if let Some(rect) = viewport {
                video.set_bounding_rect(rect);
            }
        }
        let _ = self.fullscreen_tx.send(FullscreenChange { active });
    }
}

impl HostPage for SimulatedPage {
    fn current_url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    fn query_video(&self) -> Option<VideoHandle> {
        self.state.lock().unwrap().video.clone()
    }

    fn style_mutations(&self) -> broadcast::Receiver<StyleMutation> {
        self.style_tx.subscribe()
    }

    fn fullscreen_changes(&self) -> broadcast::Receiver<FullscreenChange> {
        self.fullscreen_tx.subscribe()
    }
}
