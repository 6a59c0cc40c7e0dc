//! Seam between the controller and the uncontrolled host page.
//!
//! The controller never owns the page lifecycle; it observes the current URL,
//! queries for the single video element, and subscribes to the page's style
//! mutation and fullscreen transition streams. `SimulatedPage` is the
//! in-memory implementation used by the demo binary and the test suite; a
//! browser binding would implement the same trait.

pub mod simulated;

pub use simulated::SimulatedPage;

use crate::geometry::{Rect, StyleProperty, StyleUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Signal that the video element's `style` attribute changed. Observers
/// re-read the element after a debounce rather than trusting the event
/// payload, so the signal itself carries no data.
#[derive(Debug, Clone, Copy)]
pub struct StyleMutation;

/// A fullscreen transition. All vendor-prefixed platform events are expected
/// to funnel into this one stream.
#[derive(Debug, Clone, Copy)]
pub struct FullscreenChange {
    pub active: bool,
}

pub trait HostPage: Send + Sync + 'static {
    /// The page URL as currently observable. Polled for navigation detection.
    fn current_url(&self) -> String;

    /// The single video element, if one is attached right now.
    fn query_video(&self) -> Option<VideoHandle>;

    fn style_mutations(&self) -> broadcast::Receiver<StyleMutation>;

    fn fullscreen_changes(&self) -> broadcast::Receiver<FullscreenChange>;
}

#[derive(Debug)]
struct VideoState {
    inline_styles: HashMap<StyleProperty, String>,
    rect: Rect,
    decoded_width: u32,
    decoded_height: u32,
    fullscreen: bool,
}

/// Shared handle to one video element. Clones refer to the same element, the
/// way multiple DOM references do.
#[derive(Clone)]
pub struct VideoHandle {
    state: Arc<Mutex<VideoState>>,
    mutations: broadcast::Sender<StyleMutation>,
}

impl VideoHandle {
    pub fn new(
        rect: Rect,
        decoded_size: (u32, u32),
        mutations: broadcast::Sender<StyleMutation>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(VideoState {
                inline_styles: HashMap::new(),
                rect,
                decoded_width: decoded_size.0,
                decoded_height: decoded_size.1,
                fullscreen: false,
            })),
            mutations,
        }
    }

    /// Current inline value for `property`; empty string when no inline
    /// override is present, matching `element.style` reads.
    pub fn inline_style(&self, property: StyleProperty) -> String {
        let state = self.state.lock().unwrap();
        state
            .inline_styles
            .get(&property)
            .cloned()
            .unwrap_or_default()
    }

    /// Writes one inline property. An empty value removes the inline
    /// override. Fires a style mutation signal, including for the
    /// controller's own writes, the way a real attribute observer would.
    pub fn set_inline_style(&self, property: StyleProperty, value: &str) {
        {
            let mut state = self.state.lock().unwrap();
            if value.is_empty() {
                state.inline_styles.remove(&property);
            } else {
                state.inline_styles.insert(property, value.to_string());
            }
        }
        let _ = self.mutations.send(StyleMutation);
    }

    /// Writes a batch of properties as one mutation block with a single
    /// mutation signal, matching how batched attribute writes coalesce into
    /// one observer callback.
    pub fn write_styles<'a, I>(&self, entries: I)
    where
        I: IntoIterator<Item = (StyleProperty, &'a str)>,
    {
        {
            let mut state = self.state.lock().unwrap();
            for (property, value) in entries {
                if value.is_empty() {
                    state.inline_styles.remove(&property);
                } else {
                    state.inline_styles.insert(property, value.to_string());
                }
            }
        }
        let _ = self.mutations.send(StyleMutation);
    }

    pub fn apply_update(&self, update: &StyleUpdate) {
        self.write_styles(update.entries().iter().map(|(p, v)| (*p, v.as_str())));
    }

    pub fn bounding_rect(&self) -> Rect {
        self.state.lock().unwrap().rect
    }

    pub fn set_bounding_rect(&self, rect: Rect) {
        self.state.lock().unwrap().rect = rect;
    }

    pub fn decoded_size(&self) -> (u32, u32) {
        let state = self.state.lock().unwrap();
        (state.decoded_width, state.decoded_height)
    }

    pub fn set_decoded_size(&self, width: u32, height: u32) {
        let mut state = self.state.lock().unwrap();
        state.decoded_width = width;
        state.decoded_height = height;
    }

    /// A video is ready once it has decoded nonzero dimensions.
    pub fn is_ready(&self) -> bool {
        self.state.lock().unwrap().decoded_width > 0
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.lock().unwrap().fullscreen
    }

    pub fn set_fullscreen(&self, active: bool) {
        self.state.lock().unwrap().fullscreen = active;
    }

    /// True when both handles refer to the same underlying element.
    pub fn same_element(&self, other: &VideoHandle) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Renders the current inline styles as a CSS declaration list, in the
    /// tracked property order. Used for reporting.
    pub fn inline_css(&self) -> String {
        let state = self.state.lock().unwrap();
        StyleProperty::ALL
            .iter()
            .filter_map(|p| {
                state
                    .inline_styles
                    .get(p)
                    .map(|v| format!("{}: {}", p.css_name(), v))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}
