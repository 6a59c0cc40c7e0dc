use crate::geometry::StyleProperty;
use crate::page::VideoHandle;

/// The video element's pre-existing inline styles, captured before the first
/// mutation of an occupancy so the overlay stays fully reversible.
///
/// Holds exactly the tracked properties, in their fixed order. Empty strings
/// are captured and restored verbatim; restoring an empty value removes the
/// inline override.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSnapshot {
    values: Vec<(StyleProperty, String)>,
}

impl StyleSnapshot {
    pub fn capture(video: &VideoHandle) -> Self {
        Self {
            values: StyleProperty::ALL
                .iter()
                .map(|p| (*p, video.inline_style(*p)))
                .collect(),
        }
    }

    /// Writes every tracked property back, byte for byte, as one batch.
    pub fn restore(&self, video: &VideoHandle) {
        video.write_styles(self.values.iter().map(|(p, v)| (*p, v.as_str())));
    }

    pub fn value(&self, property: StyleProperty) -> &str {
        self.values
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    }
}
