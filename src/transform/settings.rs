use serde::{Deserialize, Serialize};

/// The requested overlay geometry for the current video.
///
/// Field names serialize in camelCase so the stored record keeps the
/// `{angle, zoom, fill, panX, panY}` shape the popup exchanges with the
/// content side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSettings {
    /// Rotation in degrees. Normalized to `[0, 360)` at the apply boundary.
    pub angle: i32,
    /// Scale factor, must be positive.
    pub zoom: f64,
    /// Stretch the element to cover the full viewport.
    pub fill: bool,
    /// Horizontal pan as a percentage of the element's own width.
    pub pan_x: f64,
    /// Vertical pan as a percentage of the element's own height.
    pub pan_y: f64,
}

impl TransformSettings {
    pub const IDENTITY: Self = Self {
        angle: 0,
        zoom: 1.0,
        fill: false,
        pan_x: 0.0,
        pan_y: 0.0,
    };

    pub fn new(angle: i32, zoom: f64, fill: bool, pan_x: f64, pan_y: f64) -> Self {
        Self {
            angle,
            zoom,
            fill,
            pan_x,
            pan_y,
        }
    }

    /// Equality with the identity value is what makes a request a reset.
    pub fn is_identity(&self) -> bool {
        self.angle == 0 && self.zoom == 1.0 && !self.fill && self.pan_x == 0.0 && self.pan_y == 0.0
    }

    /// Returns the same settings with the angle reduced to `[0, 360)`.
    /// `rem_euclid` keeps negative inputs well-defined (-90 becomes 270).
    pub fn normalized(&self) -> Self {
        Self {
            angle: self.angle.rem_euclid(360),
            ..*self
        }
    }

    /// True at 90 or 270 degrees, where the rotated footprint swaps its
    /// width and height relative to the container.
    pub fn is_quarter_turn(&self) -> bool {
        self.angle.rem_euclid(180) == 90
    }
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self::IDENTITY
    }
}
