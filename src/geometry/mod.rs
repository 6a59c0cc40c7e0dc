//! Pure geometry: maps requested settings and a container rectangle to the
//! inline CSS values the applier writes. No state, no side effects.

use crate::transform::settings::TransformSettings;

/// The inline style properties the controller touches. The order is the
/// capture/restore order and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Position,
    Top,
    Left,
    Width,
    Height,
    ObjectFit,
    ZIndex,
    TransformOrigin,
    Transform,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 9] = [
        StyleProperty::Position,
        StyleProperty::Top,
        StyleProperty::Left,
        StyleProperty::Width,
        StyleProperty::Height,
        StyleProperty::ObjectFit,
        StyleProperty::ZIndex,
        StyleProperty::TransformOrigin,
        StyleProperty::Transform,
    ];

    pub fn css_name(&self) -> &'static str {
        match self {
            StyleProperty::Position => "position",
            StyleProperty::Top => "top",
            StyleProperty::Left => "left",
            StyleProperty::Width => "width",
            StyleProperty::Height => "height",
            StyleProperty::ObjectFit => "object-fit",
            StyleProperty::ZIndex => "z-index",
            StyleProperty::TransformOrigin => "transform-origin",
            StyleProperty::Transform => "transform",
        }
    }
}

/// The element's bounding rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An ordered batch of inline style writes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleUpdate {
    entries: Vec<(StyleProperty, String)>,
}

impl StyleUpdate {
    fn push(&mut self, property: StyleProperty, value: impl Into<String>) {
        self.entries.push((property, value.into()));
    }

    pub fn entries(&self) -> &[(StyleProperty, String)] {
        &self.entries
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }
}

/// Formats a number the way a JS template literal would: integral values
/// print without a decimal point, so the emitted CSS matches what the host
/// page's own tooling shows.
fn fmt_num(value: f64) -> String {
    format!("{}", value)
}

/// Scale factor that keeps a quarter-turned element inside its original
/// container. Rotating a non-square element by 90/270 degrees swaps its
/// visual footprint's aspect ratio, so an uncompensated scale would overflow
/// or underflow the container on the rotated axis.
fn scale_to_fit(container: Rect) -> f64 {
    if container.width <= 0.0 || container.height <= 0.0 {
        // Degenerate rect: skip compensation rather than emit NaN.
        return 1.0;
    }
    (container.width / container.height).min(container.height / container.width)
}

/// Computes the inline styles for `settings` against `container`.
///
/// Returns `None` when the settings equal the identity value, meaning no
/// geometry is needed. `fullscreen` is a precondition supplied by the caller;
/// it forces the full-viewport layout the same way `fill` does, because the
/// viewport is the effective container while fullscreen is active.
///
/// The angle is expected to be pre-reduced modulo 360; the quarter-turn test
/// here is still negative-safe.
pub fn compute(
    settings: &TransformSettings,
    container: Rect,
    fullscreen: bool,
) -> Option<StyleUpdate> {
    if settings.is_identity() {
        return None;
    }

    let mut update = StyleUpdate::default();

    if settings.fill || fullscreen {
        let translate_x = -50.0 + settings.pan_x;
        let translate_y = -50.0 + settings.pan_y;

        update.push(StyleProperty::Position, "fixed");
        update.push(StyleProperty::Top, "50%");
        update.push(StyleProperty::Left, "50%");
        if settings.is_quarter_turn() {
            update.push(StyleProperty::Width, "100vh");
            update.push(StyleProperty::Height, "100vw");
        } else {
            update.push(StyleProperty::Width, "100vw");
            update.push(StyleProperty::Height, "100vh");
        }
        update.push(StyleProperty::ObjectFit, "cover");
        update.push(StyleProperty::ZIndex, "9999");
        update.push(StyleProperty::TransformOrigin, "center");
        update.push(
            StyleProperty::Transform,
            format!(
                "translate({}%, {}%) scale({}) rotate({}deg)",
                fmt_num(translate_x),
                fmt_num(translate_y),
                fmt_num(settings.zoom),
                settings.angle
            ),
        );
    } else {
        let final_scale = if settings.is_quarter_turn() {
            settings.zoom * scale_to_fit(container)
        } else {
            settings.zoom
        };

        update.push(StyleProperty::TransformOrigin, "center");
        update.push(
            StyleProperty::Transform,
            format!(
                "translate({}%, {}%) scale({}) rotate({}deg)",
                fmt_num(settings.pan_x),
                fmt_num(settings.pan_y),
                fmt_num(final_scale),
                settings.angle
            ),
        );
    }

    Some(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings(angle: i32, zoom: f64, fill: bool, pan_x: f64, pan_y: f64) -> TransformSettings {
        TransformSettings::new(angle, zoom, fill, pan_x, pan_y)
    }

    #[test]
    fn identity_needs_no_geometry() {
        assert_eq!(
            compute(&TransformSettings::IDENTITY, Rect::new(400.0, 200.0), false),
            None
        );
    }

    #[test]
    fn rotation_swap_law() {
        let container = Rect::new(400.0, 200.0);

        let at_90 = compute(&settings(90, 1.0, false, 0.0, 0.0), container, false).unwrap();
        assert_eq!(
            at_90.get(StyleProperty::Transform),
            Some("translate(0%, 0%) scale(0.5) rotate(90deg)")
        );

        let at_0 = compute(&settings(0, 1.0, false, 0.0, 5.0), container, false).unwrap();
        assert_eq!(
            at_0.get(StyleProperty::Transform),
            Some("translate(0%, 5%) scale(1) rotate(0deg)")
        );
    }

    #[test]
    fn quarter_turn_compensation_at_270() {
        let container = Rect::new(400.0, 200.0);
        let update = compute(&settings(270, 1.0, false, 0.0, 0.0), container, false).unwrap();
        assert_eq!(
            update.get(StyleProperty::Transform),
            Some("translate(0%, 0%) scale(0.5) rotate(270deg)")
        );
    }

    #[test]
    fn half_turn_keeps_scale() {
        let container = Rect::new(400.0, 200.0);
        let update = compute(&settings(180, 1.0, false, 0.0, 0.0), container, false).unwrap();
        assert_eq!(
            update.get(StyleProperty::Transform),
            Some("translate(0%, 0%) scale(1) rotate(180deg)")
        );
    }

    #[test]
    fn rotated_zoom_on_wide_container() {
        // 0.6 = 1.2 * min(400/200, 200/400)
        let container = Rect::new(400.0, 200.0);
        let update = compute(&settings(90, 1.2, false, 5.0, -5.0), container, false).unwrap();
        assert_eq!(
            update.get(StyleProperty::Transform),
            Some("translate(5%, -5%) scale(0.6) rotate(90deg)")
        );
        assert_eq!(update.get(StyleProperty::TransformOrigin), Some("center"));
        assert_eq!(update.get(StyleProperty::Position), None);
    }

    #[test]
    fn fill_mode_swaps_viewport_dimensions_under_quarter_turn() {
        let container = Rect::new(400.0, 200.0);

        for angle in [90, 270] {
            let update = compute(&settings(angle, 1.0, true, 0.0, 0.0), container, false).unwrap();
            assert_eq!(update.get(StyleProperty::Width), Some("100vh"));
            assert_eq!(update.get(StyleProperty::Height), Some("100vw"));
        }

        for angle in [0, 180] {
            let update = compute(&settings(angle, 2.0, true, 0.0, 0.0), container, false).unwrap();
            assert_eq!(update.get(StyleProperty::Width), Some("100vw"));
            assert_eq!(update.get(StyleProperty::Height), Some("100vh"));
        }
    }

    #[test]
    fn fill_mode_centers_then_pans() {
        let update = compute(
            &settings(0, 1.5, true, 10.0, -20.0),
            Rect::new(640.0, 360.0),
            false,
        )
        .unwrap();
        assert_eq!(update.get(StyleProperty::Position), Some("fixed"));
        assert_eq!(update.get(StyleProperty::Top), Some("50%"));
        assert_eq!(update.get(StyleProperty::Left), Some("50%"));
        assert_eq!(update.get(StyleProperty::ObjectFit), Some("cover"));
        assert_eq!(update.get(StyleProperty::ZIndex), Some("9999"));
        assert_eq!(
            update.get(StyleProperty::Transform),
            Some("translate(-40%, -70%) scale(1.5) rotate(0deg)")
        );
    }

    #[test]
    fn fullscreen_forces_viewport_layout_without_fill() {
        let update = compute(
            &settings(90, 1.0, false, 0.0, 0.0),
            Rect::new(1920.0, 1080.0),
            true,
        )
        .unwrap();
        assert_eq!(update.get(StyleProperty::Position), Some("fixed"));
        assert_eq!(update.get(StyleProperty::Width), Some("100vh"));
    }

    #[test]
    fn degenerate_container_skips_compensation() {
        let update = compute(
            &settings(90, 1.0, false, 0.0, 0.0),
            Rect::new(0.0, 0.0),
            false,
        )
        .unwrap();
        assert_eq!(
            update.get(StyleProperty::Transform),
            Some("translate(0%, 0%) scale(1) rotate(90deg)")
        );
    }
}
