use crate::transform::settings::TransformSettings;
use crate::utils::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(name = "video-overlay")]
#[command(about = "Overlay a rotation/zoom/pan/fill transform onto a simulated host page's video")]
#[command(long_about = "
Drives the transform state controller against an in-memory host page: applies
the requested geometry to the page's video element, then optionally simulates
the host page fighting back (inline style interference) or a client-side
navigation that replaces the video, and reports the element's resulting
inline styles.

EXAMPLES:
  # Quarter-turn with zoom and pan on a 400x200 container
  video-overlay --angle 90 --zoom 1.2 --pan-x 5 --pan-y -5 \\
      --container-width 400 --container-height 200

  # Fill the viewport and persist across simulated navigations
  video-overlay --angle 270 --fill --persist --simulate-navigation

  # Watch drift reconciliation race a hostile host page
  video-overlay --angle 90 --simulate-interference

  # Reset (identity values restore the original inline styles)
  video-overlay
")]
pub struct CliArgs {
    /// Rotation in degrees (negative values allowed)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub angle: i32,

    /// Zoom factor (must be positive)
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f64,

    /// Stretch the video to cover the full viewport
    #[arg(long)]
    pub fill: bool,

    /// Horizontal pan in percent of the element's width
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_x: f64,

    /// Vertical pan in percent of the element's height
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_y: f64,

    /// Persist the transform so it survives navigations
    #[arg(long)]
    pub persist: bool,

    /// Simulated page URL
    #[arg(long, default_value = "https://host.example/watch?v=demo")]
    pub url: String,

    /// Video container width in CSS pixels
    #[arg(long, default_value_t = 640.0)]
    pub container_width: f64,

    /// Video container height in CSS pixels
    #[arg(long, default_value_t = 360.0)]
    pub container_height: f64,

    /// Simulate the host page overwriting the inline transform
    #[arg(long)]
    pub simulate_interference: bool,

    /// Simulate a client-side navigation that replaces the video element
    #[arg(long)]
    pub simulate_navigation: bool,

    /// Configuration file path (defaults to overlay.yaml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the configured log level [trace, debug, info, warn, error]
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl CliArgs {
    pub fn validate(&self) -> Result<()> {
        if self.zoom <= 0.0 {
            return Err(Error::validation(format!(
                "Invalid zoom: {} (must be positive)",
                self.zoom
            )));
        }
        if self.container_width <= 0.0 || self.container_height <= 0.0 {
            return Err(Error::validation(
                "Container dimensions must be positive".to_string(),
            ));
        }
        if let Some(level) = &self.log_level {
            let valid = ["trace", "debug", "info", "warn", "error"];
            if !valid.contains(&level.to_lowercase().as_str()) {
                return Err(Error::validation(format!(
                    "Invalid log level: {} (valid levels: {})",
                    level,
                    valid.join(", ")
                )));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> TransformSettings {
        TransformSettings::new(self.angle, self.zoom, self.fill, self.pan_x, self.pan_y)
    }

    /// CLI override wins over the configured level.
    pub fn effective_log_level<'a>(&'a self, config_level: &'a str) -> &'a str {
        self.log_level.as_deref().unwrap_or(config_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("video-overlay").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_are_identity() {
        let args = parse(&[]);
        assert!(args.settings().is_identity());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn negative_pan_and_angle_parse() {
        let args = parse(&["--angle", "-90", "--pan-x", "-5", "--pan-y", "-10"]);
        assert_eq!(args.angle, -90);
        assert_eq!(args.pan_x, -5.0);
        assert_eq!(args.pan_y, -10.0);
    }

    #[test]
    fn zero_zoom_is_rejected() {
        let args = parse(&["--zoom", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let args = parse(&["--log-level", "loud"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn cli_level_overrides_config_level() {
        let args = parse(&["--log-level", "debug"]);
        assert_eq!(args.effective_log_level("info"), "debug");
        let args = parse(&[]);
        assert_eq!(args.effective_log_level("warn"), "warn");
    }
}
