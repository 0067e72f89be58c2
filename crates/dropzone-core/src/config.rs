//! Engine configuration.
//!
//! Every field has a default, so an empty RON document (`()`) or a missing
//! file both produce the stock timings. Timings are stored in milliseconds
//! and exposed as [`Duration`]s through accessor methods.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    geom::Size,
};

/// Input state machine timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputCfg {
    /// Delay before a held modifier during a file drag counts as a hold.
    pub hold_delay_ms: u64,
    /// Maximum gap between two modifier taps for a double-tap.
    pub double_tap_ms: u64,
    /// Mouse-button poll interval while dragging.
    pub drag_poll_ms: u64,
    /// Re-query the drag payload on every modifier change during a drag.
    pub reevaluate_file_drag: bool,
}

impl Default for InputCfg {
    fn default() -> Self {
        Self {
            hold_delay_ms: 250,
            double_tap_ms: 350,
            drag_poll_ms: 100,
            reevaluate_file_drag: true,
        }
    }
}

impl InputCfg {
    /// How long the modifier must stay down during a file drag.
    pub fn hold_delay(&self) -> Duration {
        Duration::from_millis(self.hold_delay_ms)
    }
    /// Longest gap between the two taps.
    pub fn double_tap(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }
    /// Interval of the missed-release poll.
    pub fn drag_poll(&self) -> Duration {
        Duration::from_millis(self.drag_poll_ms)
    }
}

/// Shake recognizer thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShakeCfg {
    /// Sliding window length.
    pub window_ms: u64,
    /// Quiet period after a recognized shake.
    pub cooldown_ms: u64,
    /// Minimum number of samples inside the window.
    pub min_samples: usize,
    /// Minimum number of horizontal direction reversals.
    pub min_reversals: usize,
    /// Horizontal segments shorter than this are ignored.
    pub min_step: f64,
    /// Minimum summed horizontal travel of qualifying segments.
    pub min_total: f64,
}

impl Default for ShakeCfg {
    fn default() -> Self {
        Self {
            window_ms: 450,
            cooldown_ms: 800,
            min_samples: 4,
            min_reversals: 3,
            min_step: 8.0,
            min_total: 140.0,
        }
    }
}

impl ShakeCfg {
    /// Sliding window over which samples are kept.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
    /// Minimum time between two detections.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

/// Overlay controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayCfg {
    /// Delay between the last visibility reason clearing and the hide.
    pub hide_delay_ms: u64,
    /// Overlay width.
    pub width: f64,
    /// Overlay height.
    pub height: f64,
}

impl Default for OverlayCfg {
    fn default() -> Self {
        Self {
            hide_delay_ms: 250,
            width: 280.0,
            height: 240.0,
        }
    }
}

impl OverlayCfg {
    /// Delay between the last reason clearing and the hide.
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
    /// Overlay extent.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Placement engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementCfg {
    /// Gap kept from display edges and from the anchor window.
    pub margin: f64,
    /// Largest cursor distance at which an outside-window slot is accepted.
    pub max_distance: f64,
    /// Share of the display above which an anchor counts as large. Large
    /// anchors are placed like any other and only logged when no outside
    /// slot is within tolerance.
    pub large_anchor_ratio: f64,
    /// Offset between the cursor and near-cursor slots.
    pub cursor_offset: f64,
}

impl Default for PlacementCfg {
    fn default() -> Self {
        Self {
            margin: 12.0,
            max_distance: 360.0,
            large_anchor_ratio: 0.66,
            cursor_offset: 16.0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropzoneCfg {
    /// Input state machine timings.
    pub input: InputCfg,
    /// Shake recognition thresholds.
    pub shake: ShakeCfg,
    /// Overlay size and hide delay.
    pub overlay: OverlayCfg,
    /// Placement margins and tolerances.
    pub placement: PlacementCfg,
}

impl DropzoneCfg {
    /// Parse and validate a RON document.
    pub fn from_ron(text: &str) -> Result<Self> {
        let cfg: Self = ron::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_ron(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config_missing_using_defaults");
                Ok(Self::default())
            }
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Default config location: `<config dir>/dropzone/config.ron`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("dropzone").join("config.ron"))
    }

    /// Render as pretty RON.
    pub fn to_ron_pretty(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        let bad = |m: &str| Err(Error::InvalidConfig(m.to_string()));
        if self.shake.window_ms == 0 {
            return bad("shake.window_ms must be > 0");
        }
        if self.shake.min_samples < 2 {
            return bad("shake.min_samples must be >= 2");
        }
        if self.shake.min_step < 0.0 || self.shake.min_total < 0.0 {
            return bad("shake thresholds must be non-negative");
        }
        if self.input.drag_poll_ms == 0 {
            return bad("input.drag_poll_ms must be > 0");
        }
        if self.overlay.width <= 0.0 || self.overlay.height <= 0.0 {
            return bad("overlay size must be positive");
        }
        if self.placement.margin < 0.0 || self.placement.cursor_offset < 0.0 {
            return bad("placement margin and offset must be non-negative");
        }
        if !(self.placement.large_anchor_ratio > 0.0 && self.placement.large_anchor_ratio <= 1.0) {
            return bad("placement.large_anchor_ratio must be in (0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = DropzoneCfg::from_ron("()").expect("parse");
        assert_eq!(cfg, DropzoneCfg::default());
        assert_eq!(cfg.input.hold_delay(), Duration::from_millis(250));
        assert_eq!(cfg.shake.window(), Duration::from_millis(450));
        assert_eq!(cfg.overlay.size(), Size::new(280.0, 240.0));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = DropzoneCfg::from_ron("(shake: (min_total: 200.0), placement: (margin: 4.0))")
            .expect("parse");
        assert_eq!(cfg.shake.min_total, 200.0);
        assert_eq!(cfg.shake.min_reversals, 3);
        assert_eq!(cfg.placement.margin, 4.0);
        assert_eq!(cfg.placement.max_distance, 360.0);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = DropzoneCfg::from_ron("(overlay: (width: 0.0))").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = DropzoneCfg::from_ron("(placement: (large_anchor_ratio: 1.5))").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn syntax_errors_surface_as_parse_errors() {
        let err = DropzoneCfg::from_ron("(input: ").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn render_then_parse_is_stable() {
        let cfg = DropzoneCfg::default();
        let text = cfg.to_ron_pretty().expect("render");
        assert_eq!(DropzoneCfg::from_ron(&text).expect("parse"), cfg);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = Path::new("/nonexistent/dropzone/config.ron");
        assert_eq!(DropzoneCfg::load(path).expect("load"), DropzoneCfg::default());
    }
}
