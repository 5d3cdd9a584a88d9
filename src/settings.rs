/// runtime settings for polygrow
/// loaded from a JSON file next to the binary, defaults when missing
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::bounds::Bounds;
use crate::engine::DEFAULT_CANDIDATE_LIMIT;
use crate::error::{GrowError, Result};
use crate::scheduler::GrowthPolicy;

pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// largest canvas side accepted, in pixels
pub const MAX_CANVAS_SIDE: u32 = 1 << 15;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowSettings {
    // canvas / bounds
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// slack allowed when checking vertices against the canvas edge
    pub bounds_tolerance: f64,

    // growth
    /// scene to seed: "tri", "sponge", "halfrect" or "tiles"
    pub preset: String,
    pub policy: GrowthPolicy,
    /// delay between automatic growth steps
    pub tick_interval_ms: u64,
    /// soft cap on candidates per preview / stochastic search (None = no cap)
    pub candidate_limit: Option<usize>,
    pub rng_seed: u64,
    /// stop the headless run after this many applied steps (None = until exhausted)
    pub max_steps: Option<u64>,

    // output
    pub output_png: String,
    /// draw the remaining candidates as previews in the PNG
    pub draw_previews: bool,
}

impl Default for GrowSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1024.0,
            canvas_height: 768.0,
            bounds_tolerance: Bounds::DEFAULT_TOLERANCE,

            preset: "tri".to_owned(),
            policy: GrowthPolicy::Weighted,
            tick_interval_ms: 1,
            candidate_limit: Some(DEFAULT_CANDIDATE_LIMIT),
            rng_seed: 0xDEADBEEF,
            max_steps: Some(5_000),

            output_png: "polygrow.png".to_owned(),
            draw_previews: false,
        }
    }
}

impl GrowSettings {
    pub fn bounds(&self) -> Bounds {
        Bounds::canvas(self.canvas_width, self.canvas_height).with_tolerance(self.bounds_tolerance)
    }

    /// canvas size in whole pixels. errors on non-finite, sub-pixel or oversized dimensions.
    pub fn canvas_size(&self) -> Result<(u32, u32)> {
        let pixels = |name: &str, v: f64| {
            if v.is_finite() && v >= 1.0 && v.ceil() <= MAX_CANVAS_SIDE as f64 {
                Ok(v.ceil() as u32)
            } else {
                Err(GrowError::InvalidSettings(format!("{name} must be within 1..={MAX_CANVAS_SIDE}, got {v}")))
            }
        };
        Ok((pixels("canvas_width", self.canvas_width)?, pixels("canvas_height", self.canvas_height)?))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// load settings from a JSON file, or return defaults if it is missing or unreadable
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("failed to parse {}: {e}. using defaults.", path.display());
                    Self::default()
                }
            },
            // file doesn't exist or can't be read
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = GrowSettings {
            preset: "sponge".to_owned(),
            policy: GrowthPolicy::Stochastic { count: 10 },
            candidate_limit: None,
            ..GrowSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(GrowSettings::load(&path), settings);
    }

    #[test]
    fn test_missing_or_garbage_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(GrowSettings::load(&missing), GrowSettings::default());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert_eq!(GrowSettings::load(&garbage), GrowSettings::default());
    }

    #[test]
    fn test_canvas_size_rejects_unusable_dimensions() {
        let with = |w: f64, h: f64| GrowSettings { canvas_width: w, canvas_height: h, ..GrowSettings::default() };
        assert_eq!(GrowSettings::default().canvas_size().unwrap(), (1024, 768));
        assert_eq!(with(320.5, 200.0).canvas_size().unwrap(), (321, 200));
        for (w, h) in [(f64::NAN, 10.0), (-5.0, 10.0), (0.0, 10.0), (10.0, f64::INFINITY), (10.0, 1e12)] {
            let err = with(w, h).canvas_size().unwrap_err();
            assert!(matches!(err, GrowError::InvalidSettings(_)), "{w}x{h}");
        }
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "canvas_width": 320.0, "policy": "First" }"#).unwrap();
        let s = GrowSettings::load(&path);
        assert_eq!(s.canvas_width, 320.0);
        assert_eq!(s.policy, GrowthPolicy::First);
        assert_eq!(s.canvas_height, GrowSettings::default().canvas_height);
        assert_eq!(s.bounds().width(), 320.0);
    }
}
