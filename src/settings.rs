use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::TraceMode;

/// Default top of the power axis (dBm).
pub const DEFAULT_REF_LEVEL: f64 = 0.0;
/// Default bottom of the power axis (dBm).
pub const DEFAULT_MIN_LEVEL: f64 = -140.0;

// ---------------------------------------------------------------------------
// Plot settings – persisted as JSON
// ---------------------------------------------------------------------------

/// User-tunable plot and search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    /// Top of the power axis.
    pub ref_level: f64,
    /// Bottom of the power axis.
    pub min_level: f64,
    /// Margin above the noise floor a sample needs to count as a peak (dB).
    pub peak_threshold: f64,
    /// Delay between captures during playback.
    pub playback_interval_ms: u64,
    /// Draw mode of each trace slot.
    pub trace_draw_modes: Vec<TraceMode>,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            ref_level: DEFAULT_REF_LEVEL,
            min_level: DEFAULT_MIN_LEVEL,
            peak_threshold: 6.0,
            playback_interval_ms: 250,
            trace_draw_modes: TraceMode::DRAWABLE.to_vec(),
        }
    }
}

impl PlotSettings {
    /// Check the invariants a loaded file might violate.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.ref_level > self.min_level,
            "reference level ({}) must be above minimum level ({})",
            self.ref_level,
            self.min_level
        );
        ensure!(
            self.peak_threshold.is_finite(),
            "peak threshold must be a finite number"
        );
        ensure!(
            self.playback_interval_ms > 0,
            "playback interval must be positive"
        );
        ensure!(
            !self.trace_draw_modes.contains(&TraceMode::Blank),
            "Blank is not a draw mode"
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: PlotSettings = serde_json::from_str(&text).context("parsing settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serialising settings")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing settings to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        PlotSettings::default().validate().unwrap();
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: PlotSettings = serde_json::from_str(r#"{"peak_threshold": 10.0}"#).unwrap();
        assert_eq!(s.peak_threshold, 10.0);
        assert_eq!(s.min_level, DEFAULT_MIN_LEVEL);
        assert_eq!(s.trace_draw_modes.len(), 3);
    }

    #[test]
    fn inverted_levels_rejected() {
        let s = PlotSettings {
            ref_level: -150.0,
            ..PlotSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn blank_draw_mode_rejected() {
        let s = PlotSettings {
            trace_draw_modes: vec![TraceMode::Live, TraceMode::Blank],
            ..PlotSettings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("rusty-sweep-settings-{}.json", std::process::id()));
        let s = PlotSettings {
            peak_threshold: 3.5,
            ..PlotSettings::default()
        };
        s.save(&path).unwrap();
        let loaded = PlotSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, s);
    }
}
