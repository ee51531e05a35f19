//! Toolbar configuration.

use serde::{Deserialize, Serialize};
use smol_str::format_smolstr;
use web_time::Duration;

use crate::error::{InlineError, Result};
use crate::marks::{Mark, MarkRegistry};
use crate::position::{DEFAULT_MIN_MARGIN_PX, DEFAULT_OFFSET_PX, PlacementOptions};
use crate::schedule::DEFAULT_DOUBLE_CLICK_DELAY;

/// Settings for one toolbar instance. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    /// Marks offered by the toolbar.
    pub enabled_marks: Vec<Mark>,
    /// Gap between the selection and the toolbar.
    pub toolbar_offset_px: f64,
    /// Minimum distance from the viewport edges.
    pub min_margin_px: f64,
    /// Delay before reading the selection after a double-click.
    pub double_click_delay_ms: u64,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            enabled_marks: Mark::ALL.to_vec(),
            toolbar_offset_px: DEFAULT_OFFSET_PX,
            min_margin_px: DEFAULT_MIN_MARGIN_PX,
            double_click_delay_ms: DEFAULT_DOUBLE_CLICK_DELAY.as_millis() as u64,
        }
    }
}

impl ToolbarConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| InlineError::Config(format_smolstr!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InlineError::Config(format_smolstr!("{}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("toolbar_offset_px", self.toolbar_offset_px),
            ("min_margin_px", self.min_margin_px),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(InlineError::Config(format_smolstr!(
                    "{} must be a non-negative number, got {}",
                    name,
                    value
                )));
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> MarkRegistry {
        MarkRegistry::new(self.enabled_marks.iter().copied())
    }

    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            offset_px: self.toolbar_offset_px,
            min_margin_px: self.min_margin_px,
        }
    }

    pub fn double_click_delay(&self) -> Duration {
        Duration::from_millis(self.double_click_delay_ms)
    }
}
