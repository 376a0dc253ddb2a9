//! Canvas configuration.

use crate::model::GridSize;
use serde::{Deserialize, Serialize};

/// Dimensions of the dashboard canvas and the widgets on it.
///
/// Missing fields fall back to their defaults when loaded from JSON, so a
/// host only has to spell out what differs on its display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of one grid unit in pixels. Default: **16.0**.
    pub grid_unit_px: f32,

    /// Visible columns. Default: **20**.
    pub viewport_cols: i32,

    /// Visible rows. Default: **12**.
    pub viewport_rows: i32,

    /// Smallest size a resize may shrink a widget to. Default: **2×2**.
    pub min_widget_size: GridSize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_unit_px: 16.0,
            viewport_cols: 20,
            viewport_rows: 12,
            min_widget_size: GridSize::new(2, 2),
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON config object.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or a dimension is not
    /// positive.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid canvas config: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if !(self.grid_unit_px.is_finite() && self.grid_unit_px > 0.0) {
            return Err(format!(
                "grid_unit_px must be positive, got {}",
                self.grid_unit_px
            ));
        }
        if self.viewport_cols <= 0 || self.viewport_rows <= 0 {
            return Err(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_cols, self.viewport_rows
            ));
        }
        if self.min_widget_size.width_units <= 0 || self.min_widget_size.height_units <= 0 {
            return Err("min_widget_size must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CanvasConfig::from_json(r#"{ "viewport_cols": 32 }"#).unwrap();
        assert_eq!(
            config,
            CanvasConfig {
                viewport_cols: 32,
                ..CanvasConfig::default()
            }
        );
    }

    #[test]
    fn rejects_non_positive_unit() {
        let err = CanvasConfig::from_json(r#"{ "grid_unit_px": 0 }"#).unwrap_err();
        assert!(err.contains("grid_unit_px"), "unexpected message: {err}");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = CanvasConfig::from_json("{ viewport_cols: }").unwrap_err();
        assert!(err.starts_with("invalid canvas config"));
    }
}
