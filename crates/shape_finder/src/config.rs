use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{DetectError, Result};

/// Size thresholds and switches for one detection call.
///
/// The value is passed into every call, so callers can retune thresholds between
/// runs without rebuilding the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorConfig {
    /// Smallest accepted contour area as a fraction of the image area
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_area_ratio: f64,
    /// Largest accepted contour area as a fraction of the image area
    #[schemars(range(min = 0.0, max = 1.0))]
    pub max_area_ratio: f64,
    /// Smallest accepted contour area in pixels²
    pub min_absolute_area: u32,
    /// Log every rejected contour and render a debug overlay
    pub debug: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: 0.0001, // 0.01% of the image
            max_area_ratio: 0.4,
            min_absolute_area: 50,
            debug: false,
        }
    }
}

impl DetectorConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_area_ratio", self.min_area_ratio),
            ("max_area_ratio", self.max_area_ratio),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DetectError::InvalidConfig(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }

        if self.min_area_ratio > self.max_area_ratio {
            return Err(DetectError::InvalidConfig(format!(
                "min_area_ratio {} exceeds max_area_ratio {}",
                self.min_area_ratio, self.max_area_ratio
            )));
        }

        Ok(())
    }

    /// Get the JSON schema for the configuration
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DetectorConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_absolute_area, 50);
        assert!(!config.debug);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let config = DetectorConfig {
            min_area_ratio: 0.5,
            max_area_ratio: 0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DetectError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_non_finite_ratio() {
        let config = DetectorConfig {
            max_area_ratio: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetectorConfig {
            min_area_ratio: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DetectorConfig = serde_json::from_str(r#"{"min_absolute_area": 10}"#).unwrap();
        assert_eq!(config.min_absolute_area, 10);
        assert_eq!(config.max_area_ratio, 0.4);
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(DetectorConfig::schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("min_area_ratio").is_some());
        assert!(properties.get("debug").is_some());
    }
}
