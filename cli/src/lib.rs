use serde::Serialize;
use shape_finder::{Detection, DetectionStats, DetectorConfig};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    DetectError(#[from] shape_finder::DetectError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Load detector configuration from TOML string
pub fn config_from_toml(content: &str) -> Result<DetectorConfig, CliError> {
    let config: DetectorConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load detector configuration from JSON string
pub fn config_from_json(content: &str) -> Result<DetectorConfig, CliError> {
    let config: DetectorConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Auto-detect file format and load configuration
pub fn config_from_file<P: AsRef<Path>>(path: P) -> Result<DetectorConfig, CliError> {
    let path_ref = path.as_ref();
    match path_ref.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => config_from_toml(&fs::read_to_string(path_ref)?),
        Some("json") => config_from_json(&fs::read_to_string(path_ref)?),
        _ => Err(CliError::UnsupportedFileFormat),
    }
}

/// Convert a configuration to a TOML string
pub fn config_to_toml(config: &DetectorConfig) -> Result<String, CliError> {
    Ok(toml::to_string_pretty(config)?)
}

/// Command line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub min_area_ratio: Option<f64>,
    pub max_area_ratio: Option<f64>,
    pub min_absolute_area: Option<u32>,
    pub debug: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: DetectorConfig) -> Result<DetectorConfig, CliError> {
        if let Some(ratio) = self.min_area_ratio {
            config.min_area_ratio = ratio;
        }
        if let Some(ratio) = self.max_area_ratio {
            config.max_area_ratio = ratio;
        }
        if let Some(area) = self.min_absolute_area {
            config.min_absolute_area = area;
        }
        // A flag can switch debugging on, never off
        config.debug |= self.debug;

        config.validate()?;
        Ok(config)
    }
}

/// One detected shape as written to the JSON report
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShapeReport {
    pub rank: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub center: (u32, u32),
    pub shape_category: String,
    pub area: f64,
    pub circularity: f64,
    pub vertex_count: usize,
    pub aspect_ratio: f64,
    pub compactness: f64,
    pub extent: f64,
}

/// Machine-readable summary of one detection run
#[derive(Debug, Clone, Serialize)]
pub struct DetectionReport {
    pub input: String,
    pub image_width: u32,
    pub image_height: u32,
    pub strategy: String,
    pub warnings: Vec<String>,
    pub stats: DetectionStats,
    pub shapes: Vec<ShapeReport>,
}

impl DetectionReport {
    pub fn new(input: impl Into<String>, detection: &Detection) -> Self {
        let shapes = detection
            .regions
            .iter()
            .enumerate()
            .map(|(index, region)| ShapeReport {
                rank: index + 1,
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                center: region.center(),
                shape_category: region.shape_category.to_string(),
                area: region.descriptor.area,
                circularity: region.descriptor.circularity,
                vertex_count: region.descriptor.vertex_count,
                aspect_ratio: region.descriptor.aspect_ratio,
                compactness: region.descriptor.compactness,
                extent: region.descriptor.extent,
            })
            .collect();

        Self {
            input: input.into(),
            image_width: detection.image_width,
            image_height: detection.image_height,
            strategy: detection.strategy.clone(),
            warnings: detection.warnings.iter().map(|w| w.to_string()).collect(),
            stats: detection.stats,
            shapes,
        }
    }

    /// Convert the report to a JSON string
    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}
