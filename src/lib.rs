pub mod capture;
pub mod geometry;
pub mod pipeline;
pub mod segmentation;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

/// Global configuration that can be atomically swapped at runtime
pub static CONFIG: once_cell::sync::Lazy<ArcSwap<Config>> =
    once_cell::sync::Lazy::new(|| ArcSwap::from_pointee(Config::default()));

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub segmentation: SegmentationConfig,
    pub frustum: FrustumConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Metric range mapped onto the false-color depth palette
    pub palette_near_m: f32,
    pub palette_far_m: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Object labels kept from the model output; everything else is dropped
    pub include_labels: Vec<String>,
    /// Blend weight of the filled masks over the color image
    pub overlay_alpha: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    /// Depths (meters) at which the field-of-view wireframe is sampled
    pub sample_depths_m: Vec<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            segmentation: SegmentationConfig::default(),
            frustum: FrustumConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
            palette_near_m: 0.3,
            palette_far_m: 6.0,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            include_labels: vec!["person".to_string()],
            overlay_alpha: 0.5,
        }
    }
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            sample_depths_m: vec![1.0, 3.0, 5.0],
        }
    }
}

impl Config {
    /// Load configuration from an optional `argus.toml` next to the binary,
    /// overridable through `ARGUS_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("argus").required(false))
            .add_source(config::Environment::with_prefix("ARGUS").separator("__"))
            .build()?
            .try_deserialize()
    }
}
