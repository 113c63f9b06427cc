use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tunables for the board locator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Gaussian sigma; 1.1 matches a 5x5 kernel
    pub blur_sigma: f32,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Passes of 3x3 dilation over the edge map
    pub dilate_iterations: u32,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub approx_epsilon_ratio: f64,
    /// Smallest accepted board area as a fraction of image area
    pub min_area_ratio: f64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 30.0,
            canny_high: 100.0,
            dilate_iterations: 2,
            approx_epsilon_ratio: 0.02,
            min_area_ratio: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Side length of the rectified board image
    pub board_size: u32,
    /// Cell margin is `max(1, block / cell_margin_divisor)`
    pub cell_margin_divisor: u32,
    pub locator: LocatorConfig,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            board_size: 512,
            cell_margin_divisor: 20,
            locator: LocatorConfig::default(),
        }
    }
}

impl RecognizerConfig {
    /// Load a JSON config file; missing fields fall back to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if config.board_size < 8 {
            anyhow::bail!("board_size must be at least 8, got {}", config.board_size);
        }
        if config.cell_margin_divisor == 0 {
            anyhow::bail!("cell_margin_divisor must be positive");
        }

        Ok(config)
    }
}
