//! YAML radar configuration loading.
//!
//! The on-disk format mirrors the station config files the radar products
//! ship with:
//!
//! ```yaml
//! image_size: [760, 600]
//! radar_center: [300, 300]
//! radar_zone: [30, 570]
//! color_velocity_pairs:
//!   - - [0, 224, 255]
//!     - -27.5
//!   - - [255, 0, 0]
//!     - 27.5
//! ```
//!
//! Extra keys are ignored; the analysis thresholds and the tie-break seed
//! can optionally be overridden from the same file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use meso_model::config::{Config, LegendEntry, RadarZone, Thresholds};

use crate::CliError;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    image_size: [u32; 2],
    radar_center: [i32; 2],
    radar_zone: [i32; 2],
    color_velocity_pairs: Vec<([u8; 3], f32)>,
    #[serde(default)]
    gray_scale_unit: Option<u8>,
    #[serde(default)]
    rng_seed: Option<u64>,
    #[serde(default)]
    thresholds: Option<Thresholds>,
}

/// Reads and validates a radar configuration file.
pub fn load(path: &Path) -> Result<Config, CliError> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

fn parse(text: &str) -> Result<Config, CliError> {
    let raw: ConfigFile = serde_yaml::from_str(text)?;

    let legend: Vec<LegendEntry> = raw
        .color_velocity_pairs
        .iter()
        .map(|&(color, velocity)| LegendEntry { color, velocity })
        .collect();

    let mut config = Config::new(
        (raw.image_size[0], raw.image_size[1]),
        (raw.radar_center[0], raw.radar_center[1]),
        RadarZone {
            min: raw.radar_zone[0],
            max: raw.radar_zone[1],
        },
        legend,
    );
    if let Some(unit) = raw.gray_scale_unit {
        config.gray_scale_unit = unit;
    }
    if let Some(seed) = raw.rng_seed {
        config.rng_seed = seed;
    }
    if let Some(thresholds) = raw.thresholds {
        config.thresholds = thresholds;
    }
    config.validate()?;
    Ok(config)
}
