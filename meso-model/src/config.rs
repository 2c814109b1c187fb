//! Radar image configuration: legend, geometry, and analysis thresholds.

use serde::{Deserialize, Serialize};

use crate::result::{Error, Result};

/// Pixel-to-kilometer ratios for the radar products this detector is
/// calibrated against, keyed by image dimensions. Values are kilometers
/// covered by one pixel.
pub const PIXEL_KM_RATIOS: [((u32, u32), f32); 2] =
    [((1024, 768), 0.333333), ((760, 600), 0.425532)];

/// Looks up the kilometers-per-pixel ratio for an image size.
pub fn pixel_km_ratio(image_size: (u32, u32)) -> Option<f32> {
    PIXEL_KM_RATIOS
        .iter()
        .find(|(size, _)| *size == image_size)
        .map(|&(_, ratio)| ratio)
}

/// One legend entry: the rendered color and the radial velocity it encodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    /// Rendered RGB color of this velocity step.
    pub color: [u8; 3],
    /// Radial velocity in m/s; negative is motion toward the radar.
    pub velocity: f32,
}

/// The square analysis window of the scan, applied to both axes as the
/// half-open range `min..max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadarZone {
    /// Inclusive lower bound.
    pub min: i32,
    /// Exclusive upper bound.
    pub max: i32,
}

impl RadarZone {
    /// Whether `(x, y)` falls inside the zone.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.min <= x && x < self.max && self.min <= y && y < self.max
    }

    /// Row-major iteration over the zone, `x` outer and `y` inner. Every
    /// full-zone scan in the pipeline uses this order.
    pub fn coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let min = self.min;
        let max = self.max;
        (min..max).flat_map(move |x| (min..max).map(move |y| (x, y)))
    }
}

/// Unit of the mesocyclone center-distance threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    /// Threshold compared against raw pixel distance.
    #[default]
    Pixels,
    /// Threshold given in kilometers and converted through the
    /// [`PIXEL_KM_RATIOS`] table for the configured image size.
    Kilometers,
}

/// Analysis thresholds, frozen per run. Defaults are the calibrated values;
/// overriding them is for experimentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum connected-component size for an echo group to be trusted.
    pub small_group: usize,
    /// Maximum legend-index gap for stacking a small group on its support.
    pub layer_gap: f32,
    /// Minimum valid fraction of a small group's surround for averaging.
    pub valid_surround_ratio: f32,
    /// Minimum valid fraction of a base group's surround for fill inference.
    pub base_echo_surround_ratio: f32,
    /// Surround fraction deciding which sign a crossed group sits on.
    pub crossed_include_ratio: f32,
    /// Average layer gap marking a crossed group as velocity-folded.
    pub folded_gap: f32,
    /// Edge shear above which a small crossed group flips ownership.
    pub crossed_small_surround_gap: f32,
    /// Minimum opposite-sign fraction of all surround pixels for unfolding.
    pub opposite_surround: f32,
    /// Minimum opposite-sign fraction of valid surround pixels for unfolding.
    pub opposite_compose: f32,
    /// How many outermost layers may hold folded echo.
    pub folded_layer_num: usize,
    /// Minimum extremum-region area in pixels.
    pub area_min: usize,
    /// Maximum extremum-region area in pixels.
    pub area_max: usize,
    /// Maximum principal-axis elongation of an extremum region.
    pub narrow_max: f32,
    /// Minimum average immersion depth of an extremum region.
    pub avg_volume_min: f32,
    /// Maximum perimeter²/area of an extremum region.
    pub density_max: f32,
    /// Maximum average per-layer component count of an extremum region.
    pub layer_group_max: f32,
    /// Maximum distance between opposite-sign centroids, in
    /// [`Config::center_distance_unit`] units.
    pub center_distance: f32,
    /// Minimum average rotation speed of a candidate pair, m/s.
    pub meso_rotation: f32,
    /// Minimum valid-echo fraction inside the candidate disk.
    pub valid_echo_ratio: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            small_group: 35,
            layer_gap: 2.25,
            valid_surround_ratio: 0.28,
            base_echo_surround_ratio: 0.75,
            crossed_include_ratio: 0.79,
            folded_gap: 6.5,
            crossed_small_surround_gap: 4.45,
            opposite_surround: 0.1,
            opposite_compose: 0.98,
            folded_layer_num: 3,
            area_min: 10,
            area_max: 135,
            narrow_max: 4.25,
            avg_volume_min: 2.25,
            density_max: 75.0,
            layer_group_max: 1.75,
            center_distance: 6.0,
            meso_rotation: 9.5,
            valid_echo_ratio: 0.868,
        }
    }
}

/// Full configuration for one detection run. Read-only once constructed;
/// every stage receives it by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Input image dimensions `(width, height)` in pixels.
    pub image_size: (u32, u32),
    /// Pixel coordinates of the radar site in the image.
    pub radar_center: (i32, i32),
    /// Square analysis window on both axes.
    pub radar_zone: RadarZone,
    /// Ordered color/velocity legend; most-negative entry first, even length.
    pub legend: Vec<LegendEntry>,
    /// Channel step per legend index for grayscale rendering.
    pub gray_scale_unit: u8,
    /// Seed for the narrow-fill tie-break generator.
    pub rng_seed: u64,
    /// Unit of [`Thresholds::center_distance`].
    pub center_distance_unit: DistanceUnit,
    /// Analysis thresholds.
    pub thresholds: Thresholds,
}

impl Config {
    /// Creates a configuration with default unit, seed, and thresholds.
    pub fn new(
        image_size: (u32, u32),
        radar_center: (i32, i32),
        radar_zone: RadarZone,
        legend: Vec<LegendEntry>,
    ) -> Self {
        Self {
            image_size,
            radar_center,
            radar_zone,
            legend,
            gray_scale_unit: 17,
            rng_seed: 0,
            center_distance_unit: DistanceUnit::Pixels,
            thresholds: Thresholds::default(),
        }
    }

    /// Number of legend entries.
    pub fn legend_len(&self) -> usize {
        self.legend.len()
    }

    /// Index of the first positive-half entry; entries below it are the
    /// negative half.
    pub fn half(&self) -> usize {
        self.legend.len() / 2
    }

    /// The velocity encoded by a legend index, if the index is in range.
    pub fn velocity(&self, index: i8) -> Option<f32> {
        if index < 0 {
            return None;
        }
        self.legend.get(index as usize).map(|entry| entry.velocity)
    }

    /// The centroid-distance threshold expressed in pixels, applying the
    /// kilometer ratio when the configuration opts into kilometer semantics.
    pub fn center_distance_pixels(&self) -> Result<f32> {
        match self.center_distance_unit {
            DistanceUnit::Pixels => Ok(self.thresholds.center_distance),
            DistanceUnit::Kilometers => {
                let ratio = pixel_km_ratio(self.image_size).ok_or(
                    Error::UnknownPixelRatio {
                        width: self.image_size.0,
                        height: self.image_size.1,
                    },
                )?;
                Ok(self.thresholds.center_distance / ratio)
            }
        }
    }

    /// Validates legend and geometry invariants. Called by the pipeline
    /// before any pixel is touched.
    pub fn validate(&self) -> Result<()> {
        if self.legend.is_empty() {
            return Err(Error::EmptyLegend);
        }
        if self.legend.len() % 2 != 0 {
            return Err(Error::OddLegendLength(self.legend.len()));
        }
        let (width, height) = self.image_size;
        let limit = width.min(height) as i32;
        if self.radar_zone.min < 0
            || self.radar_zone.min >= self.radar_zone.max
            || self.radar_zone.max > limit
        {
            return Err(Error::ZoneOutOfBounds {
                min: self.radar_zone.min,
                max: self.radar_zone.max,
                width,
                height,
            });
        }
        if self.center_distance_unit == DistanceUnit::Kilometers
            && pixel_km_ratio(self.image_size).is_none()
        {
            return Err(Error::UnknownPixelRatio { width, height });
        }
        Ok(())
    }
}

/// The standard 14-entry velocity legend of the supported radar products,
/// in m/s from −27.5 (toward the radar) to 27.5 (away).
pub fn standard_legend() -> Vec<LegendEntry> {
    const ENTRIES: [([u8; 3], f32); 14] = [
        ([0, 224, 255], -27.5),
        ([0, 128, 255], -23.5),
        ([50, 0, 150], -17.5),
        ([0, 251, 144], -12.5),
        ([0, 187, 144], -7.5),
        ([0, 143, 0], -3.0),
        ([205, 192, 159], -0.5),
        ([255, 255, 255], 0.5),
        ([248, 135, 0], 3.0),
        ([255, 207, 0], 7.5),
        ([255, 255, 0], 12.5),
        ([174, 0, 0], 17.5),
        ([208, 112, 0], 23.5),
        ([255, 0, 0], 27.5),
    ];
    ENTRIES
        .iter()
        .map(|&(color, velocity)| LegendEntry { color, velocity })
        .collect()
}
