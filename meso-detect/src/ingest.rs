//! Ingestion: color quantization of the rendered radar frame.
//!
//! Every pixel in the radar zone is matched against the legend with a
//! Chebyshev tolerance; the first matching entry wins. Stations that render
//! white province boundaries get those pixels blacked out first through a
//! per-station basemap so they cannot masquerade as the white legend color.

use image::RgbImage;
use meso_model::cell::Cell;
use meso_model::config::{Config, LegendEntry};
use meso_model::raster::CellRaster;

use crate::result::{Error, Result};

/// Per-channel Chebyshev tolerance for matching a pixel to a legend color.
pub const COLOR_TOLERANCE: u8 = 10;

/// Basemap channel value above which a pixel counts as boundary cover.
pub const BOUNDARY_COVER_LEVEL: u8 = 245;

/// Stations whose products draw white boundary lines over the scan and
/// therefore require a boundary basemap.
pub const BOUNDARY_COVER_STATIONS: [&str; 5] =
    ["Z9750", "Z9755", "Z9756", "Z9762", "Z9763"];

/// Whether a station's frames need boundary coverage before quantization.
pub fn needs_boundary_cover(station_id: &str) -> bool {
    BOUNDARY_COVER_STATIONS.contains(&station_id)
}

/// Quantizes an RGB radar frame into a cell raster of legend indices.
///
/// Pixels marked by the basemap are treated as black before matching.
/// Pixels matching no legend color stay empty.
pub fn quantize(
    image: &RgbImage,
    basemap: Option<&RgbImage>,
    config: &Config,
) -> Result<CellRaster> {
    let (width, height) = config.image_size;
    if image.width() != width || image.height() != height {
        return Err(Error::ImageSizeMismatch {
            expected_width: width,
            expected_height: height,
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }
    if let Some(basemap) = basemap {
        if basemap.dimensions() != image.dimensions() {
            return Err(Error::BasemapSizeMismatch {
                expected_width: image.width(),
                expected_height: image.height(),
                actual_width: basemap.width(),
                actual_height: basemap.height(),
            });
        }
    }

    let mut raster = CellRaster::new(width as usize, height as usize);
    for (x, y) in config.radar_zone.coords() {
        let covered = basemap
            .map(|basemap| basemap.get_pixel(x as u32, y as u32)[0] > BOUNDARY_COVER_LEVEL)
            .unwrap_or(false);
        let rgb = if covered {
            [0, 0, 0]
        } else {
            image.get_pixel(x as u32, y as u32).0
        };
        if let Some(index) = match_legend(&config.legend, rgb) {
            raster.set(x, y, Cell::echo(index));
        }
    }
    Ok(raster)
}

fn match_legend(legend: &[LegendEntry], rgb: [u8; 3]) -> Option<i8> {
    legend
        .iter()
        .position(|entry| {
            entry
                .color
                .iter()
                .zip(rgb.iter())
                .all(|(&a, &b)| a.abs_diff(b) <= COLOR_TOLERANCE)
        })
        .map(|index| index as i8)
}
