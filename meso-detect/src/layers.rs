//! Layer model extraction.
//!
//! A *layer* is the set of pixels sharing one legend index. Several stages
//! walk layers in sign-specific order; they all start from this grouping.

use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point};

/// Groups every displayed echo in the radar zone by legend index. The
/// result has exactly `legend_len` entries; empty layers stay empty.
pub fn layer_model(raster: &CellRaster, config: &Config) -> Vec<Vec<Point>> {
    let mut layers: Vec<Vec<Point>> = vec![Vec::new(); config.legend_len()];
    for (x, y) in config.radar_zone.coords() {
        let index = raster.index_at(x, y);
        if index >= 0 && (index as usize) < layers.len() {
            layers[index as usize].push((x, y));
        }
    }
    layers
}
