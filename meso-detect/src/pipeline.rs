//! Pipeline orchestration.
//!
//! Sequences the stages strictly forward: quantize → narrow fill →
//! per-sign denoise → integrate → unfold → per-sign extremum extraction →
//! pairing. Each stage consumes the previous stage's raster; the cell
//! encoding is verified between stages so a malformed raster aborts the
//! run instead of corrupting downstream analysis.

use std::time::Instant;

use image::RgbImage;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use meso_model::config::Config;
use meso_model::detection::MesocycloneRecord;
use meso_model::raster::CellRaster;
use meso_model::region::Region;

use crate::analysis::pair_mesocyclones;
use crate::denoise::denoise_sign;
use crate::immersion::extract_peaks;
use crate::ingest::quantize;
use crate::integrate::integrate;
use crate::layers::layer_model;
use crate::narrow_fill::narrow_fill;
use crate::result::{Error, Result};
use crate::sign::Sign;
use crate::unfold::unfold;

/// The result of one pipeline run: the records plus the rasters and regions
/// a caller needs to visualize them.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Detected mesocyclones in emission order.
    pub records: Vec<MesocycloneRecord>,
    /// The fully denoised, integrated, and unfolded raster.
    pub unfolded: CellRaster,
    /// Negative-sign extremum regions that passed the attribute filter.
    pub neg_regions: Vec<Region>,
    /// Positive-sign extremum regions that passed the attribute filter.
    pub pos_regions: Vec<Region>,
}

/// Runs the full detection pipeline over one radar frame.
///
/// `basemap` carries per-station boundary cover for frames whose white
/// province lines collide with the white legend color. An empty record list
/// is a successful run with no detections.
pub fn detect(
    image: &RgbImage,
    config: &Config,
    basemap: Option<&RgbImage>,
) -> Result<Detection> {
    config.validate().map_err(Error::Config)?;
    let start = Instant::now();
    info!(
        "starting mesocyclone detection over a {}x{} frame",
        image.width(),
        image.height()
    );

    let stage = Instant::now();
    let quantized = quantize(image, basemap, config)?;
    debug!("ingestion finished in {:.2?}", stage.elapsed());

    let stage = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.rng_seed);
    let filled = narrow_fill(&quantized, config, &mut rng);
    debug!("narrow fill finished in {:.2?}", stage.elapsed());

    let stage = Instant::now();
    let layers = layer_model(&filled, config);
    let (neg, pos) = rayon::join(
        || denoise_sign(&filled, &layers, Sign::Negative, config),
        || denoise_sign(&filled, &layers, Sign::Positive, config),
    );
    verify_encoding(&neg, config, "negative denoise")?;
    verify_encoding(&pos, config, "positive denoise")?;
    debug!("per-sign denoise finished in {:.2?}", stage.elapsed());

    let stage = Instant::now();
    let integrated = integrate(&neg, &pos, config);
    verify_encoding(&integrated, config, "sign integration")?;
    let unfolded = unfold(&integrated, config);
    verify_encoding(&unfolded, config, "velocity unfold")?;
    debug!("integration and unfold finished in {:.2?}", stage.elapsed());

    let stage = Instant::now();
    let unfolded_layers = layer_model(&unfolded, config);
    let (neg_regions, pos_regions) = rayon::join(
        || extract_peaks(&unfolded, &unfolded_layers, Sign::Negative, config),
        || extract_peaks(&unfolded, &unfolded_layers, Sign::Positive, config),
    );
    debug!(
        "immersion finished in {:.2?}: {} negative / {} positive region(s)",
        stage.elapsed(),
        neg_regions.len(),
        pos_regions.len()
    );

    let records = pair_mesocyclones(&unfolded, &neg_regions, &pos_regions, config)?;
    info!(
        "detection finished in {:.2?}: {} record(s)",
        start.elapsed(),
        records.len()
    );

    Ok(Detection {
        records,
        unfolded,
        neg_regions,
        pos_regions,
    })
}

/// Asserts that every zone pixel carries one of the four defined cell
/// encodings. A violation is a pipeline bug, surfaced as
/// [`Error::InternalConsistency`].
fn verify_encoding(raster: &CellRaster, config: &Config, stage: &'static str) -> Result<()> {
    for (x, y) in config.radar_zone.coords() {
        let cell = raster.get(x, y);
        if !cell.is_well_formed() {
            return Err(Error::InternalConsistency {
                stage,
                detail: format!("{:?} at ({}, {})", cell, x, y),
            });
        }
    }
    Ok(())
}
