//! Rendering functions for mesocyclone detection results.
//!
//! This crate turns the detection pipeline's cell rasters, extremum
//! regions, and records into [`image::RgbImage`] values: legend-color and
//! grayscale views of a raster, region overlays, per-record echo crops, and
//! a full detection overlay with center markers and pair connectors.
//!
//! # Crate Boundaries
//!
//! Rendering only: no detection logic, no file I/O. Callers decide where
//! (or whether) images are saved.

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]

mod overlay;
mod raster;
pub mod result;

pub use image::RgbImage;
pub use overlay::{render_detection, render_record_window};
pub use raster::{render_grayscale, render_legend_colors, render_regions};

/// Radius in pixels of the centroid markers drawn on detection overlays.
pub const CENTER_MARK_RADIUS: i32 = 4;
