//!
//! # meso-detect
//! Detects mesocyclones in rendered Doppler weather radar velocity images.
//!
//! The input is a color radar frame whose discrete legend maps colors to
//! radial velocities. The pipeline quantizes the frame into a legend-index
//! raster, repairs narrow gaps, denoises each velocity sign against a
//! base-echo substrate, integrates the two signs (unfolding aliased echo on
//! the way), grows bounded extremum regions by layer immersion, and pairs
//! opposite-sign extrema into mesocyclone records.
//!
//! # Example
//!
//! ```ignore
//! use meso_detect::{detect, RgbImage};
//! use meso_model::config::{Config, RadarZone, standard_legend};
//!
//! let config = Config::new(
//!     (760, 600),
//!     (300, 300),
//!     RadarZone { min: 30, max: 570 },
//!     standard_legend(),
//! );
//! let frame = image::open("Z_RADR_I_Z9755_202404301154_P_DOR_SAD_V_5_115_15.png")?
//!     .to_rgb8();
//! let detection = detect(&frame, &config, None)?;
//! for record in &detection.records {
//!     println!("storm {} at {:?}", record.storm_num, record.logic_center);
//! }
//! ```
//!
//! # Crate Boundaries
//!
//! This crate is the **analysis core**: it accepts an RGB pixel buffer and a
//! validated configuration and returns detection records plus the rasters
//! needed for visualization. It performs no file, network, or terminal I/O;
//! configuration loading and artifact writing live in the shell around it.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]

pub mod analysis;
pub mod denoise;
pub mod immersion;
pub mod ingest;
pub mod integrate;
pub mod layers;
pub mod metadata;
pub mod narrow_fill;
pub mod pipeline;
pub mod result;
pub mod sign;
pub mod unfold;

pub use image::RgbImage;
pub use pipeline::{detect, Detection};
pub use result::{Error, Result};
