//!
//! Contains the Result and Error types for detection pipeline operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("invalid radar configuration")]
    Config(#[from] meso_model::result::Error),
    #[error(
        "input image is {actual_width}x{actual_height} but the configuration \
         expects {expected_width}x{expected_height}"
    )]
    ImageSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error(
        "basemap is {actual_width}x{actual_height} but the radar image is \
         {expected_width}x{expected_height}"
    )]
    BasemapSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("station identifier {0:?} does not match the Z#### pattern")]
    InvalidStationId(String),
    #[error("{stage} produced a malformed cell encoding: {detail}")]
    InternalConsistency { stage: &'static str, detail: String },
}
