//!
//! Contains the Result and Error types for rendering operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error(
        "raster is {raster_width}x{raster_height} but the configuration \
         expects {config_width}x{config_height}"
    )]
    SizeMismatch {
        config_width: u32,
        config_height: u32,
        raster_width: u32,
        raster_height: u32,
    },
}
