//!
//! Contains the Result and Error types for model and configuration
//! validation.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("legend has no entries")]
    EmptyLegend,
    #[error("legend length {0} is odd; the negative and positive halves must be equal")]
    OddLegendLength(usize),
    #[error("radar zone {min}..{max} does not fit a {width}x{height} image")]
    ZoneOutOfBounds {
        min: i32,
        max: i32,
        width: u32,
        height: u32,
    },
    #[error("no pixel/kilometer ratio known for a {width}x{height} image")]
    UnknownPixelRatio { width: u32, height: u32 },
}
