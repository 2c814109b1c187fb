//! Scan metadata extraction from radar product filenames.
//!
//! Product files are named like
//! `Z_RADR_I_Z9755_202404301154_P_DOR_SAD_V_5_115_15.png`: the fourth
//! underscore field is the station identifier and the fifth is the scan
//! timestamp in UTC, reported here shifted to UTC+8 wall-clock time.

use chrono::{Duration, NaiveDateTime};

use crate::result::{Error, Result};

/// Station and scan-time metadata recovered from a product filename.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMetadata {
    /// Station identifier of the form `Z` followed by four digits.
    pub station_id: String,
    /// Scan wall-clock time (UTC+8), when the timestamp field parses.
    pub scan_time: Option<NaiveDateTime>,
}

/// Whether a string is a well-formed station identifier (`Z####`).
pub fn is_station_id(candidate: &str) -> bool {
    candidate.len() == 5
        && candidate.starts_with('Z')
        && candidate[1..].chars().all(|c| c.is_ascii_digit())
}

/// Extracts station and scan-time metadata from a product filename.
///
/// The station field must match `Z####`; a malformed or absent field is an
/// input error. A malformed timestamp is tolerated and reported as `None`.
pub fn scan_metadata(file_name: &str) -> Result<ScanMetadata> {
    let fields: Vec<&str> = file_name.split('_').collect();

    let station = fields.get(3).copied().unwrap_or_default();
    if !is_station_id(station) {
        return Err(Error::InvalidStationId(station.to_string()));
    }

    let scan_time = fields
        .get(4)
        .filter(|field| field.len() >= 12)
        .and_then(|field| NaiveDateTime::parse_from_str(&field[..12], "%Y%m%d%H%M").ok())
        .map(|utc| utc + Duration::hours(8));

    Ok(ScanMetadata {
        station_id: station.to_string(),
        scan_time,
    })
}
