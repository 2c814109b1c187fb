//! Detection record types reported to callers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One detected mesocyclone: a validated pair of opposite-sign velocity
/// extremum regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MesocycloneRecord {
    /// Sequence number in emission order, starting at 0.
    pub storm_num: u32,
    /// Midpoint of the two extremum centroids, in pixel coordinates.
    pub logic_center: (i32, i32),
    /// Distance from the radar site to the logic center, in pixels.
    pub radar_distance: f32,
    /// Bearing of the logic center from the radar site; north is 0°,
    /// increasing clockwise.
    pub radar_angle_deg: f32,
    /// Average rotation speed `(|v_neg| + |v_pos|) / 2` in m/s.
    pub shear: f32,
    /// Weighted centroid of the negative extremum region.
    pub neg_center: (i32, i32),
    /// Strongest (most negative) velocity in the negative region, m/s.
    pub neg_max_velocity: f32,
    /// Weighted centroid of the positive extremum region.
    pub pos_center: (i32, i32),
    /// Strongest (most positive) velocity in the positive region, m/s.
    pub pos_max_velocity: f32,
}

/// The caller-facing result of one detection run. An empty record list is a
/// successful run with no detections, never an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionOutput {
    /// Detected mesocyclones in emission order.
    pub records: Vec<MesocycloneRecord>,
    /// Radar station identifier (`Z####`), when known from the input name.
    pub station_id: Option<String>,
    /// Scan wall-clock time (UTC+8), when known from the input name.
    pub scan_time: Option<NaiveDateTime>,
}
