//! Mesocyclone pairing.
//!
//! Opposite-sign extremum regions are paired by centroid distance, then
//! validated on rotation strength and on the fraction of real echo inside
//! the disk spanned by the pair. Survivors become numbered records.

use log::debug;

use meso_model::config::Config;
use meso_model::detection::MesocycloneRecord;
use meso_model::raster::{CellRaster, Point};
use meso_model::region::Region;

use crate::result::Result;
use crate::sign::Sign;

/// Validates every negative/positive region pair and emits the surviving
/// mesocyclone records in pairing order.
pub fn pair_mesocyclones(
    unfolded: &CellRaster,
    neg_regions: &[Region],
    pos_regions: &[Region],
    config: &Config,
) -> Result<Vec<MesocycloneRecord>> {
    let thresholds = &config.thresholds;
    let max_distance = config.center_distance_pixels()?;

    let neg_candidates: Vec<(&Region, Point)> = neg_regions
        .iter()
        .filter_map(|region| weighted_centroid(region, unfolded, config).map(|c| (region, c)))
        .collect();
    let pos_candidates: Vec<(&Region, Point)> = pos_regions
        .iter()
        .filter_map(|region| weighted_centroid(region, unfolded, config).map(|c| (region, c)))
        .collect();

    let mut records = Vec::new();
    for &(neg_region, neg_center) in &neg_candidates {
        for &(pos_region, pos_center) in &pos_candidates {
            let dx = (neg_center.0 - pos_center.0) as f32;
            let dy = (neg_center.1 - pos_center.1) as f32;
            let distance = dx.hypot(dy);
            if distance > max_distance {
                continue;
            }

            let neg_max = strongest_velocity(neg_region, unfolded, config, Sign::Negative);
            let pos_max = strongest_velocity(pos_region, unfolded, config, Sign::Positive);
            let shear = (neg_max.abs() + pos_max.abs()) / 2.0;
            if shear < thresholds.meso_rotation {
                continue;
            }

            let center = (
                ((neg_center.0 + pos_center.0) as f32 / 2.0).round() as i32,
                ((neg_center.1 + pos_center.1) as f32 / 2.0).round() as i32,
            );
            let radius = distance.round() as i32;
            let (total, invalid) = disk_echo_counts(unfolded, center, radius);
            let invalid_ratio = if total > 0 {
                invalid as f32 / total as f32
            } else {
                1.0
            };
            if invalid_ratio > 1.0 - thresholds.valid_echo_ratio {
                debug!(
                    "pair at {:?} rejected: {:.0}% of the disk is not valid echo",
                    center,
                    invalid_ratio * 100.0
                );
                continue;
            }

            let rdx = (center.0 - config.radar_center.0) as f32;
            let rdy = (center.1 - config.radar_center.1) as f32;
            records.push(MesocycloneRecord {
                storm_num: records.len() as u32,
                logic_center: center,
                radar_distance: rdx.hypot(rdy),
                radar_angle_deg: bearing_from_north(center, config.radar_center),
                shear,
                neg_center,
                neg_max_velocity: neg_max,
                pos_center,
                pos_max_velocity: pos_max,
            });
        }
    }
    Ok(records)
}

/// Velocity-weighted centroid of a region, rounded to pixel coordinates.
/// Returns `None` when every pixel carries zero weight.
pub fn weighted_centroid(
    region: &Region,
    raster: &CellRaster,
    config: &Config,
) -> Option<Point> {
    let mut weighted_x = 0.0f64;
    let mut weighted_y = 0.0f64;
    let mut weight_sum = 0.0f64;
    for &(x, y) in region {
        let Some(velocity) = config.velocity(raster.index_at(x, y)) else {
            continue;
        };
        let weight = velocity.abs() as f64;
        weighted_x += x as f64 * weight;
        weighted_y += y as f64 * weight;
        weight_sum += weight;
    }
    if weight_sum == 0.0 {
        return None;
    }
    Some((
        (weighted_x / weight_sum).round() as i32,
        (weighted_y / weight_sum).round() as i32,
    ))
}

/// The region's strongest velocity in the sign's direction, or 0 when the
/// region holds no velocity of that sign.
fn strongest_velocity(
    region: &Region,
    raster: &CellRaster,
    config: &Config,
    sign: Sign,
) -> f32 {
    region
        .iter()
        .filter_map(|&(x, y)| config.velocity(raster.index_at(x, y)))
        .fold(0.0f32, |extreme, velocity| {
            if sign.is_negative() {
                extreme.min(velocity)
            } else {
                extreme.max(velocity)
            }
        })
}

/// Counts in-bounds pixels of the disk around `center` and how many of them
/// are not valid echo (base fill and empty both count as invalid).
fn disk_echo_counts(raster: &CellRaster, center: Point, radius: i32) -> (usize, usize) {
    let mut total = 0usize;
    let mut invalid = 0usize;
    for x in center.0 - radius..=center.0 + radius {
        for y in center.1 - radius..=center.1 + radius {
            let dx = (x - center.0) as f32;
            let dy = (y - center.1) as f32;
            if dx.hypot(dy) > radius as f32 || !raster.in_bounds(x, y) {
                continue;
            }
            total += 1;
            if raster.valid_index_at(x, y) < 0 {
                invalid += 1;
            }
        }
    }
    (total, invalid)
}

/// Bearing of `point` as seen from `origin`: 0° at north, clockwise, with
/// the left half-plane mapped to 180°..360°. The origin itself reads 0°.
fn bearing_from_north(point: Point, origin: Point) -> f32 {
    let dx = (point.0 - origin.0) as f32;
    let dy = (point.1 - origin.1) as f32;
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return 0.0;
    }
    // Image y grows southward, so north is -y.
    let cos_theta = (-dy / distance).clamp(-1.0, 1.0);
    let mut degrees = cos_theta.acos().to_degrees();
    if dx < 0.0 {
        degrees = 360.0 - degrees;
    }
    degrees
}
