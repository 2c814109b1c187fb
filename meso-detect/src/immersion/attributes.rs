//! Attribute filter for candidate extremum regions.
//!
//! A region survives only if it is the right size, deep enough on average,
//! compact along both principal axes, dense against its perimeter, and
//! simple in its per-layer structure.

use std::collections::HashSet;

use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_8};
use meso_model::region::{components_by_index, Region};

use crate::sign::Sign;

/// Checks every region attribute constraint against the immersion raster.
pub(super) fn region_passes(region: &Region, immersion: &CellRaster, config: &Config) -> bool {
    if region.is_empty() {
        return false;
    }
    let thresholds = &config.thresholds;
    let legend_len = config.legend_len();
    let half = (legend_len / 2) as i8;

    let instance = immersion.index_at(region[0].0, region[0].1);
    let sign = if instance <= half - 1 {
        Sign::Negative
    } else {
        Sign::Positive
    };

    let area = region.len();
    if area < thresholds.area_min || area > thresholds.area_max {
        return false;
    }

    let depth_sum: i64 = region
        .iter()
        .map(|&(x, y)| sign.depth(immersion.index_at(x, y), legend_len) as i64)
        .sum();
    if (depth_sum as f32 / area as f32) < thresholds.avg_volume_min {
        return false;
    }

    if narrowness(region) > thresholds.narrow_max {
        return false;
    }

    // Density: the squared outer perimeter against the area.
    let members: HashSet<Point> = region.iter().copied().collect();
    let mut perimeter: HashSet<Point> = HashSet::new();
    for &(x, y) in region {
        for (dx, dy) in NEIGHBORS_8 {
            let neighbor = (x + dx, y + dy);
            if !members.contains(&neighbor) {
                perimeter.insert(neighbor);
            }
        }
    }
    let density = (perimeter.len() * perimeter.len()) as f32 / area as f32;
    if density > thresholds.density_max {
        return false;
    }

    // Layer complexity: a real peak decomposes into few components per
    // layer; scattered multi-component layers indicate noise.
    let mut buckets: Vec<Vec<Point>> = vec![Vec::new(); legend_len];
    for &(x, y) in region {
        let index = immersion.index_at(x, y);
        if index >= 0 && (index as usize) < legend_len {
            buckets[index as usize].push((x, y));
        }
    }
    let mut layer_count = 0usize;
    let mut component_count = 0usize;
    for bucket in &buckets {
        if bucket.is_empty() {
            continue;
        }
        layer_count += 1;
        component_count += components_by_index(immersion, bucket, config.radar_zone).len();
    }
    if layer_count == 0 {
        return false;
    }
    component_count as f32 / layer_count as f32 <= thresholds.layer_group_max
}

/// Elongation of the region along its principal axes: the ratio of the
/// projection ranges onto the two eigenvectors of the centered covariance
/// matrix, computed in closed form for the 2x2 case. A single pixel counts
/// as 1; a zero second-axis range counts as infinite.
fn narrowness(region: &[Point]) -> f32 {
    if region.len() < 2 {
        return 1.0;
    }
    let n = region.len() as f64;
    let mut mean_x = 0.0f64;
    let mut mean_y = 0.0f64;
    for &(x, y) in region {
        mean_x += x as f64;
        mean_y += y as f64;
    }
    mean_x /= n;
    mean_y /= n;

    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    let mut syy = 0.0f64;
    for &(x, y) in region {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    // Principal axis from the larger eigenvalue of [[sxx, sxy], [sxy, syy]].
    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let disc = (trace * trace / 4.0 - det).max(0.0).sqrt();
    let lambda = trace / 2.0 + disc;
    let (ax, ay) = if sxy.abs() > f64::EPSILON {
        (lambda - syy, sxy)
    } else if sxx >= syy {
        (1.0, 0.0)
    } else {
        (0.0, 1.0)
    };
    let norm = (ax * ax + ay * ay).sqrt();
    let (ux, uy) = (ax / norm, ay / norm);
    let (vx, vy) = (-uy, ux);

    let mut min_major = f64::INFINITY;
    let mut max_major = f64::NEG_INFINITY;
    let mut min_minor = f64::INFINITY;
    let mut max_minor = f64::NEG_INFINITY;
    for &(x, y) in region {
        let dx = x as f64 - mean_x;
        let dy = y as f64 - mean_y;
        let major = dx * ux + dy * uy;
        let minor = dx * vx + dy * vy;
        min_major = min_major.min(major);
        max_major = max_major.max(major);
        min_minor = min_minor.min(minor);
        max_minor = max_minor.max(minor);
    }
    let length = max_major - min_major;
    let width = max_minor - min_minor;
    if width == 0.0 {
        return f32::INFINITY;
    }
    (length / width) as f32
}
