//! Sign integration.
//!
//! The two denoised rasters disagree wherever both signs kept a value for
//! the same pixel. Each crossed component is resolved by looking at the
//! field it sits on: the overlaid opposite-sign cells are painted, a wide
//! average layer gap marks the component as velocity-folded and collapses
//! it to the field's extreme, and a small component whose edge shears hard
//! against the integrated picture flips back to the field.

use std::collections::HashSet;

use meso_model::cell::Cell;
use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_4, NEIGHBORS_8};
use meso_model::region::{components_nonempty, Region};

/// Merges the denoised negative and positive rasters into one picture.
pub fn integrate(neg: &CellRaster, pos: &CellRaster, config: &Config) -> CellRaster {
    let zone = config.radar_zone;
    let thresholds = &config.thresholds;

    let mut merged = CellRaster::new(neg.width(), neg.height());
    let mut crossed: Vec<Point> = Vec::new();
    let mut crossed_mask = CellRaster::new(neg.width(), neg.height());
    for (x, y) in zone.coords() {
        let n = neg.index_at(x, y);
        let p = pos.index_at(x, y);
        if n >= 0 && p < 0 {
            merged.set(x, y, neg.get(x, y));
        } else if n < 0 && p >= 0 {
            merged.set(x, y, pos.get(x, y));
        } else if n >= 0 && p >= 0 {
            crossed.push((x, y));
            crossed_mask.set(x, y, Cell::echo(0));
        }
    }

    for group in components_nonempty(&crossed_mask, &crossed, zone) {
        // Unique 4-neighbors outside the crossed set.
        let mut surround: HashSet<Point> = HashSet::new();
        for &(x, y) in &group {
            for (dx, dy) in NEIGHBORS_4 {
                let neighbor = (x + dx, y + dy);
                if crossed_mask.index_at(neighbor.0, neighbor.1) >= 0 {
                    continue;
                }
                surround.insert(neighbor);
            }
        }
        if surround.is_empty() {
            continue;
        }

        let neg_valid = surround
            .iter()
            .filter(|&&(x, y)| neg.index_at(x, y) >= 0)
            .count();
        let on_negative_field =
            neg_valid as f32 / surround.len() as f32 >= thresholds.crossed_include_ratio;
        let (field, overlay, fold_extreme) = if on_negative_field {
            (neg, pos, 0i8)
        } else {
            (pos, neg, (config.legend_len() - 1) as i8)
        };

        // The overlaid opposite-sign echo rides on the field.
        for &(x, y) in &group {
            merged.set(x, y, overlay.get(x, y));
        }

        // A wide positive-minus-negative gap across the whole component
        // means the echo aliased past the unambiguous range: collapse it to
        // the field's extreme, in base encoding so it never counts as valid.
        let gap_sum: f32 = group
            .iter()
            .map(|&(x, y)| (pos.index_at(x, y) - neg.index_at(x, y)) as f32)
            .sum();
        if gap_sum / group.len() as f32 >= thresholds.folded_gap {
            merged.fill_region(&group, Cell::base(fold_extreme));
            continue;
        }

        // Small components are only kept when their edge blends in.
        if group.len() < thresholds.small_group
            && edge_shear(&merged, &group) > thresholds.crossed_small_surround_gap
        {
            for &(x, y) in &group {
                merged.set(x, y, field.get(x, y));
            }
        }
    }
    merged
}

/// Average per-pixel index gap between the component's edge and its valid
/// neighbors in the merged raster.
fn edge_shear(merged: &CellRaster, group: &Region) -> f32 {
    let members: HashSet<Point> = group.iter().copied().collect();
    let edge: Vec<Point> = group
        .iter()
        .copied()
        .filter(|&(x, y)| {
            NEIGHBORS_8
                .iter()
                .any(|&(dx, dy)| !members.contains(&(x + dx, y + dy)))
        })
        .collect();
    if edge.is_empty() {
        return 0.0;
    }

    let mut total = 0.0f32;
    for &(x, y) in &edge {
        let own = merged.index_at(x, y);
        let mut gap_sum = 0.0f32;
        let mut count = 0usize;
        for (dx, dy) in NEIGHBORS_8 {
            let neighbor = (x + dx, y + dy);
            if members.contains(&neighbor) {
                continue;
            }
            let index = merged.index_at(neighbor.0, neighbor.1);
            if index >= 0 {
                gap_sum += (own - index).abs() as f32;
                count += 1;
            }
        }
        if count > 0 {
            total += gap_sum / count as f32;
        }
    }
    total / edge.len() as f32
}
