//! Classification of layer-scale small groups.
//!
//! A small group is a layer component below the trust size. Whether it
//! survives depends on what it sits on: a trusted echo underneath admits it
//! when the layer step is plausible; a bare substrate underneath defers to
//! the group's valid surround; nothing underneath filters it out.

use std::collections::HashSet;

use meso_model::cell::Cell;
use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_4};
use meso_model::region::Region;

use crate::sign::Sign;

/// Draws or discards each held-back small group. Groups are visited in the
/// order the layer walk produced them, so a group can land on echo painted
/// for an earlier (weaker) layer.
pub(super) fn classify_small_groups(
    denoised: &mut CellRaster,
    sign: Sign,
    small_groups: &[(i8, Region)],
    config: &Config,
) {
    let thresholds = &config.thresholds;

    for (group_index, group) in small_groups {
        let (sx, sy) = group[0];

        let below = denoised.valid_index_at(sx, sy);
        if below >= 0 {
            // On top of a trusted echo: keep only a plausible layer step.
            if sign.stack_gap_ok(*group_index, below, thresholds.layer_gap) {
                denoised.fill_region(group, Cell::echo(*group_index));
            }
            continue;
        }

        let base_below = denoised.index_at(sx, sy);
        if base_below < 0 {
            // Floating over nothing; the substrate already dropped it.
            continue;
        }

        // On bare substrate: consult the unique outer 4-neighbors.
        let members: HashSet<Point> = group.iter().copied().collect();
        let mut surround: HashSet<Point> = HashSet::new();
        let mut valid_indices: Vec<i8> = Vec::new();
        for &(x, y) in group {
            for (dx, dy) in NEIGHBORS_4 {
                let neighbor = (x + dx, y + dy);
                if members.contains(&neighbor) {
                    continue;
                }
                if surround.insert(neighbor) {
                    let index = denoised.valid_index_at(neighbor.0, neighbor.1);
                    if index >= 0 {
                        valid_indices.push(index);
                    }
                }
            }
        }

        let ratio = if surround.is_empty() {
            0.0
        } else {
            valid_indices.len() as f32 / surround.len() as f32
        };
        if !valid_indices.is_empty() && ratio >= thresholds.valid_surround_ratio {
            let mean = valid_indices.iter().map(|&i| i as f32).sum::<f32>()
                / valid_indices.len() as f32;
            if (*group_index as f32 - mean).abs() <= thresholds.layer_gap {
                denoised.fill_region(group, Cell::echo(*group_index));
            } else {
                // Implausible against its surround: adopt the surround mean.
                denoised.fill_region(group, Cell::echo(mean.round() as i8));
            }
        } else if ((*group_index - base_below).abs() as f32) <= thresholds.layer_gap {
            denoised.fill_region(group, Cell::echo(*group_index));
        }
    }
}
