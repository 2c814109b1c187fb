//! Global velocity unfold.
//!
//! After integration, an aliased echo shows up as a group on the outermost
//! layers of one extreme whose surround lies almost entirely on the *other*
//! half of the legend. Such a group's true velocity is past the unambiguous
//! range: it is relabeled to the surrounding sign's extreme index.

use std::collections::HashSet;

use log::debug;

use meso_model::cell::Cell;
use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_4};
use meso_model::region::components_nonempty;

use crate::layers::layer_model;
use crate::sign::Sign;

/// Returns a copy of the integrated raster with folded rim groups relabeled
/// to their true extreme.
pub fn unfold(integrated: &CellRaster, config: &Config) -> CellRaster {
    let layers = layer_model(integrated, config);
    let mut unfolded = integrated.clone();
    for sign in Sign::BOTH {
        relabel_folded_rim(integrated, &layers, sign, config, &mut unfolded);
    }
    unfolded
}

/// One sign's unfold pass: groups on the layers where this sign's aliased
/// velocities land are rewritten to the sign's extreme when their valid
/// surround is composed of this sign's half.
///
/// Neighbor values are read from the untouched integrated raster so the two
/// sign passes cannot interfere.
fn relabel_folded_rim(
    integrated: &CellRaster,
    layers: &[Vec<Point>],
    sign: Sign,
    config: &Config,
    unfolded: &mut CellRaster,
) {
    let zone = config.radar_zone;
    let thresholds = &config.thresholds;
    let legend_len = config.legend_len();
    let target = Cell::echo(sign.extreme_index(legend_len));

    let mut mask = CellRaster::new(integrated.width(), integrated.height());
    let mut seeds: Vec<Point> = Vec::new();
    for layer in sign.folded_source_layers(legend_len, thresholds.folded_layer_num) {
        for &(x, y) in &layers[layer] {
            mask.set(x, y, Cell::echo(0));
            seeds.push((x, y));
        }
    }

    let mut relabeled = 0usize;
    for group in components_nonempty(&mask, &seeds, zone) {
        let mut surround: HashSet<Point> = HashSet::new();
        for &(x, y) in &group {
            for (dx, dy) in NEIGHBORS_4 {
                let neighbor = (x + dx, y + dy);
                if mask.index_at(neighbor.0, neighbor.1) >= 0 {
                    continue;
                }
                surround.insert(neighbor);
            }
        }
        if surround.is_empty() {
            continue;
        }

        let mut valid = 0usize;
        let mut own_half = 0usize;
        for &(x, y) in &surround {
            let index = integrated.index_at(x, y);
            if index >= 0 {
                valid += 1;
                if sign.contains_index(index, legend_len) {
                    own_half += 1;
                }
            }
        }
        if valid == 0 {
            continue;
        }

        let compose = own_half as f32 / valid as f32;
        let surrounded = own_half as f32 / surround.len() as f32;
        if compose >= thresholds.opposite_compose && surrounded >= thresholds.opposite_surround {
            unfolded.fill_region(&group, target);
            relabeled += group.len();
        }
    }
    if relabeled > 0 {
        debug!(
            "unfold: relabeled {} aliased pixel(s) to the {} extreme",
            relabeled,
            sign.label()
        );
    }
}
