//! Extremum region discovery by layer immersion.
//!
//! Watershed in reverse: layers are painted from the sign's extreme toward
//! its base. A region that stays connected and bounded while the water
//! rises is a candidate velocity peak; one that balloons past the area cap
//! is sealed with the extent it had before the overflow. Fresh components
//! that appear in a new layer without touching older echo seed new regions.

mod attributes;

use std::collections::HashSet;

use log::debug;

use meso_model::cell::Cell;
use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_8};
use meso_model::region::Region;

use crate::sign::Sign;

#[derive(Clone)]
struct PeakGroup {
    sealed: bool,
    coords: Vec<Point>,
}

/// Extracts the bounded extremum regions of one sign from the unfolded
/// raster, then applies the attribute filter.
///
/// `layers` is the layer model of `unfolded`.
pub fn extract_peaks(
    unfolded: &CellRaster,
    layers: &[Vec<Point>],
    sign: Sign,
    config: &Config,
) -> Vec<Region> {
    let area_max = config.thresholds.area_max;
    let mut immersion = CellRaster::new(unfolded.width(), unfolded.height());
    let mut groups: Vec<PeakGroup> = Vec::new();

    for layer in sign.immersion_layers(config.legend_len()) {
        let level = layer as i8;
        for &(x, y) in &layers[layer] {
            immersion.set(x, y, Cell::echo(level));
        }

        let mut next: Vec<PeakGroup> = Vec::new();
        // Representatives of groups already subsumed by a flood this layer.
        let mut absorbed: HashSet<Point> = HashSet::new();

        for i in 0..groups.len() {
            let group = &groups[i];
            if group.coords.is_empty() {
                continue;
            }
            if group.sealed {
                next.push(group.clone());
                continue;
            }
            if absorbed.contains(&group.coords[0]) {
                continue;
            }

            let (flooded, reached, exceeded) =
                flood_extend(&immersion, &group.coords, sign, level, area_max);
            if exceeded {
                // Overflow: seal every group the partial flood touched at
                // the extent it had before this layer.
                for other in &groups {
                    if other.sealed
                        || other.coords.is_empty()
                        || absorbed.contains(&other.coords[0])
                    {
                        continue;
                    }
                    if reached.contains(&other.coords[0]) {
                        absorbed.insert(other.coords[0]);
                        next.push(PeakGroup {
                            sealed: true,
                            coords: other.coords.clone(),
                        });
                    }
                }
            } else {
                for other in &groups {
                    if other.sealed || other.coords.is_empty() {
                        continue;
                    }
                    if reached.contains(&other.coords[0]) {
                        absorbed.insert(other.coords[0]);
                    }
                }
                next.push(PeakGroup {
                    sealed: false,
                    coords: flooded,
                });
            }
        }

        // Seed new groups from this layer's fresh pixels. A component that
        // touches older echo would only re-extend an existing group, so it
        // is discarded.
        let mut visited: HashSet<Point> = HashSet::new();
        for &seed in &layers[layer] {
            if !visited.insert(seed) {
                continue;
            }
            let mut component: Vec<Point> = vec![seed];
            let mut stack: Vec<Point> = vec![seed];
            let mut isolated = true;
            while let Some((x, y)) = stack.pop() {
                for (dx, dy) in NEIGHBORS_8 {
                    let neighbor = (x + dx, y + dy);
                    let index = immersion.index_at(neighbor.0, neighbor.1);
                    if index == level {
                        if visited.insert(neighbor) {
                            component.push(neighbor);
                            stack.push(neighbor);
                        }
                    } else if index >= 0 {
                        isolated = false;
                    }
                }
            }
            if isolated && component.len() <= area_max {
                next.push(PeakGroup {
                    sealed: false,
                    coords: component,
                });
            }
        }

        groups = next;
    }

    let candidates = groups.len();
    let peaks: Vec<Region> = groups
        .into_iter()
        .filter(|group| attributes::region_passes(&group.coords, &immersion, config))
        .map(|group| group.coords)
        .collect();
    debug!(
        "{} immersion: {} candidate group(s), {} peak(s) after the attribute filter",
        sign.label(),
        candidates,
        peaks.len()
    );
    peaks
}

/// Floods outward from a group over every pixel already immersed at this
/// layer, stopping early once the area cap is exceeded. Returns the flooded
/// coordinates, the membership set, and the overflow flag.
fn flood_extend(
    immersion: &CellRaster,
    coords: &[Point],
    sign: Sign,
    level: i8,
    area_max: usize,
) -> (Vec<Point>, HashSet<Point>, bool) {
    let mut reached: HashSet<Point> = coords.iter().copied().collect();
    let mut flooded: Vec<Point> = coords.to_vec();
    let mut stack: Vec<Point> = coords.to_vec();
    let mut exceeded = false;

    'flood: while let Some((x, y)) = stack.pop() {
        for (dx, dy) in NEIGHBORS_8 {
            let neighbor = (x + dx, y + dy);
            let index = immersion.index_at(neighbor.0, neighbor.1);
            let immersed = if sign.is_negative() {
                index >= 0 && index <= level
            } else {
                index >= level
            };
            if immersed && reached.insert(neighbor) {
                flooded.push(neighbor);
                stack.push(neighbor);
                if flooded.len() > area_max {
                    exceeded = true;
                    break 'flood;
                }
            }
        }
    }
    (flooded, reached, exceeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::layer_model;
    use meso_model::config::{standard_legend, RadarZone};

    fn config() -> Config {
        Config::new(
            (64, 64),
            (32, 32),
            RadarZone { min: 2, max: 62 },
            standard_legend(),
        )
    }

    /// Concentric square peak: a widening stack of negative layers with the
    /// extreme in the middle, strong enough to pass every attribute test.
    fn paint_peak(raster: &mut CellRaster, cx: i32, cy: i32, extreme: i8) {
        for x in cx - 3..=cx + 3 {
            for y in cy - 3..=cy + 3 {
                let ring = (x - cx).abs().max((y - cy).abs());
                let offset = match ring {
                    0..=1 => 0,
                    2 => 1,
                    _ => 2,
                };
                let index = if extreme < 7 {
                    extreme + offset
                } else {
                    extreme - offset
                };
                raster.set(x, y, Cell::echo(index));
            }
        }
    }

    #[test]
    fn test_single_peak_is_extracted() {
        let config = config();
        let mut unfolded = CellRaster::new(64, 64);
        paint_peak(&mut unfolded, 20, 20, 0);

        let layers = layer_model(&unfolded, &config);
        let peaks = extract_peaks(&unfolded, &layers, Sign::Negative, &config);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].len(), 49);
        assert!(peaks[0].contains(&(20, 20)));
    }

    #[test]
    fn test_positive_peak_is_extracted_with_mirrored_walk() {
        let config = config();
        let mut unfolded = CellRaster::new(64, 64);
        paint_peak(&mut unfolded, 40, 40, 13);

        let layers = layer_model(&unfolded, &config);
        let peaks = extract_peaks(&unfolded, &layers, Sign::Positive, &config);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].len(), 49);
    }

    #[test]
    fn test_signs_do_not_see_each_other() {
        let config = config();
        let mut unfolded = CellRaster::new(64, 64);
        paint_peak(&mut unfolded, 20, 20, 0);
        paint_peak(&mut unfolded, 40, 40, 13);

        let layers = layer_model(&unfolded, &config);
        let neg = extract_peaks(&unfolded, &layers, Sign::Negative, &config);
        let pos = extract_peaks(&unfolded, &layers, Sign::Positive, &config);
        assert_eq!(neg.len(), 1);
        assert_eq!(pos.len(), 1);
        assert!(neg[0].contains(&(20, 20)));
        assert!(pos[0].contains(&(40, 40)));
    }

    #[test]
    fn test_broad_flat_field_produces_no_peak() {
        let config = config();
        let mut unfolded = CellRaster::new(64, 64);
        // A 20x20 single-layer slab blows straight through the area cap.
        for x in 10..30 {
            for y in 10..30 {
                unfolded.set(x, y, Cell::echo(3));
            }
        }

        let layers = layer_model(&unfolded, &config);
        let peaks = extract_peaks(&unfolded, &layers, Sign::Negative, &config);
        assert!(peaks.is_empty());
    }

    #[test]
    fn test_peak_growing_into_wide_base_seals_at_prior_extent() {
        let config = config();
        let mut unfolded = CellRaster::new(64, 64);
        paint_peak(&mut unfolded, 20, 20, 0);
        // Surround the peak with a huge base-layer apron touching it.
        for x in 10..=30 {
            for y in 10..=30 {
                if unfolded.get(x, y).is_empty() {
                    unfolded.set(x, y, Cell::echo(6));
                }
            }
        }

        let layers = layer_model(&unfolded, &config);
        let peaks = extract_peaks(&unfolded, &layers, Sign::Negative, &config);
        // The apron overflows the cap at layer 6, sealing the peak at its
        // 49-pixel extent from layer 2.
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].len(), 49);
    }
}
