//! Base-echo substrate construction and base-fill inference.

use std::collections::HashSet;

use meso_model::cell::Cell;
use meso_model::config::Config;
use meso_model::raster::{CellRaster, Point, NEIGHBORS_4};
use meso_model::region::{components_by_index, components_where};

use crate::sign::Sign;

/// Builds the sign's base-echo substrate: every pixel of the sign flattened
/// to the base index, enclosed holes closed, and components below the trust
/// size dropped.
pub(super) fn base_substrate(
    filled: &CellRaster,
    layers: &[Vec<Point>],
    sign: Sign,
    config: &Config,
) -> CellRaster {
    let zone = config.radar_zone;
    let cell = Cell::base(sign.base_index(config.legend_len()));

    let mut substrate = CellRaster::new(filled.width(), filled.height());
    for layer in sign.denoise_layers(config.legend_len()) {
        substrate.fill_region(&layers[layer], cell);
    }
    let holes = substrate.inner_holes(zone);
    for (x, y) in holes {
        substrate.set(x, y, cell);
    }

    let seeds: Vec<Point> = zone
        .coords()
        .filter(|&(x, y)| substrate.index_at(x, y) >= 0)
        .collect();
    for group in components_by_index(&substrate, &seeds, zone) {
        if group.len() < config.thresholds.small_group {
            substrate.fill_region(&group, Cell::EMPTY);
        }
    }
    substrate
}

/// Infers display values for substrate groups that are almost enclosed by
/// valid echo: the group takes the rounded mean of its valid surround, in
/// base-fill encoding so the pairing stage can still tell it apart.
pub(super) fn infer_base_fill(denoised: &mut CellRaster, config: &Config) {
    let zone = config.radar_zone;
    let seeds: Vec<Point> = zone
        .coords()
        .filter(|&(x, y)| denoised.get(x, y).is_base())
        .collect();

    let groups = components_where(denoised, &seeds, zone, |c| c.is_base());
    for group in groups {
        let mut surround: HashSet<Point> = HashSet::new();
        let mut valid_indices: Vec<i8> = Vec::new();
        for &(x, y) in &group {
            for (dx, dy) in NEIGHBORS_4 {
                let (nx, ny) = (x + dx, y + dy);
                // Base-encoded neighbors (this group or another) are not
                // surround; empty and valid pixels are.
                if denoised.index_at(nx, ny) != denoised.valid_index_at(nx, ny) {
                    continue;
                }
                if surround.insert((nx, ny)) {
                    let index = denoised.index_at(nx, ny);
                    if index >= 0 {
                        valid_indices.push(index);
                    }
                }
            }
        }
        if surround.is_empty() {
            continue;
        }
        let ratio = valid_indices.len() as f32 / surround.len() as f32;
        if ratio >= config.thresholds.base_echo_surround_ratio {
            let mean = valid_indices.iter().map(|&i| i as f32).sum::<f32>()
                / valid_indices.len() as f32;
            denoised.fill_region(&group, Cell::inferred(mean.round() as i8));
        }
    }
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

    #[test]
    fn test_substrate_flattens_and_closes() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        // A layer-5 ring with a layer-4 rim: all one substrate component.
        for v in 10..=20 {
            filled.set(v, 10, Cell::echo(5));
            filled.set(v, 20, Cell::echo(5));
            filled.set(10, v, Cell::echo(4));
            filled.set(20, v, Cell::echo(4));
        }

        let layers = layer_model(&filled, &config);
        let substrate = base_substrate(&filled, &layers, Sign::Negative, &config);

        let base = Sign::Negative.base_index(14);
        // Ring pixels and the enclosed interior all flatten to the base.
        assert!(substrate.get(10, 10).is_base_echo());
        assert_eq!(substrate.index_at(15, 15), base);
        assert!(substrate.get(15, 15).is_base_echo());
        // Outside stays empty.
        assert!(substrate.get(30, 30).is_empty());
    }

    #[test]
    fn test_substrate_drops_small_components() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        for x in 30..33 {
            for y in 30..33 {
                filled.set(x, y, Cell::echo(6));
            }
        }

        let layers = layer_model(&filled, &config);
        let substrate = base_substrate(&filled, &layers, Sign::Negative, &config);
        assert!(substrate.get(31, 31).is_empty());
    }

    #[test]
    fn test_base_fill_takes_surround_mean() {
        let config = config();
        let mut denoised = CellRaster::new(64, 64);
        // A 3x3 base pocket fully enclosed by valid echo of indices 4 and 5.
        for x in 9..=15 {
            for y in 9..=15 {
                let index = if x < 12 { 4 } else { 5 };
                denoised.set(x, y, Cell::echo(index));
            }
        }
        for x in 11..=13 {
            for y in 11..=13 {
                denoised.set(x, y, Cell::base(6));
            }
        }

        infer_base_fill(&mut denoised, &config);
        let filled = denoised.get(12, 12);
        assert!(filled.is_base_fill());
        // Surround carries five 4s and seven 5s; the mean 4.58 rounds to 5.
        assert_eq!(filled.index(), 5);
    }

    #[test]
    fn test_base_fill_skips_exposed_groups() {
        let config = config();
        let mut denoised = CellRaster::new(64, 64);
        // Base pocket with only one valid neighbor column; mostly empty around.
        for y in 11..=13 {
            denoised.set(10, y, Cell::echo(4));
        }
        for x in 11..=13 {
            for y in 11..=13 {
                denoised.set(x, y, Cell::base(6));
            }
        }

        infer_base_fill(&mut denoised, &config);
        assert!(denoised.get(12, 12).is_base_echo());
    }
}
