//! Per-sign denoising.
//!
//! Each velocity sign is cleaned independently against a *base-echo
//! substrate*: every pixel of the sign is first flattened to the sign's base
//! index, so later steps can tell "some echo of this sign exists here" apart
//! from "this exact layer value is trusted". The steps, in order:
//!
//! 1. Base substrate: flatten the sign, fill enclosed holes, drop
//!    image-scale specks ([`substrate::base_substrate`]).
//! 2. Layer trust split: per layer, components at or above the trust size
//!    are painted as valid echo and their holes filled; smaller ones are
//!    held back ([`layer_filter`]).
//! 3. Small-group classification against their support and surround
//!    ([`small_groups::classify_small_groups`]).
//! 4. Isolated prune: valid-echo components still below the trust size are
//!    dropped and the substrate re-closed ([`prune_isolated`]).
//! 5. Base-fill inference over remaining substrate
//!    ([`substrate::infer_base_fill`]).
//! 6. Residual substrate removal ([`strip_base_echo`]).

mod small_groups;
mod substrate;

use log::debug;

use meso_model::cell::Cell;
use meso_model::config::{Config, RadarZone};
use meso_model::raster::{CellRaster, Point};
use meso_model::region::{components_by_index, components_where, Region};

use crate::sign::Sign;

/// Denoises one velocity sign of the narrow-filled raster.
///
/// `layers` is the layer model of `filled`. The result contains only the
/// requested sign's echoes, as valid-echo or base-fill cells.
pub fn denoise_sign(
    filled: &CellRaster,
    layers: &[Vec<Point>],
    sign: Sign,
    config: &Config,
) -> CellRaster {
    let base = sign.base_index(config.legend_len());

    let mut denoised = substrate::base_substrate(filled, layers, sign, config);
    let small_groups = layer_filter(filled, layers, sign, config, &mut denoised);
    debug!(
        "{} denoise: {} small group(s) held for surround analysis",
        sign.label(),
        small_groups.len()
    );
    small_groups::classify_small_groups(&mut denoised, sign, &small_groups, config);
    prune_isolated(&mut denoised, base, config);
    substrate::infer_base_fill(&mut denoised, config);
    strip_base_echo(&mut denoised, config.radar_zone);

    denoised
}

/// Paints each layer's trusted components as valid echo, closes the holes
/// inside them, and collects the untrusted components for classification.
/// Layers are walked from the sign's base toward its extreme so that later
/// (stronger) layers stack on top of earlier ones.
fn layer_filter(
    filled: &CellRaster,
    layers: &[Vec<Point>],
    sign: Sign,
    config: &Config,
    denoised: &mut CellRaster,
) -> Vec<(i8, Region)> {
    let zone = config.radar_zone;
    let mut small_groups = Vec::new();

    for layer in sign.denoise_layers(config.legend_len()) {
        let cell = Cell::echo(layer as i8);
        let mut reference = CellRaster::new(filled.width(), filled.height());

        for group in components_by_index(filled, &layers[layer], zone) {
            if group.len() >= config.thresholds.small_group {
                denoised.fill_region(&group, cell);
                reference.fill_region(&group, cell);
            } else if !group.is_empty() {
                small_groups.push((layer as i8, group));
            }
        }

        // Voids enclosed by this layer's trusted groups take the layer value.
        for (x, y) in reference.inner_holes(zone) {
            denoised.set(x, y, cell);
        }
    }
    small_groups
}

/// Drops valid-echo components that stayed below the trust size even after
/// small-group classification, then re-closes the substrate around them.
fn prune_isolated(denoised: &mut CellRaster, base: i8, config: &Config) {
    let zone = config.radar_zone;
    let seeds: Vec<Point> = zone
        .coords()
        .filter(|&(x, y)| denoised.valid_index_at(x, y) >= 0)
        .collect();

    for group in components_where(denoised, &seeds, zone, |c| c.valid_index() >= 0) {
        if group.len() < config.thresholds.small_group {
            denoised.fill_region(&group, Cell::EMPTY);
        }
    }

    let holes = denoised.inner_holes(zone);
    for (x, y) in holes {
        denoised.set(x, y, Cell::base(base));
    }
}

/// Clears every remaining base-echo pixel; only valid echo and inferred
/// base fill survive the sign pass.
fn strip_base_echo(denoised: &mut CellRaster, zone: RadarZone) {
    for (x, y) in zone.coords() {
        let cell = denoised.get(x, y);
        if cell.valid_index() != cell.reserved_index() {
            denoised.set(x, y, Cell::EMPTY);
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

    fn blob(raster: &mut CellRaster, x0: i32, y0: i32, width: i32, height: i32, index: i8) {
        for x in x0..x0 + width {
            for y in y0..y0 + height {
                raster.set(x, y, Cell::echo(index));
            }
        }
    }

    #[test]
    fn test_trusted_group_survives_with_valid_encoding() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 10, 10, 8, 8, 5); // 64 pixels of a negative layer

        let layers = layer_model(&filled, &config);
        let denoised = denoise_sign(&filled, &layers, Sign::Negative, &config);

        assert!(denoised.get(12, 12).is_echo());
        assert_eq!(denoised.index_at(12, 12), 5);
    }

    #[test]
    fn test_lone_speck_is_removed() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 30, 30, 2, 2, 4); // 4 pixels, far below trust size

        let layers = layer_model(&filled, &config);
        let denoised = denoise_sign(&filled, &layers, Sign::Negative, &config);

        for (x, y) in config.radar_zone.coords() {
            assert!(denoised.get(x, y).is_empty(), "({}, {}) should be empty", x, y);
        }
    }

    #[test]
    fn test_small_cap_on_trusted_echo_is_kept_within_gap() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 10, 10, 10, 10, 5); // trusted layer-5 slab
        blob(&mut filled, 13, 13, 2, 2, 3); // small cap two layers stronger

        let layers = layer_model(&filled, &config);
        let denoised = denoise_sign(&filled, &layers, Sign::Negative, &config);

        assert_eq!(denoised.index_at(13, 13), 3);
        assert!(denoised.get(13, 13).is_echo());
        assert_eq!(denoised.index_at(11, 11), 5);
    }

    #[test]
    fn test_small_cap_beyond_gap_is_dropped_to_support() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 10, 10, 10, 10, 6); // weak trusted slab
        blob(&mut filled, 13, 13, 2, 2, 0); // implausible six-layer jump

        let layers = layer_model(&filled, &config);
        let denoised = denoise_sign(&filled, &layers, Sign::Negative, &config);

        // The cap is not painted with its own value; the slab's inner fill
        // of the hole wins instead.
        assert_eq!(denoised.index_at(13, 13), 6);
    }

    #[test]
    fn test_opposite_sign_is_invisible() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 10, 10, 8, 8, 10); // positive-half echo

        let layers = layer_model(&filled, &config);
        let denoised = denoise_sign(&filled, &layers, Sign::Negative, &config);

        assert!(denoised.get(12, 12).is_empty());
    }

    #[test]
    fn test_encoding_is_well_formed_throughout() {
        let config = config();
        let mut filled = CellRaster::new(64, 64);
        blob(&mut filled, 10, 10, 10, 10, 5);
        blob(&mut filled, 26, 10, 3, 3, 2);
        blob(&mut filled, 40, 40, 9, 9, 12);

        let layers = layer_model(&filled, &config);
        for sign in Sign::BOTH {
            let denoised = denoise_sign(&filled, &layers, sign, &config);
            for (x, y) in config.radar_zone.coords() {
                assert!(denoised.get(x, y).is_well_formed());
                // Base echo never leaks out of the sign pass.
                assert!(!denoised.get(x, y).is_base_echo());
            }
        }
    }
}
