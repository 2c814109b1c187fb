//! Connected-component extraction over cell rasters.
//!
//! Components are gathered by iterative stack-based depth-first search over
//! the 8-neighborhood, bounded by the radar zone. Recursion is never used;
//! echo regions can span thousands of pixels.

use crate::cell::Cell;
use crate::config::RadarZone;
use crate::raster::{CellRaster, Point, NEIGHBORS_8};

/// A connected set of pixel coordinates. The first element is the seed the
/// component was grown from and serves as its representative.
pub type Region = Vec<Point>;

/// Splits `seeds` into connected components of pixels sharing the seed's
/// displayed legend index.
pub fn components_by_index(
    raster: &CellRaster,
    seeds: &[Point],
    zone: RadarZone,
) -> Vec<Region> {
    components_impl(raster, seeds, zone, |seed, candidate| {
        candidate.index() == seed.index()
    })
}

/// Splits `seeds` into connected components of non-empty pixels, regardless
/// of their individual indices.
pub fn components_nonempty(
    raster: &CellRaster,
    seeds: &[Point],
    zone: RadarZone,
) -> Vec<Region> {
    components_impl(raster, seeds, zone, |_, candidate| candidate.index() >= 0)
}

/// Splits `seeds` into connected components of pixels satisfying an
/// arbitrary cell predicate.
pub fn components_where(
    raster: &CellRaster,
    seeds: &[Point],
    zone: RadarZone,
    predicate: impl Fn(Cell) -> bool,
) -> Vec<Region> {
    components_impl(raster, seeds, zone, |_, candidate| predicate(candidate))
}

fn components_impl(
    raster: &CellRaster,
    seeds: &[Point],
    zone: RadarZone,
    matches: impl Fn(Cell, Cell) -> bool,
) -> Vec<Region> {
    let mut visited = vec![false; raster.width() * raster.height()];
    let mut components = Vec::new();

    for &seed in seeds {
        let (sx, sy) = seed;
        if !raster.in_bounds(sx, sy) {
            continue;
        }
        let seed_idx = sy as usize * raster.width() + sx as usize;
        if visited[seed_idx] {
            continue;
        }
        visited[seed_idx] = true;

        let seed_cell = raster.get(sx, sy);
        let mut component: Region = vec![seed];
        let mut stack: Vec<Point> = vec![seed];

        while let Some((x, y)) = stack.pop() {
            for (dx, dy) in NEIGHBORS_8 {
                let (nx, ny) = (x + dx, y + dy);
                if !raster.in_bounds(nx, ny) || !zone.contains(nx, ny) {
                    continue;
                }
                let idx = ny as usize * raster.width() + nx as usize;
                if visited[idx] {
                    continue;
                }
                if matches(seed_cell, raster.get(nx, ny)) {
                    visited[idx] = true;
                    component.push((nx, ny));
                    stack.push((nx, ny));
                }
            }
        }
        components.push(component);
    }
    components
}
