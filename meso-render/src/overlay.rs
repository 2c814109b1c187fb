//! Detection overlays: center markers, pair connectors, and record crops.

use image::{Rgb, RgbImage};

use meso_model::config::Config;
use meso_model::detection::MesocycloneRecord;
use meso_model::raster::CellRaster;
use meso_model::region::Region;

use crate::raster::{check_size, render_regions};
use crate::result::Result;
use crate::CENTER_MARK_RADIUS;

const NEG_CENTER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const POS_CENTER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTER_DOT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CONNECTOR_COLOR: Rgb<u8> = Rgb([0, 255, 255]);

/// Renders the full detection picture: every extremum region in legend
/// colors, centroid disks for each record's negative (blue) and positive
/// (red) centers, and a cyan connector between them.
pub fn render_detection(
    raster: &CellRaster,
    neg_regions: &[Region],
    pos_regions: &[Region],
    records: &[MesocycloneRecord],
    config: &Config,
) -> Result<RgbImage> {
    let mut regions: Vec<Region> = Vec::with_capacity(neg_regions.len() + pos_regions.len());
    regions.extend_from_slice(neg_regions);
    regions.extend_from_slice(pos_regions);
    let mut image = render_regions(raster, &regions, config)?;

    for record in records {
        draw_disk(&mut image, record.neg_center, CENTER_MARK_RADIUS, NEG_CENTER_COLOR);
        draw_disk(&mut image, record.pos_center, CENTER_MARK_RADIUS, POS_CENTER_COLOR);
        draw_line(&mut image, record.neg_center, record.pos_center, CONNECTOR_COLOR);
        put_pixel_checked(&mut image, record.neg_center, CENTER_DOT_COLOR);
        put_pixel_checked(&mut image, record.pos_center, CENTER_DOT_COLOR);
    }
    Ok(image)
}

/// Renders one record's neighborhood: the echo inside the disk spanned by
/// the pair, centered on the logic center, in legend colors.
pub fn render_record_window(
    raster: &CellRaster,
    record: &MesocycloneRecord,
    config: &Config,
) -> Result<RgbImage> {
    check_size(raster, config)?;
    let mut image = RgbImage::new(config.image_size.0, config.image_size.1);

    let (cx, cy) = record.logic_center;
    let dx = (record.neg_center.0 - record.pos_center.0) as f32;
    let dy = (record.neg_center.1 - record.pos_center.1) as f32;
    let radius = dx.hypot(dy).round() as i32;

    for x in cx - radius..=cx + radius {
        for y in cy - radius..=cy + radius {
            let ox = (x - cx) as f32;
            let oy = (y - cy) as f32;
            if ox.hypot(oy) > radius as f32 || !raster.in_bounds(x, y) {
                continue;
            }
            let index = raster.index_at(x, y);
            if index >= 0 {
                if let Some(entry) = config.legend.get(index as usize) {
                    image.put_pixel(x as u32, y as u32, Rgb(entry.color));
                }
            }
        }
    }
    Ok(image)
}

fn put_pixel_checked(image: &mut RgbImage, point: (i32, i32), color: Rgb<u8>) {
    let (x, y) = point;
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_disk(image: &mut RgbImage, center: (i32, i32), radius: i32, color: Rgb<u8>) {
    for x in center.0 - radius..=center.0 + radius {
        for y in center.1 - radius..=center.1 + radius {
            let dx = (x - center.0) as f32;
            let dy = (y - center.1) as f32;
            if dx.hypot(dy) <= radius as f32 {
                put_pixel_checked(image, (x, y), color);
            }
        }
    }
}

fn draw_line(image: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs());
    if steps == 0 {
        put_pixel_checked(image, from, color);
        return;
    }
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (from.0 as f32 + (to.0 - from.0) as f32 * t).round() as i32;
        let y = (from.1 as f32 + (to.1 - from.1) as f32 * t).round() as i32;
        put_pixel_checked(image, (x, y), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meso_model::cell::Cell;
    use meso_model::config::{standard_legend, RadarZone};

    fn config() -> Config {
        Config::new(
            (64, 64),
            (32, 32),
            RadarZone { min: 2, max: 62 },
            standard_legend(),
        )
    }

    fn record() -> MesocycloneRecord {
        MesocycloneRecord {
            storm_num: 0,
            logic_center: (32, 30),
            radar_distance: 2.0,
            radar_angle_deg: 0.0,
            shear: 27.5,
            neg_center: (30, 30),
            neg_max_velocity: -27.5,
            pos_center: (34, 30),
            pos_max_velocity: 27.5,
        }
    }

    #[test]
    fn test_detection_overlay_marks_centers() {
        let config = config();
        let mut raster = CellRaster::new(64, 64);
        raster.set(30, 30, Cell::echo(0));
        raster.set(34, 30, Cell::echo(13));

        let image = render_detection(
            &raster,
            &[vec![(30, 30)]],
            &[vec![(34, 30)]],
            &[record()],
            &config,
        )
        .expect("renders");

        // Center dots overwrite the disks at the centroids.
        assert_eq!(image.get_pixel(30, 30).0, [0, 255, 0]);
        assert_eq!(image.get_pixel(34, 30).0, [0, 255, 0]);
        // Marker disks are visible around them.
        assert_eq!(image.get_pixel(30, 27).0, [0, 0, 255]);
        assert_eq!(image.get_pixel(34, 33).0, [255, 0, 0]);
    }

    #[test]
    fn test_record_window_crops_to_the_pair_disk() {
        let config = config();
        let mut raster = CellRaster::new(64, 64);
        raster.set(32, 30, Cell::echo(5));
        raster.set(50, 50, Cell::echo(5));

        let image = render_record_window(&raster, &record(), &config).expect("renders");
        assert_eq!(image.get_pixel(32, 30).0, standard_legend()[5].color);
        // Echo outside the pair disk is not part of the crop.
        assert_eq!(image.get_pixel(50, 50).0, [0, 0, 0]);
    }

    #[test]
    fn test_marker_near_edge_is_clipped() {
        let config = config();
        let raster = CellRaster::new(64, 64);
        let mut edge_record = record();
        edge_record.neg_center = (1, 1);
        edge_record.pos_center = (3, 1);
        edge_record.logic_center = (2, 1);

        // Must not panic on out-of-image marker pixels.
        let image =
            render_detection(&raster, &[], &[], &[edge_record], &config).expect("renders");
        assert_eq!(image.get_pixel(1, 1).0, [0, 255, 0]);
    }
}
