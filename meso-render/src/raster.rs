//! Raster views: legend colors, channel grayscale, and region overlays.

use image::RgbImage;

use meso_model::config::Config;
use meso_model::raster::CellRaster;
use meso_model::region::Region;

use crate::result::{Error, Result};

pub(crate) fn check_size(raster: &CellRaster, config: &Config) -> Result<()> {
    let (width, height) = config.image_size;
    if raster.width() != width as usize || raster.height() != height as usize {
        return Err(Error::SizeMismatch {
            config_width: width,
            config_height: height,
            raster_width: raster.width() as u32,
            raster_height: raster.height() as u32,
        });
    }
    Ok(())
}

fn channel_level(index: i8, unit: u8) -> u8 {
    if index < 0 {
        0
    } else {
        ((index as u16 + 1) * unit as u16).min(255) as u8
    }
}

/// Renders the raster in its legend colors on a black background. Base-fill
/// pixels take the color of their inferred index; empty pixels stay black.
pub fn render_legend_colors(raster: &CellRaster, config: &Config) -> Result<RgbImage> {
    check_size(raster, config)?;
    let mut image = RgbImage::new(config.image_size.0, config.image_size.1);
    for (x, y) in config.radar_zone.coords() {
        let index = raster.index_at(x, y);
        if index >= 0 {
            if let Some(entry) = config.legend.get(index as usize) {
                image.put_pixel(x as u32, y as u32, image::Rgb(entry.color));
            }
        }
    }
    Ok(image)
}

/// Renders the raster's three index channels as gray levels, one image
/// channel each: `(index + 1) * gray_scale_unit`, with empty channels at 0.
/// Valid echo comes out neutral gray; substrate encodings show up tinted.
pub fn render_grayscale(raster: &CellRaster, config: &Config) -> Result<RgbImage> {
    check_size(raster, config)?;
    let unit = config.gray_scale_unit;
    let mut image = RgbImage::new(config.image_size.0, config.image_size.1);
    for (x, y) in config.radar_zone.coords() {
        let cell = raster.get(x, y);
        if cell.index() < 0 && cell.valid_index() < 0 && cell.reserved_index() < 0 {
            continue;
        }
        image.put_pixel(
            x as u32,
            y as u32,
            image::Rgb([
                channel_level(cell.index(), unit),
                channel_level(cell.valid_index(), unit),
                channel_level(cell.reserved_index(), unit),
            ]),
        );
    }
    Ok(image)
}

/// Renders only the given regions, in the legend colors the raster assigns
/// to their pixels.
pub fn render_regions(
    raster: &CellRaster,
    regions: &[Region],
    config: &Config,
) -> Result<RgbImage> {
    check_size(raster, config)?;
    let mut image = RgbImage::new(config.image_size.0, config.image_size.1);
    for region in regions {
        for &(x, y) in region {
            if !raster.in_bounds(x, y) {
                continue;
            }
            let index = raster.index_at(x, y);
            if index >= 0 {
                if let Some(entry) = config.legend.get(index as usize) {
                    image.put_pixel(x as u32, y as u32, image::Rgb(entry.color));
                }
            }
        }
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meso_model::cell::Cell;
    use meso_model::config::{standard_legend, RadarZone};

    fn config() -> Config {
        Config::new(
            (32, 32),
            (16, 16),
            RadarZone { min: 2, max: 30 },
            standard_legend(),
        )
    }

    #[test]
    fn test_legend_color_round_trip() {
        let config = config();
        let mut raster = CellRaster::new(32, 32);
        raster.set(10, 10, Cell::echo(0));
        raster.set(11, 10, Cell::inferred(13));

        let image = render_legend_colors(&raster, &config).expect("renders");
        assert_eq!(image.get_pixel(10, 10).0, [0, 224, 255]);
        assert_eq!(image.get_pixel(11, 10).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(20, 20).0, [0, 0, 0]);
    }

    #[test]
    fn test_grayscale_channels_encode_cell_kind() {
        let config = config();
        let mut raster = CellRaster::new(32, 32);
        raster.set(10, 10, Cell::echo(2));
        raster.set(11, 10, Cell::base(6));
        raster.set(12, 10, Cell::inferred(4));

        let image = render_grayscale(&raster, &config).expect("renders");
        assert_eq!(image.get_pixel(10, 10).0, [51, 51, 51]);
        assert_eq!(image.get_pixel(11, 10).0, [119, 0, 119]);
        assert_eq!(image.get_pixel(12, 10).0, [85, 0, 0]);
    }

    #[test]
    fn test_region_rendering_is_restricted_to_regions() {
        let config = config();
        let mut raster = CellRaster::new(32, 32);
        raster.set(10, 10, Cell::echo(3));
        raster.set(20, 20, Cell::echo(3));

        let image =
            render_regions(&raster, &[vec![(10, 10)]], &config).expect("renders");
        assert_eq!(image.get_pixel(10, 10).0, standard_legend()[3].color);
        assert_eq!(image.get_pixel(20, 20).0, [0, 0, 0]);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let config = config();
        let raster = CellRaster::new(16, 16);
        assert!(matches!(
            render_legend_colors(&raster, &config),
            Err(Error::SizeMismatch { .. })
        ));
    }
}
