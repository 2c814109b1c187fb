//!
//! meso: detect mesocyclones in a rendered Doppler velocity radar image.
//!
//! Loads a YAML radar configuration and one image, runs the detection
//! pipeline, prints the detected records, and writes the visualization
//! artifacts plus a YAML report into the output directory.
//!

mod config_file;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use image::RgbImage;
use log::{error, info};
use thiserror::Error as ThisError;

use meso_detect::ingest::needs_boundary_cover;
use meso_detect::metadata::{is_station_id, scan_metadata};
use meso_detect::{detect, Detection};
use meso_model::config::Config;
use meso_model::detection::DetectionOutput;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Radar velocity image to analyze
    image: PathBuf,

    /// YAML radar configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the report and visualization images
    #[arg(short, long, default_value = "detections")]
    output: PathBuf,

    /// Directory holding white_boundary_<station>.png basemaps
    #[arg(long)]
    basemap_dir: Option<PathBuf>,

    /// Station identifier override (defaults to the one in the filename)
    #[arg(long)]
    station: Option<String>,

    /// Seed override for the narrow-fill tie-break
    #[arg(long)]
    seed: Option<u64>,

    /// Interpret the center-distance threshold as kilometers
    #[arg(long)]
    km_distance: bool,
}

#[derive(ThisError, Debug)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("detection error: {0}")]
    Detection(String),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Config(_) => 2,
            CliError::Io(_) => 3,
            CliError::Detection(_) => 4,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

impl From<image::ImageError> for CliError {
    fn from(err: image::ImageError) -> Self {
        CliError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<meso_model::result::Error> for CliError {
    fn from(err: meso_model::result::Error) -> Self {
        CliError::Config(err.to_string())
    }
}

impl From<meso_detect::Error> for CliError {
    fn from(err: meso_detect::Error) -> Self {
        match err {
            meso_detect::Error::Config(inner) => CliError::Config(inner.to_string()),
            other => CliError::Detection(other.to_string()),
        }
    }
}

impl From<meso_render::result::Error> for CliError {
    fn from(err: meso_render::result::Error) -> Self {
        CliError::Detection(err.to_string())
    }
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = config_file::load(&cli.config)?;
    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if cli.km_distance {
        config.center_distance_unit = meso_model::config::DistanceUnit::Kilometers;
        config.validate()?;
    }

    let file_name = cli
        .image
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();

    let (station_id, scan_time) = match &cli.station {
        Some(station) => {
            if !is_station_id(station) {
                return Err(CliError::Detection(format!(
                    "station identifier {station:?} does not match the Z#### pattern"
                )));
            }
            let scan_time = scan_metadata(&file_name)
                .ok()
                .and_then(|meta| meta.scan_time);
            (station.clone(), scan_time)
        }
        None => {
            let meta = scan_metadata(&file_name)?;
            (meta.station_id, meta.scan_time)
        }
    };
    info!("station {station_id}, scan time {scan_time:?}");

    let frame = image::open(&cli.image)?.to_rgb8();
    let basemap = load_basemap(&cli, &station_id)?;

    let detection = detect(&frame, &config, basemap.as_ref())?;
    print_records(&detection);

    fs::create_dir_all(&cli.output)?;
    write_artifacts(&cli.output, &detection, &config)?;

    let report = DetectionOutput {
        records: detection.records,
        station_id: Some(station_id),
        scan_time,
    };
    let report_path = cli.output.join("report.yaml");
    fs::write(&report_path, serde_yaml::to_string(&report)?)?;
    info!("report written to {}", report_path.display());

    Ok(())
}

fn load_basemap(cli: &Cli, station_id: &str) -> Result<Option<RgbImage>, CliError> {
    if !needs_boundary_cover(station_id) {
        return Ok(None);
    }
    let Some(dir) = &cli.basemap_dir else {
        return Err(CliError::Detection(format!(
            "station {station_id} requires a boundary basemap; pass --basemap-dir"
        )));
    };
    let path = dir.join(format!("white_boundary_{station_id}.png"));
    info!("covering boundary lines with {}", path.display());
    Ok(Some(image::open(&path)?.to_rgb8()))
}

fn print_records(detection: &Detection) {
    if detection.records.is_empty() {
        println!("No mesocyclone detected.");
        return;
    }
    for record in &detection.records {
        println!("Mesocyclone #{}:", record.storm_num);
        println!("    logic center:  {:?}", record.logic_center);
        println!("    radar distance: {:.1} px", record.radar_distance);
        println!("    radar bearing:  {:.1} deg", record.radar_angle_deg);
        println!("    shear:          {:.1} m/s", record.shear);
        println!(
            "    negative peak:  {:?} at {:.1} m/s",
            record.neg_center, record.neg_max_velocity
        );
        println!(
            "    positive peak:  {:?} at {:.1} m/s",
            record.pos_center, record.pos_max_velocity
        );
    }
}


fn write_artifacts(
    output: &std::path::Path,
    detection: &Detection,
    config: &Config,
) -> Result<(), CliError> {
    let unfolded = meso_render::render_legend_colors(&detection.unfolded, config)?;
    unfolded.save(output.join("unfolded.png"))?;

    let overlay = meso_render::render_detection(
        &detection.unfolded,
        &detection.neg_regions,
        &detection.pos_regions,
        &detection.records,
        config,
    )?;
    overlay.save(output.join("detection.png"))?;

    for record in &detection.records {
        let window = meso_render::render_record_window(&detection.unfolded, record, config)?;
        window.save(output.join(format!("meso_{}.png", record.storm_num + 1)))?;
    }
    Ok(())
}
