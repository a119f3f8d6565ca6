//! Tree placement driver
//!
//! Reads classified LAS/LAZ point clouds and writes terrain, trees and shrubs
//! into a voxel world.
//!
//! Usage:
//!     place_trees [OPTIONS] <INPUT>...
//!
//! Options:
//!     -w, --world <DIR>       World directory; loaded if present, saved at the end
//!     -c, --config <FILE>     JSON pipeline configuration
//!     --report <FILE>         Write per-tile reports as JSON
//!     --preview <FILE>        Write a top-down PNG of the result
//!     --no-dem                Do not build terrain from ground points
//!     --no-shrubs             Do not place low vegetation
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use treevox::cloud::{class, partition, LasPointSource, PointSource, RawPoint};
use treevox::core::logging;
use treevox::export::preview;
use treevox::ground::{DemRasterizer, SurfaceHeightField, TileGround};
use treevox::trees::{ShrubPlacer, TileCondition, TilePipeline, TileReport};
use treevox::voxel::{disk_io, Material, VoxelWorld};
use treevox::{PipelineConfig, Result};

fn print_help() {
    eprintln!("place_trees - Reconstruct voxel trees from classified point clouds");
    eprintln!();
    eprintln!("Usage: place_trees [OPTIONS] <INPUT>...");
    eprintln!();
    eprintln!("Inputs are .las/.laz files or directories containing them.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -w, --world <DIR>       World directory; loaded if present, saved at the end");
    eprintln!("    -c, --config <FILE>     JSON pipeline configuration");
    eprintln!("    --report <FILE>         Write per-tile reports as JSON");
    eprintln!("    --preview <FILE>        Write a top-down PNG of the result");
    eprintln!("    --no-dem                Do not build terrain from ground points");
    eprintln!("    --no-shrubs             Do not place low vegetation");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    place_trees -w ./worlds/park -c park.json ./lidar/");
    eprintln!("    place_trees --no-dem --preview canopy.png tile_0412.laz");
}

#[derive(Debug)]
struct Args {
    inputs: Vec<PathBuf>,
    world: Option<PathBuf>,
    config: Option<PathBuf>,
    report: Option<PathBuf>,
    preview: Option<PathBuf>,
    no_dem: bool,
    no_shrubs: bool,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing input".to_string());
    }

    let mut inputs = Vec::new();
    let mut world = None;
    let mut config = None;
    let mut report = None;
    let mut preview = None;
    let mut no_dem = false;
    let mut no_shrubs = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-w" | "--world" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --world".to_string());
                }
                world = Some(PathBuf::from(&args[i]));
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--report" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --report".to_string());
                }
                report = Some(PathBuf::from(&args[i]));
            }
            "--preview" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --preview".to_string());
                }
                preview = Some(PathBuf::from(&args[i]));
            }
            "--no-dem" => no_dem = true,
            "--no-shrubs" => no_shrubs = true,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => inputs.push(PathBuf::from(path)),
        }
        i += 1;
    }

    if inputs.is_empty() {
        return Err("Missing input".to_string());
    }

    Ok(Args {
        inputs,
        world,
        config,
        report,
        preview,
        no_dem,
        no_shrubs,
    })
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    let mut world = match &args.world {
        Some(dir) if disk_io::world_exists(dir) => disk_io::load_world(dir)?,
        _ => VoxelWorld::new(config.world),
    };

    let files = LasPointSource::collect_inputs(&args.inputs)?;
    println!("Input files: {}", files.len());
    let start = Instant::now();
    let mut source = LasPointSource::new(
        files,
        config.transform.clone(),
        vec![class::GROUND, class::LOW_VEGETATION, class::HIGH_VEGETATION],
    );
    let points = source.read_points()?;
    log::info!("Read {} points in {:.1}s", points.len(), start.elapsed().as_secs_f64());

    let of_class = |id: u8| -> Vec<RawPoint> {
        points.iter().filter(|p| p.classification == id).copied().collect()
    };

    // Terrain first so tree tiles can find their ground
    if config.dem.enabled && !args.no_dem {
        let rasterizer = DemRasterizer::new(config.dem.clone());
        if let Some(grid) = rasterizer.build(&of_class(class::GROUND)) {
            rasterizer.rasterize(&grid, &mut world)?;
        } else {
            log::warn!("No ground points, terrain not built");
        }
    }

    let vegetation: Vec<Material> = Material::ALL.into_iter().filter(|m| m.is_vegetation()).collect();
    log::info!("Horizontal clustering: {}", config.tree.horizontal.name());
    let pipeline = TilePipeline::new(config.tree.clone());
    let tiles = partition(&points, class::HIGH_VEGETATION);
    let tree_start = Instant::now();
    let mut reports: Vec<TileReport> = Vec::with_capacity(tiles.len());

    for tile in &tiles {
        let ground = TileGround::capture(
            tile.coord,
            &SurfaceHeightField::new(&world).with_ignored(&vegetation),
        );
        let report = pipeline.run(tile, &ground, &mut world)?;
        log::info!(
            "Tile ({}, {}): {} points, {} trees, {} leaves, {} branch voxels, {} conditions",
            tile.coord.x,
            tile.coord.z,
            report.input_points,
            report.trunks.len(),
            report.leaves_placed,
            report.branch_voxels,
            report.conditions.len()
        );
        reports.push(report);
    }
    log::info!(
        "Processed {} tiles in {:.1}s",
        tiles.len(),
        tree_start.elapsed().as_secs_f64()
    );

    if config.shrubs.enabled && !args.no_shrubs {
        ShrubPlacer::new(config.shrubs.clone()).place(&of_class(class::LOW_VEGETATION), &mut world)?;
    }

    if let Some(dir) = &args.world {
        let saved = disk_io::save_world(dir, &mut world)?;
        println!("Saved {} chunks to {}", saved, dir.display());
    }

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&reports)?)?;
        println!("Report: {}", path.display());
    }

    if let Some(path) = &args.preview {
        preview::save_canopy(&world, path)?;
    }

    let trees: usize = reports.iter().map(|r| r.trunks.len()).sum();
    let leaves: usize = reports.iter().map(|r| r.leaves_placed).sum();
    let infeasible = reports
        .iter()
        .filter(|r| r.has_condition(|c| matches!(c, TileCondition::ClusteringInfeasible { .. })))
        .count();

    println!();
    println!("Summary:");
    println!("  Tiles processed: {}", reports.len());
    println!("  Trees placed: {}", trees);
    println!("  Leaf voxels: {}", leaves);
    println!("  Tiles without clustering: {}", infeasible);
    println!("  Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
