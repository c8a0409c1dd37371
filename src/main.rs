mod config;
mod scene;

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use voxtrace_field::{VoxelField, generate_terrain};
use voxtrace_layout::LayoutConfig;

use crate::config::SceneConfig;

#[derive(Parser)]
#[command(name = "voxtrace", about = "Build GPU ray-tracing buffers for voxel scenes")]
struct Cli {
    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a terrain scene and write its buffers
    Build {
        /// Scene TOML file; missing tables use defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output directory for the .bin buffers
        #[arg(long, short, default_value = "out")]
        out: PathBuf,
        /// Terrain seed
        #[arg(long)]
        seed: Option<i32>,
        /// Horizontal terrain size in cells (height is three quarters of it)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=255))]
        size: Option<u16>,
        /// Target a shader with 16-bit integers (short ropes and voxels)
        #[arg(long)]
        int16: bool,
    },
    /// Build a solid cube scene and write its buffers
    Cube {
        /// Edge length in cells; triangle bounds reach one cell past it, so at most 255
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..=255))]
        size: u16,
        /// Output directory for the .bin buffers
        #[arg(long, short, default_value = "out")]
        out: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Build {
            config,
            out,
            seed,
            size,
            int16,
        } => {
            let mut cfg = match config {
                Some(path) => {
                    log::info!("loading scene config {}", path.display());
                    SceneConfig::load(&path)?
                }
                None => SceneConfig::default(),
            };
            if let Some(seed) = seed {
                cfg.terrain.seed = seed;
            }
            if let Some(size) = size {
                let size = size as usize;
                cfg.terrain.size = [size, (size * 3 / 4).max(1), size];
            }
            if int16 {
                cfg.layout = LayoutConfig::for_shader_int16(true);
            }
            if cfg.terrain.size.contains(&0) {
                return Err(format!("terrain size {:?} has an empty axis", cfg.terrain.size).into());
            }
            let field = generate_terrain(&cfg.terrain);
            scene::build_buffers(&field, &cfg)?.write_to(&out)?;
            log::info!("buffers written to {}", out.display());
            Ok(())
        }
        Command::Cube { size, out } => {
            let size = size as usize;
            let mut field = VoxelField::new(size, size, size);
            field.fill_box(field.bounds(), 1);
            scene::build_buffers(&field, &SceneConfig::default())?.write_to(&out)?;
            log::info!("buffers written to {}", out.display());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli.command) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
