//! Heightmap terrain for demo scenes, generated one depth slice per worker.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use rayon::prelude::*;
use serde::Deserialize;
use std::time::Instant;

use crate::VoxelField;

pub const STONE: u8 = 1;
pub const DIRT: u8 = 2;
pub const GRASS: u8 = 3;
pub const SAND: u8 = 4;
pub const SNOW: u8 = 5;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    #[serde(default = "default_size")]
    pub size: [usize; 3],
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_min_height_ratio")]
    pub min_height_ratio: f32,
    #[serde(default = "default_max_height_ratio")]
    pub max_height_ratio: f32,
    #[serde(default = "default_topsoil")]
    pub topsoil: usize,
    #[serde(default = "default_sand_ratio")]
    pub sand_ratio: f32,
    #[serde(default = "default_snow_ratio")]
    pub snow_ratio: f32,
    /// Carve caves where 3D noise exceeds this value. `None` disables caves.
    #[serde(default)]
    pub cave_threshold: Option<f32>,
    #[serde(default = "default_cave_frequency")]
    pub cave_frequency: f32,
}

fn default_size() -> [usize; 3] {
    [64, 48, 64]
}
fn default_seed() -> i32 {
    1337
}
fn default_frequency() -> f32 {
    0.03
}
fn default_min_height_ratio() -> f32 {
    0.15
}
fn default_max_height_ratio() -> f32 {
    0.75
}
fn default_topsoil() -> usize {
    3
}
fn default_sand_ratio() -> f32 {
    0.25
}
fn default_snow_ratio() -> f32 {
    0.65
}
fn default_cave_frequency() -> f32 {
    0.08
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            seed: default_seed(),
            frequency: default_frequency(),
            min_height_ratio: default_min_height_ratio(),
            max_height_ratio: default_max_height_ratio(),
            topsoil: default_topsoil(),
            sand_ratio: default_sand_ratio(),
            snow_ratio: default_snow_ratio(),
            cave_threshold: None,
            cave_frequency: default_cave_frequency(),
        }
    }
}

struct SliceNoise {
    height: FastNoiseLite,
    caves: FastNoiseLite,
}

fn make_noise(cfg: &TerrainConfig) -> SliceNoise {
    let mut height = FastNoiseLite::with_seed(cfg.seed);
    height.set_noise_type(Some(NoiseType::OpenSimplex2));
    height.set_frequency(Some(cfg.frequency));
    let mut caves = FastNoiseLite::with_seed(cfg.seed ^ 41_337);
    caves.set_noise_type(Some(NoiseType::OpenSimplex2));
    caves.set_frequency(Some(cfg.cave_frequency));
    SliceNoise { height, caves }
}

fn column_height(noise: &SliceNoise, cfg: &TerrainConfig, x: usize, z: usize) -> usize {
    if cfg.size[1] == 0 {
        return 0;
    }
    let sy = cfg.size[1] as f32;
    let n = noise.height.get_noise_2d(x as f32, z as f32);
    let min_h = sy * cfg.min_height_ratio;
    let max_h = sy * cfg.max_height_ratio;
    let h = ((n + 1.0) * 0.5 * (max_h - min_h) + min_h) as usize;
    h.clamp(1, cfg.size[1])
}

fn material_at(cfg: &TerrainConfig, y: usize, height: usize) -> u8 {
    let sy = cfg.size[1] as f32;
    if y + 1 == height {
        if height as f32 >= sy * cfg.snow_ratio {
            SNOW
        } else if height as f32 <= sy * cfg.sand_ratio {
            SAND
        } else {
            GRASS
        }
    } else if y + 1 + cfg.topsoil >= height {
        DIRT
    } else {
        STONE
    }
}

/// Generates a heightmap terrain field.
///
/// Each padded `z` plane is filled by one rayon task that owns that slice of the
/// storage and its own noise state, so the result does not depend on scheduling.
pub fn generate_terrain(cfg: &TerrainConfig) -> VoxelField {
    let t0 = Instant::now();
    let [sx, sy, sz] = cfg.size;
    let mut field = VoxelField::new(sx, sy, sz);
    let (px, py, _) = field.padded_dims();
    let plane = px * py;
    field
        .as_padded_mut()
        .par_chunks_mut(plane)
        .enumerate()
        .filter(|(pz, _)| *pz >= 1 && *pz <= sz)
        .for_each(|(pz, slice)| {
            let noise = make_noise(cfg);
            let z = pz - 1;
            for x in 0..sx {
                let height = column_height(&noise, cfg, x, z);
                for y in 0..height {
                    let carved = cfg.cave_threshold.is_some_and(|thr| {
                        y + 2 < height
                            && noise.caves.get_noise_3d(x as f32, y as f32, z as f32) > thr
                    });
                    if !carved {
                        slice[(y + 1) * px + x + 1] = material_at(cfg, y, height);
                    }
                }
            }
        });
    log::info!(
        "terrain {}x{}x{} seed={} generated in {:.2?} ({} solid cells)",
        sx,
        sy,
        sz,
        cfg.seed,
        t0.elapsed(),
        field.occupied_count()
    );
    field
}
