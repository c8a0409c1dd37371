use serde::Deserialize;
use std::error::Error;
use std::path::Path;

use voxtrace_accel::{BvhConfig, KdTreeConfig};
use voxtrace_field::{PaletteConfig, TerrainConfig};
use voxtrace_greedy::{GreedyConfig, LightmapConfig};
use voxtrace_layout::LayoutConfig;

/// Everything a scene build reads from its TOML file. Every table is optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub greedy: GreedyConfig,
    #[serde(default)]
    pub bvh: BvhConfig,
    #[serde(default)]
    pub kdtree: KdTreeConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub lightmap: LightmapConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        voxtrace_field::load_toml(path)
    }
}
