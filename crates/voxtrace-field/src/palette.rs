use serde::Deserialize;

/// RGB colour per palette index. Index 0 is the empty cell and is never drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

/// Palette overrides as they appear in a scene file:
/// `colors = [{ index = 1, rgb = [r, g, b] }]`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaletteConfig {
    #[serde(default)]
    pub colors: Vec<PaletteEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct PaletteEntry {
    pub index: u8,
    pub rgb: [u8; 3],
}

impl Palette {
    /// Colours for the materials `generate_terrain` writes.
    pub fn terrain() -> Self {
        let mut colors = vec![[255u8, 0, 255]; 256];
        colors[0] = [0, 0, 0];
        colors[1] = [128, 128, 128]; // stone
        colors[2] = [134, 96, 67]; // dirt
        colors[3] = [95, 159, 53]; // grass
        colors[4] = [219, 211, 160]; // sand
        colors[5] = [240, 240, 240]; // snow
        Self { colors }
    }

    pub fn with_overrides(mut self, cfg: &PaletteConfig) -> Self {
        for e in &cfg.colors {
            self.colors[e.index as usize] = e.rgb;
        }
        self
    }

    #[inline]
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.colors[index as usize]
    }

    /// Colour packed as 5 bits per channel, red in the low bits.
    #[inline]
    pub fn rgb555(&self, index: u8) -> u16 {
        let [r, g, b] = self.rgb(index);
        (r as u16 >> 3) | ((g as u16 >> 3) << 5) | ((b as u16 >> 3) << 10)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::terrain()
    }
}
