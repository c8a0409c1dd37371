use voxtrace_geom::{IVec3, Side};

use crate::VoxelField;

/// Parallel to a field's padded storage: `true` for occupied cells whose six
/// neighbours are all occupied. Such cells can never contribute a visible face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CullMask {
    bits: Vec<bool>,
    sx: usize,
    sy: usize,
}

impl CullMask {
    /// A mask that culls nothing.
    pub fn none(field: &VoxelField) -> Self {
        Self {
            bits: vec![false; field.as_padded().len()],
            sx: field.sx,
            sy: field.sy,
        }
    }

    #[inline]
    pub fn is_culled(&self, p: IVec3) -> bool {
        if p.x < 0 || p.y < 0 || p.z < 0 {
            return false;
        }
        let (x, y, z) = (p.x as usize + 1, p.y as usize + 1, p.z as usize + 1);
        if x > self.sx || y > self.sy {
            return false;
        }
        let i = (z * (self.sy + 2) + y) * (self.sx + 2) + x;
        self.bits.get(i).copied().unwrap_or(false)
    }

    pub fn culled_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    #[inline]
    pub fn as_padded(&self) -> &[bool] {
        &self.bits
    }
}

/// Marks every occupied cell that is enclosed on all six sides.
pub fn cull(field: &VoxelField) -> CullMask {
    let mut mask = CullMask::none(field);
    for (p, _) in field.occupied() {
        let enclosed = Side::ALL
            .iter()
            .all(|side| field.is_occupied(p + side.delta()));
        if enclosed {
            let i = field.idx(p.x as usize, p.y as usize, p.z as usize);
            mask.bits[i] = true;
        }
    }
    log::debug!(
        "cull: {} of {} occupied cells enclosed",
        mask.culled_count(),
        field.occupied_count()
    );
    mask
}
