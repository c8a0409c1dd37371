//! Scene-load pipeline: cull, merge, build the acceleration structures and
//! serialize every buffer a tracing shader binds.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::time::Instant;

use voxtrace_accel::{KdTree, MortonBvh, Ray};
use voxtrace_field::{CullMask, Palette, VoxelField, cull};
use voxtrace_geom::{Aabb, Boundable, Box3i, Triangle, Vec3, Voxel};
use voxtrace_greedy::{GreedyMeshing, GreedyVoxels, pack_lightmap};
use voxtrace_layout::{self as layout, VoxelFormat};

use crate::config::SceneConfig;

/// One serialized buffer, written to `<name>.bin`.
pub struct Buffer {
    pub name: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct SceneBuffers {
    pub buffers: Vec<Buffer>,
}

impl SceneBuffers {
    fn push(&mut self, name: &'static str, bytes: Vec<u8>) {
        log::debug!("{name}: {} bytes", bytes.len());
        self.buffers.push(Buffer { name, bytes });
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.buffers
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.bytes.as_slice())
    }

    pub fn total_bytes(&self) -> usize {
        self.buffers.iter().map(|b| b.bytes.len()).sum()
    }

    pub fn write_to(&self, dir: &Path) -> Result<(), Box<dyn Error>> {
        fs::create_dir_all(dir)?;
        for b in &self.buffers {
            let path = dir.join(format!("{}.bin", b.name));
            fs::write(&path, &b.bytes)?;
            log::debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

fn write_kd(
    out: &mut SceneBuffers,
    names: [&'static str; 3],
    tree: &KdTree,
    cfg: &SceneConfig,
) -> Result<(), Box<dyn Error>> {
    let [nodes_name, leaves_name, indices_name] = names;
    let mut nodes = Vec::new();
    layout::write_kd_nodes(&mut nodes, tree)?;
    let mut leaves = Vec::new();
    layout::write_kd_leaves(&mut leaves, tree, cfg.layout.rope_width)?;
    let mut indices = Vec::new();
    layout::write_indices(&mut indices, &tree.indices)?;
    out.push(nodes_name, nodes);
    out.push(leaves_name, leaves);
    out.push(indices_name, indices);
    Ok(())
}

/// Casts a ray straight down through the middle of the scene and logs what the
/// rope traversal hits first.
fn probe(tree: &KdTree, voxels: &[Voxel]) {
    let b = Aabb::from(tree.bounds);
    let origin = Vec3::new(
        (b.min.x + b.max.x) * 0.5 + 0.25,
        b.max.y + 1.0,
        (b.min.z + b.max.z) * 0.5 + 0.25,
    );
    let ray = Ray::new(origin, Vec3::new(0.0, -1.0, 0.0));
    let hit = tree.trace(&ray, |i| {
        ray.intersect_box(&Aabb::from(voxels[i as usize].bounds()))
            .map(|(t0, _)| t0)
    });
    match hit {
        Some(h) => log::info!(
            "probe: hit voxel {} at y={:.1} in leaf {}",
            h.primitive,
            ray.at(h.t).y,
            h.leaf
        ),
        None => log::info!("probe: ray left the scene without a hit"),
    }
}

/// Voxels for the tracing buffers. The short format has no extents, so it gets
/// the exposed cells one by one instead of merged boxes.
fn scene_voxels(field: &VoxelField, mask: &CullMask, cfg: &SceneConfig) -> Vec<Voxel> {
    match cfg.layout.voxel_format {
        VoxelFormat::Byte => GreedyVoxels::new(field, mask, &cfg.greedy).merge_to_vec(),
        VoxelFormat::Short => field
            .occupied()
            .filter(|&(p, _)| !mask.is_culled(p))
            .map(|(p, v)| Voxel::cell(p, v))
            .collect(),
    }
}

/// Runs every builder over `field` and serializes the results.
pub fn build_buffers(field: &VoxelField, cfg: &SceneConfig) -> Result<SceneBuffers, Box<dyn Error>> {
    let t0 = Instant::now();
    let palette = Palette::terrain().with_overrides(&cfg.palette);
    let mut out = SceneBuffers::default();

    let mask = cull(field);
    let voxels = scene_voxels(field, &mask, cfg);
    log::info!(
        "voxels ({:?}): {} occupied cells ({} culled) -> {} voxels",
        cfg.layout.voxel_format,
        field.occupied_count(),
        mask.culled_count(),
        voxels.len()
    );

    let bvh = MortonBvh::build(&voxels, &cfg.bvh);
    let mut bytes = Vec::new();
    layout::write_bvh_nodes(&mut bytes, &bvh)?;
    out.push("bvh_nodes", bytes);
    let mut bytes = Vec::new();
    layout::write_voxels(&mut bytes, &bvh.primitives, cfg.layout.voxel_format, &palette)?;
    out.push("bvh_voxels", bytes);

    let voxel_kd = KdTree::build(&voxels, field.bounds(), &cfg.kdtree);
    probe(&voxel_kd, &voxels);
    write_kd(&mut out, ["kd_nodes", "kd_leaves", "kd_indices"], &voxel_kd, cfg)?;
    let mut bytes = Vec::new();
    layout::write_voxels(&mut bytes, &voxels, cfg.layout.voxel_format, &palette)?;
    out.push("kd_voxels", bytes);

    let mut faces = GreedyMeshing::new(field, &cfg.greedy).mesh_to_vec();
    let atlas = pack_lightmap(&mut faces, &cfg.lightmap)?;
    log::info!(
        "greedy faces: {} faces, lightmap {}x{}",
        faces.len(),
        atlas.width,
        atlas.height
    );
    let face_kd = KdTree::build(&faces, field.bounds(), &cfg.kdtree);
    write_kd(
        &mut out,
        ["face_kd_nodes", "face_kd_leaves", "face_kd_indices"],
        &face_kd,
        cfg,
    )?;
    let mut bytes = Vec::new();
    layout::write_faces(&mut bytes, &faces)?;
    out.push("faces", bytes);

    let triangles: Vec<Triangle> = faces.iter().flat_map(|f| f.triangles()).collect();
    // Faces on the far grid border sit on the bounds plane; their triangles'
    // cell boxes reach one cell past it.
    let tri_bounds = triangles
        .iter()
        .fold(field.bounds(), |acc: Box3i, t| acc.union(&t.bounds()));
    let tri_kd = KdTree::build(&triangles, tri_bounds, &cfg.kdtree);
    write_kd(
        &mut out,
        ["tri_kd_nodes", "tri_kd_leaves", "tri_kd_indices"],
        &tri_kd,
        cfg,
    )?;
    let mut bytes = Vec::new();
    layout::write_triangles(&mut bytes, &triangles);
    out.push("triangles", bytes);

    log::info!(
        "scene built in {:.2?}: {} buffers, {} bytes",
        t0.elapsed(),
        out.buffers.len(),
        out.total_bytes()
    );
    Ok(out)
}
