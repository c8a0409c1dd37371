//! Test-only decoders for the GPU buffer layouts.
#![allow(dead_code)]

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhNodeRecord {
    pub min: [f32; 3],
    pub left: i32,
    pub max: [f32; 3],
    pub right: i32,
    pub parent: i32,
    pub first: i32,
    pub count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdNodeRecord {
    pub min: [u8; 3],
    pub max_incl: [u8; 3],
    pub link: u16,
    pub split: u16,
}

impl KdNodeRecord {
    pub fn is_leaf(&self) -> bool {
        self.split == 0xFFFF
    }

    pub fn axis(&self) -> usize {
        (self.split >> 14) as usize
    }

    pub fn split_pos(&self) -> u16 {
        self.split & 0x3FFF
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRecord {
    pub first: i32,
    pub count: i32,
    pub ropes: [i32; 6],
}

fn read_vec3(c: &mut Cursor<&[u8]>) -> [f32; 3] {
    let mut v = [0.0; 3];
    c.read_f32_into::<LittleEndian>(&mut v).unwrap();
    v
}

pub fn read_bvh_nodes(bytes: &[u8]) -> Vec<BvhNodeRecord> {
    assert_eq!(bytes.len() % 48, 0);
    let mut c = Cursor::new(bytes);
    (0..bytes.len() / 48)
        .map(|_| {
            let min = read_vec3(&mut c);
            let left = c.read_i32::<LittleEndian>().unwrap();
            let max = read_vec3(&mut c);
            let right = c.read_i32::<LittleEndian>().unwrap();
            let parent = c.read_i32::<LittleEndian>().unwrap();
            let first = c.read_i32::<LittleEndian>().unwrap();
            let count = c.read_i32::<LittleEndian>().unwrap();
            let _pad = c.read_i32::<LittleEndian>().unwrap();
            BvhNodeRecord {
                min,
                left,
                max,
                right,
                parent,
                first,
                count,
            }
        })
        .collect()
}

pub fn read_kd_nodes(bytes: &[u8]) -> Vec<KdNodeRecord> {
    assert_eq!(bytes.len() % 12, 0);
    bytes
        .chunks_exact(12)
        .map(|r| {
            let mut c = Cursor::new(&r[8..]);
            KdNodeRecord {
                min: [r[0], r[1], r[2]],
                max_incl: [r[4], r[5], r[6]],
                link: c.read_u16::<LittleEndian>().unwrap(),
                split: c.read_u16::<LittleEndian>().unwrap(),
            }
        })
        .collect()
}

pub fn read_kd_leaves(bytes: &[u8], short_ropes: bool) -> Vec<LeafRecord> {
    let size = if short_ropes { 20 } else { 32 };
    assert_eq!(bytes.len() % size, 0);
    bytes
        .chunks_exact(size)
        .map(|r| {
            let mut c = Cursor::new(r);
            let first = c.read_i32::<LittleEndian>().unwrap();
            let count = c.read_i32::<LittleEndian>().unwrap();
            let mut ropes = [0i32; 6];
            for rope in &mut ropes {
                *rope = if short_ropes {
                    c.read_i16::<LittleEndian>().unwrap() as i32
                } else {
                    c.read_i32::<LittleEndian>().unwrap()
                };
            }
            LeafRecord { first, count, ropes }
        })
        .collect()
}

pub fn read_indices(bytes: &[u8]) -> Vec<i32> {
    let mut out = vec![0i32; bytes.len() / 4];
    Cursor::new(bytes)
        .read_i32_into::<LittleEndian>(&mut out)
        .unwrap();
    out
}

/// Byte-format voxel: origin, palette index, extents.
pub fn read_byte_voxels(bytes: &[u8]) -> Vec<([u8; 3], u8, [u8; 3])> {
    bytes
        .chunks_exact(8)
        .map(|r| ([r[0], r[1], r[2]], r[3], [r[4], r[5], r[6]]))
        .collect()
}

/// Face record: side, neighbours, value, then the eight u16 words.
pub fn read_faces(bytes: &[u8]) -> Vec<([u8; 3], [u16; 8])> {
    bytes
        .chunks_exact(20)
        .map(|r| {
            let mut words = [0u16; 8];
            Cursor::new(&r[4..])
                .read_u16_into::<LittleEndian>(&mut words)
                .unwrap();
            ([r[0], r[1], r[2]], words)
        })
        .collect()
}
