use thiserror::Error;

/// Errors raised while flattening structures into GPU buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// A value does not fit the integer width of its field.
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The short voxel format stores single cells only.
    #[error("voxel at ({x}, {y}, {z}) has non-zero extents; the short format cannot store them")]
    ExtentsInShortFormat { x: i32, y: i32, z: i32 },
}
