mod gradient;
pub mod parse;
mod vol_builder;
mod volume;
mod voxel;

pub use gradient::GradientField;
pub use vol_builder::{from_bytes, from_file, from_source, DataSource};
pub use volume::Volume;
pub use voxel::Voxel;

use std::io;

/// Errors of the volume file loader.
///
/// Loading never leaves partial state behind: on error the caller's
/// previous [`Volume`] is untouched.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Stream open failure or short read.
    #[error("volume i/o failed: {0}")]
    Io(#[from] io::Error),
    /// Header failed range validation. Usually means a file of a
    /// different dataset family was opened by mistake.
    #[error("invalid volume dimensions {width}x{height}x{depth}, {bits_per_voxel} bits per voxel")]
    InvalidDimensions {
        width: u16,
        height: u16,
        depth: u16,
        bits_per_voxel: u16,
    },
}
