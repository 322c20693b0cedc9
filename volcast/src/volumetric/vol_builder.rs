use std::{fs::File, io, path::Path};

use memmap::{Mmap, MmapOptions};
use nalgebra::vector;

use crate::progress::ProgressSink;

use super::{
    parse::{parse_header, HEADER_LEN},
    LoadError, Volume, Voxel,
};

/// Backing bytes of a volume file.
///
/// Tests feed in-memory vectors, production maps files.
pub enum DataSource {
    Vec(Vec<u8>),
    Mmap(Mmap),
}

impl DataSource {
    pub fn get_slice(&self) -> &[u8] {
        match self {
            DataSource::Vec(v) => v.as_slice(),
            DataSource::Mmap(m) => &m[..],
        }
    }

    pub fn from_file<P>(path: P) -> Result<DataSource, LoadError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;

        // Safety: the map is read-only and never outlives the DataSource
        let mmap = unsafe { MmapOptions::new().map(&file) }?;

        Ok(DataSource::Mmap(mmap))
    }
}

/// Decode a volume from a file in the documented format.
///
/// Progress is reported to `progress` at load start, after the bulk read
/// and per stored sample; the sink is a side channel and has no effect on
/// the result.
pub fn from_file<P>(path: P, progress: &impl ProgressSink) -> Result<Volume, LoadError>
where
    P: AsRef<Path>,
{
    let ds = DataSource::from_file(path)?;
    from_source(&ds, progress)
}

/// Decode a volume from an in-memory byte stream.
pub fn from_bytes(bytes: Vec<u8>, progress: &impl ProgressSink) -> Result<Volume, LoadError> {
    from_source(&DataSource::Vec(bytes), progress)
}

/// Decode a volume from any backing source.
pub fn from_source(source: &DataSource, progress: &impl ProgressSink) -> Result<Volume, LoadError> {
    let slice = source.get_slice();
    let header = parse_header(slice)?;

    let size = header.voxel_count();
    let bytes_per_sample = header.bytes_per_sample();

    // progress scale mirrors the load phases: 10 units for the bulk read,
    // then one per stored sample
    let progress_max = size + 10;
    progress.report(0, progress_max);

    let needed = HEADER_LEN + size * bytes_per_sample;
    if slice.len() < needed {
        return Err(LoadError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "volume data truncated",
        )));
    }
    let data = &slice[HEADER_LEN..needed];

    progress.report(10, progress_max);

    // intensities map <0; 2^bits_per_voxel> to <0.0; 1.0>
    let divisor = (1_u32 << header.bits_per_voxel) as f32;

    let mut voxels = Vec::with_capacity(size);
    for i in 0..size {
        let raw = if bytes_per_sample == 1 {
            data[i] as u32
        } else {
            u16::from_le_bytes([data[2 * i], data[2 * i + 1]]) as u32
        };

        let value = (raw as f32 / divisor).clamp(0.0, 1.0);
        voxels.push(Voxel::new(value));

        progress.report(10 + i + 1, progress_max);
    }

    log::info!(
        "loaded {}-bit volume {}x{}x{}",
        header.bits_per_voxel,
        header.width,
        header.height,
        header.depth
    );

    Ok(Volume::from_parts(
        vector![
            header.width as usize,
            header.height as usize,
            header.depth as usize
        ],
        header.bits_per_voxel,
        voxels,
    ))
}
