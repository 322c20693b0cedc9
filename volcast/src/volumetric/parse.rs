use std::io;

use nom::{number::complete::le_u16, sequence::tuple, IResult};

use super::LoadError;

/// Fixed binary header of the volume file format.
///
/// Little-endian, 8 bytes:
/// 1. width -- u16
/// 2. height -- u16
/// 3. depth -- u16
/// 4. bits per voxel -- u16
///
/// Followed by `width*height*depth` samples, 1 byte each for up to 8 bits
/// per voxel, 2 bytes otherwise, x-fastest, then y, then z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeHeader {
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub bits_per_voxel: u16,
}

pub const HEADER_LEN: usize = 8;

/// Longest valid extent of any axis. Dimensions outside `<1;1000>`
/// indicate a file of a different format.
pub const MAX_AXIS: u16 = 1000;

impl VolumeHeader {
    pub fn voxel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn bytes_per_sample(&self) -> usize {
        if self.bits_per_voxel <= 8 {
            1
        } else {
            2
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        let axis_ok = |v: u16| (1..=MAX_AXIS).contains(&v);

        if axis_ok(self.width)
            && axis_ok(self.height)
            && axis_ok(self.depth)
            && (1..=16).contains(&self.bits_per_voxel)
        {
            Ok(())
        } else {
            Err(LoadError::InvalidDimensions {
                width: self.width,
                height: self.height,
                depth: self.depth,
                bits_per_voxel: self.bits_per_voxel,
            })
        }
    }
}

fn header_inner(s: &[u8]) -> IResult<&[u8], VolumeHeader> {
    let mut header = tuple((le_u16, le_u16, le_u16, le_u16));
    let (s, (width, height, depth, bits_per_voxel)) = header(s)?;

    Ok((
        s,
        VolumeHeader {
            width,
            height,
            depth,
            bits_per_voxel,
        },
    ))
}

/// Parse and validate the file header.
pub fn parse_header(slice: &[u8]) -> Result<VolumeHeader, LoadError> {
    let (_rest, header) = header_inner(slice).map_err(|_| {
        LoadError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "volume header truncated",
        ))
    })?;

    header.validate()?;
    Ok(header)
}
