use byteorder::{ByteOrder, LittleEndian};

use crate::config::Config;

pub const HEADER_LEN: usize = 4 * 2;

/// File header
/// little-endian, total length 8B
/// 1. resolution -- 3x 16bit uints (width, height, depth)
/// 2. bits per sample -- 16bit uint
/// 3. data -- width*height*depth samples, x fastest;
///    one byte each up to 8 bits, two bytes little-endian above
pub fn generate_header(cfg: &Config) -> Vec<u8> {
    let mut vec = vec![0; HEADER_LEN];
    let slice = &mut vec[..];

    LittleEndian::write_u16(&mut slice[0..2], cfg.dims.x as u16);
    LittleEndian::write_u16(&mut slice[2..4], cfg.dims.y as u16);
    LittleEndian::write_u16(&mut slice[4..6], cfg.dims.z as u16);
    LittleEndian::write_u16(&mut slice[6..8], cfg.bits_per_voxel);

    vec
}
