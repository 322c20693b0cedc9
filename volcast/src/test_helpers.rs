//! Small volume fixtures shared by unit, integration and benchmark code.

use nalgebra::{vector, Vector3};

use crate::{progress::NoProgress, volumetric, volumetric::Volume};

/// Encode raw samples into the on-disk volume format: an 8 byte header of
/// four little-endian `u16` fields (width, height, depth, bits per voxel)
/// followed by the samples, one byte each up to 8 bits, two bytes
/// little-endian above.
pub fn encode_volume(size: Vector3<usize>, bits_per_voxel: u16, raw: &[u16]) -> Vec<u8> {
    assert_eq!(raw.len(), size.x * size.y * size.z);

    let bytes_per_sample = if bits_per_voxel <= 8 { 1 } else { 2 };
    let mut bytes = Vec::with_capacity(8 + raw.len() * bytes_per_sample);

    for field in [size.x as u16, size.y as u16, size.z as u16, bits_per_voxel] {
        bytes.extend_from_slice(&field.to_le_bytes());
    }

    for &sample in raw {
        if bytes_per_sample == 1 {
            bytes.push(sample as u8);
        } else {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
    }

    bytes
}

fn decode(size: Vector3<usize>, raw: &[u16]) -> Volume {
    let bytes = encode_volume(size, 8, raw);
    volumetric::from_bytes(bytes, &NoProgress).expect("fixture volume is valid")
}

/// 2x2x2 8-bit volume with all eight corners distinct.
pub fn cube_volume() -> Volume {
    decode(vector![2, 2, 2], &[0, 64, 128, 192, 255, 255, 128, 0])
}

/// Volume whose first samples are `leading`, the rest filled with `fill`.
/// Data is x-fastest, so `leading` occupies the low-z slices first.
pub fn layered_volume(size: Vector3<usize>, leading: &[u16], fill: u16) -> Volume {
    let count = size.x * size.y * size.z;
    assert!(leading.len() <= count);

    let mut raw = vec![fill; count];
    raw[..leading.len()].copy_from_slice(leading);
    decode(size, &raw)
}

/// 5x4x3 8-bit volume rising linearly along x. Returns the volume and the
/// intensity slope per grid step.
pub fn ramp_volume() -> (Volume, f32) {
    let size = vector![5, 4, 3];
    let step = 50_u16;

    let mut raw = Vec::with_capacity(size.x * size.y * size.z);
    for _z in 0..size.z {
        for _y in 0..size.y {
            for x in 0..size.x {
                raw.push(x as u16 * step);
            }
        }
    }

    (decode(size, &raw), step as f32 / 256.0)
}
