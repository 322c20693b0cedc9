use crate::{
    color::{self, RGBA},
    transfer_function::TransferFunction,
};

/// Identity grayscale, opacity = intensity.
pub fn grayscale_tf() -> TransferFunction {
    TransferFunction::default()
}

/// Bone-like ramp: transparent background, dense material in warm white.
pub fn bone_tf() -> TransferFunction {
    let table: Vec<RGBA> = (0..256)
        .map(|i| {
            let v = i as f32 / 255.0;
            if v < 0.2 {
                color::zero()
            } else {
                color::new(0.89, 0.85, 0.79, (v - 0.2) / 0.8)
            }
        })
        .collect();

    TransferFunction::from_table(table)
}

/// Fully opaque white above a small threshold. Handy for silhouette tests.
pub fn solid_white_tf() -> TransferFunction {
    let table: Vec<RGBA> = (0..256)
        .map(|i| {
            if i > 2 {
                color::new(1.0, 1.0, 1.0, 1.0)
            } else {
                color::zero()
            }
        })
        .collect();

    TransferFunction::from_table(table)
}
