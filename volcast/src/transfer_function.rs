use crate::color::{self, RGBA};

/// 1-D lookup mapping normalized intensity to color and opacity.
///
/// The table comes from an externally decoded image resource; this crate
/// treats it as opaque data. The lookup position is transformed by
/// `clamp(position * factor + offset, 0, 1)` before sampling, and sampling
/// linearly interpolates adjacent entries.
#[derive(Clone, Debug)]
pub struct TransferFunction {
    table: Vec<RGBA>,
    sample_factor: f32,
    sample_offset: f32,
}

impl Default for TransferFunction {
    /// Identity grayscale with opacity = intensity, so the renderer is
    /// usable before any transfer function is loaded.
    fn default() -> Self {
        let table = (0..256)
            .map(|i| {
                let v = i as f32 / 255.0;
                color::mono(v, v)
            })
            .collect();

        TransferFunction {
            table,
            sample_factor: 1.0,
            sample_offset: 0.0,
        }
    }
}

impl TransferFunction {
    pub fn from_table(table: Vec<RGBA>) -> TransferFunction {
        let table = if table.is_empty() {
            vec![color::zero()]
        } else {
            table
        };

        TransferFunction {
            table,
            sample_factor: 1.0,
            sample_offset: 0.0,
        }
    }

    /// Multiply lookup position
    pub fn set_sample_factor(&mut self, factor: f32) {
        self.sample_factor = factor;
    }

    /// Offset lookup position
    pub fn set_sample_offset(&mut self, offset: f32) {
        self.sample_offset = offset;
    }

    /// Look up color and opacity for a normalized intensity.
    pub fn sample(&self, position: f32) -> RGBA {
        let pos = (position * self.sample_factor + self.sample_offset).clamp(0.0, 1.0);

        let scaled = pos * (self.table.len() - 1) as f32;
        let low = scaled.floor() as usize;
        let high = (low + 1).min(self.table.len() - 1);
        let t = scaled - low as f32;

        self.table[low] * (1.0 - t) + self.table[high] * t
    }
}
