use nalgebra::{vector, Vector3};

use crate::common::ValueRange;

/// Rule for combining the samples along a ray into one pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositingMethod {
    /// Front-to-back alpha blending ("DVR")
    Alpha,
    /// Maximum intensity difference accumulation, interpolates between
    /// Alpha and Mip behavior via [`RenderParams::mida_param`]
    Mida,
    /// Maximum intensity projection
    Mip,
    /// Average intensity projection
    Average,
    /// Minimum intensity projection
    Minip,
}

/// Per-frame rendering configuration.
///
/// Mutated by discrete setter calls between frames; a render pass reads a
/// cloned snapshot, so parameters never tear mid-frame. Setters silently
/// clamp out-of-range input, since values come from continuous UI controls and
/// rejecting them would be hostile. This is deliberately the opposite of
/// the strict validation at the file-format boundary.
#[derive(Debug, Clone)]
pub struct RenderParams {
    pub resolution: (usize, usize),
    /// Total number of samples along the ray, at least 1
    pub num_samples: u32,
    /// Samples before this point along the ray segment are ignored
    pub sample_range_start: f32,
    /// Samples after this point along the ray segment are ignored
    pub sample_range_end: f32,
    pub compositing: CompositingMethod,
    /// Gradient-based shading toggle
    pub shading: bool,
    /// Gradient magnitudes below the threshold are left unshaded, so
    /// near-uniform regions do not darken from noise
    pub shading_threshold: f32,
    /// Intensities below `low` are skipped entirely, above `high` clamped
    pub intensity_clamp: ValueRange,
    /// Multiplies opacity used in accumulation
    pub opacity_factor: f32,
    /// Offsets opacity used in accumulation
    pub opacity_offset: f32,
    /// MIDA interpolation parameter in `<-1;1>`:
    /// -1 accumulates like traditional alpha compositing, +1 lets new
    /// intensity maxima overwrite prior accumulation as in MIP
    pub mida_param: f32,
    /// Stop marching once opacity saturates
    pub early_ray_termination: bool,
    pub background: Vector3<f32>,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            resolution: (512, 512),
            num_samples: 500,
            sample_range_start: 0.0,
            sample_range_end: 1.0,
            compositing: CompositingMethod::Mida,
            shading: false,
            shading_threshold: 0.15,
            intensity_clamp: (0.0..1.0).into(),
            opacity_factor: 1.0,
            opacity_offset: 0.0,
            mida_param: 0.0,
            early_ray_termination: true,
            background: vector![0.0, 0.0, 0.0],
        }
    }
}

impl RenderParams {
    pub fn set_num_samples(&mut self, num_samples: u32) {
        self.num_samples = num_samples.max(1);
    }

    pub fn set_sample_range_start(&mut self, start: f32) {
        self.sample_range_start = start.clamp(0.0, self.sample_range_end);
    }

    pub fn set_sample_range_end(&mut self, end: f32) {
        self.sample_range_end = end.clamp(self.sample_range_start, 1.0);
    }

    pub fn set_compositing_method(&mut self, method: CompositingMethod) {
        self.compositing = method;
    }

    pub fn set_shading(&mut self, enabled: bool) {
        self.shading = enabled;
    }

    pub fn set_shading_threshold(&mut self, threshold: f32) {
        self.shading_threshold = threshold.max(0.0);
    }

    pub fn set_intensity_clamp_min(&mut self, min: f32) {
        self.intensity_clamp.low = min.clamp(0.0, self.intensity_clamp.high);
    }

    pub fn set_intensity_clamp_max(&mut self, max: f32) {
        self.intensity_clamp.high = max.clamp(self.intensity_clamp.low, 1.0);
    }

    pub fn set_opacity_factor(&mut self, factor: f32) {
        self.opacity_factor = factor;
    }

    pub fn set_opacity_offset(&mut self, offset: f32) {
        self.opacity_offset = offset;
    }

    pub fn set_mida_param(&mut self, value: f32) {
        self.mida_param = value.clamp(-1.0, 1.0);
    }
}
