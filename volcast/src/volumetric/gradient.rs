use nalgebra::{vector, Point3, Vector3};

use super::Volume;

/// Per-voxel intensity gradient, derived from a [`Volume`] by finite
/// differences. Used to modulate sample color during shading.
///
/// Interior voxels use central differences; boundary voxels fall back to
/// one-sided differences (the divisor matches the actual index span).
/// Must be recomputed whenever the volume is replaced.
pub struct GradientField {
    size: Vector3<usize>,
    data: Vec<Vector3<f32>>,
}

impl GradientField {
    pub fn from_volume(volume: &Volume) -> GradientField {
        let size = volume.size();
        let mut data = Vec::with_capacity(size.x * size.y * size.z);

        for z in 0..size.z as i64 {
            for y in 0..size.y as i64 {
                for x in 0..size.x as i64 {
                    data.push(vector![
                        Self::axis_diff(x, size.x, |v| volume.voxel_at(v, y, z)),
                        Self::axis_diff(y, size.y, |v| volume.voxel_at(x, v, z)),
                        Self::axis_diff(z, size.z, |v| volume.voxel_at(x, y, v))
                    ]);
                }
            }
        }

        GradientField { size, data }
    }

    fn axis_diff(coord: i64, extent: usize, fetch: impl Fn(i64) -> super::Voxel) -> f32 {
        let lo = (coord - 1).max(0);
        let hi = (coord + 1).min(extent as i64 - 1);
        let span = (hi - lo) as f32;

        if span == 0.0 {
            return 0.0;
        }

        ((fetch(hi) - fetch(lo)) / span).value()
    }

    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn at(&self, x: usize, y: usize, z: usize) -> Vector3<f32> {
        self.data[x + y * self.size.x + z * self.size.x * self.size.y]
    }

    fn at_clamped(&self, x: i64, y: i64, z: i64) -> Vector3<f32> {
        let cx = x.clamp(0, self.size.x as i64 - 1) as usize;
        let cy = y.clamp(0, self.size.y as i64 - 1) as usize;
        let cz = z.clamp(0, self.size.z as i64 - 1) as usize;
        self.at(cx, cy, cz)
    }

    /// Trilinear interpolation of the gradient vectors, edge-clamped.
    /// `pos` in grid coordinates.
    pub fn sample_at(&self, pos: Point3<f32>) -> Vector3<f32> {
        let x = pos.x.floor();
        let y = pos.y.floor();
        let z = pos.z.floor();

        let x_t = pos.x - x;
        let y_t = pos.y - y;
        let z_t = pos.z - z;

        let (x, y, z) = (x as i64, y as i64, z as i64);

        let c00 = self.at_clamped(x, y, z) * (1.0 - x_t) + self.at_clamped(x + 1, y, z) * x_t;
        let c10 =
            self.at_clamped(x, y + 1, z) * (1.0 - x_t) + self.at_clamped(x + 1, y + 1, z) * x_t;
        let c01 =
            self.at_clamped(x, y, z + 1) * (1.0 - x_t) + self.at_clamped(x + 1, y, z + 1) * x_t;
        let c11 = self.at_clamped(x, y + 1, z + 1) * (1.0 - x_t)
            + self.at_clamped(x + 1, y + 1, z + 1) * x_t;

        let c0 = c00 * (1.0 - y_t) + c10 * y_t;
        let c1 = c01 * (1.0 - y_t) + c11 * y_t;

        c0 * (1.0 - z_t) + c1 * z_t
    }
}
