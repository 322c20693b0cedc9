use nalgebra::{point, vector, Point3, Vector3};

use crate::common::BoundBox;

use super::Voxel;

/// Dense scalar grid of [`Voxel`] samples.
///
/// Data is laid out x-fastest: `index = x + y*width + z*width*height`.
/// Intensities are normalized to `<0;1>` by the loader.
///
/// A default-constructed volume is a valid 1x1x1 zero-filled placeholder,
/// so a renderer can run before any dataset is loaded.
pub struct Volume {
    size: Vector3<usize>,
    bits_per_voxel: u16,
    data: Vec<Voxel>,
}

impl std::fmt::Debug for Volume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volume")
            .field("size", &self.size)
            .field("bits_per_voxel", &self.bits_per_voxel)
            .field("data len", &self.data.len())
            .finish()
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume {
            size: vector![1, 1, 1],
            bits_per_voxel: 8,
            data: vec![Voxel::default()],
        }
    }
}

impl Volume {
    /// Assemble a volume from already-normalized data.
    ///
    /// Panics if `data` does not match `size`; loaders validate before
    /// calling this.
    pub fn from_parts(size: Vector3<usize>, bits_per_voxel: u16, data: Vec<Voxel>) -> Volume {
        assert_eq!(data.len(), size.x * size.y * size.z);
        Volume {
            size,
            bits_per_voxel,
            data,
        }
    }

    pub fn size(&self) -> Vector3<usize> {
        self.size
    }

    pub fn bits_per_voxel(&self) -> u16 {
        self.bits_per_voxel
    }

    pub fn voxel_count(&self) -> usize {
        self.data.len()
    }

    /// Volume-local coordinate space, the unit cube.
    pub fn bound_box(&self) -> BoundBox {
        BoundBox::unit()
    }

    /// Map a cube-local position (`[0,1]^3`) to grid coordinates.
    pub fn grid_coords(&self, pos: Point3<f32>) -> Point3<f32> {
        point![
            pos.x * (self.size.x - 1) as f32,
            pos.y * (self.size.y - 1) as f32,
            pos.z * (self.size.z - 1) as f32
        ]
    }

    pub fn voxel_at(&self, x: i64, y: i64, z: i64) -> Voxel {
        if x < 0
            || x >= self.size.x as i64
            || y < 0
            || y >= self.size.y as i64
            || z < 0
            || z >= self.size.z as i64
        {
            return Voxel::default();
        }

        let index =
            x as usize + y as usize * self.size.x + z as usize * self.size.x * self.size.y;
        self.data[index]
    }

    /// Bounds-checked point query; zero outside the grid.
    pub fn value_at(&self, x: i64, y: i64, z: i64) -> f32 {
        self.voxel_at(x, y, z).value()
    }

    /// Trilinear interpolation sample, zero outside.
    /// `pos` in grid coordinates.
    pub fn sample_at(&self, pos: Point3<f32>) -> f32 {
        let x = pos.x.floor();
        let y = pos.y.floor();
        let z = pos.z.floor();

        let x_t = pos.x - x;
        let y_t = pos.y - y;
        let z_t = pos.z - z;

        let (x, y, z) = (x as i64, y as i64, z as i64);

        let c00 = self.value_at(x, y, z) * (1.0 - x_t) + self.value_at(x + 1, y, z) * x_t;
        let c10 = self.value_at(x, y + 1, z) * (1.0 - x_t) + self.value_at(x + 1, y + 1, z) * x_t;
        let c01 = self.value_at(x, y, z + 1) * (1.0 - x_t) + self.value_at(x + 1, y, z + 1) * x_t;
        let c11 =
            self.value_at(x, y + 1, z + 1) * (1.0 - x_t) + self.value_at(x + 1, y + 1, z + 1) * x_t;

        let c0 = c00 * (1.0 - y_t) + c10 * y_t;
        let c1 = c01 * (1.0 - y_t) + c11 * y_t;

        c0 * (1.0 - z_t) + c1 * z_t
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::test_helpers::cube_volume;

    #[test]
    fn placeholder_is_valid() {
        let vol = Volume::default();

        assert_eq!(vol.size(), vector![1, 1, 1]);
        assert_eq!(vol.voxel_count(), 1);
        assert_eq!(vol.value_at(0, 0, 0), 0.0);
        assert_eq!(vol.sample_at(point![0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn out_of_bounds_is_zero() {
        let vol = cube_volume();

        assert_eq!(vol.value_at(-1, 0, 0), 0.0);
        assert_eq!(vol.value_at(0, 2, 0), 0.0);
        assert_eq!(vol.value_at(0, 0, 57), 0.0);
    }

    #[test]
    fn grid_point_samples_match_value_at() {
        let vol = cube_volume();

        for z in 0..2_i64 {
            for y in 0..2_i64 {
                for x in 0..2_i64 {
                    let sampled = vol.sample_at(point![x as f32, y as f32, z as f32]);
                    let dif = (sampled - vol.value_at(x, y, z)).abs();
                    assert!(dif < f32::EPSILON);
                }
            }
        }
    }

    #[test]
    fn midpoint_interpolates() {
        let vol = cube_volume();

        // average of all 8 corners
        let expected: f32 = (0..8).map(|i| vol.voxel_at(i % 2, (i / 2) % 2, i / 4).value()).sum::<f32>() / 8.0;
        let sampled = vol.sample_at(point![0.5, 0.5, 0.5]);

        assert!((sampled - expected).abs() < 1e-6);
    }

    #[test]
    fn grid_coords_maps_unit_cube() {
        let vol = cube_volume();

        assert_eq!(vol.grid_coords(point![0.0, 0.0, 0.0]), point![0.0, 0.0, 0.0]);
        assert_eq!(vol.grid_coords(point![1.0, 1.0, 1.0]), point![1.0, 1.0, 1.0]);
        assert_eq!(vol.grid_coords(point![0.5, 0.5, 0.5]), point![0.5, 0.5, 0.5]);
    }
}
