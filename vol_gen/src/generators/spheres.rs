use nalgebra::{vector, Vector3};

use crate::config::{Config, GeneratorConfig};

use super::SampleGenerator;

/// Generate volume with a number of randomly placed spheres
pub struct SpheresGenerator {
    spheres: Vec<SphereInfo>,
}

impl SpheresGenerator {
    pub fn from_config(config: &Config) -> SpheresGenerator {
        let (n_of_shapes, sample, obj_size) = match config.generator {
            GeneratorConfig::Spheres {
                n_of_shapes,
                sample,
                obj_size,
            } => (n_of_shapes, sample, obj_size),
            _ => panic!("Bad generator args"),
        };

        let max_sample = ((1_u32 << config.bits_per_voxel) - 1) as u16;
        let gen = SphereInfoGenerator {
            rng: seeded_rng(config.seed),
            vol_dims: config.dims,
            diameter: obj_size,
            diameter_variance: obj_size / 5,
            sample,
            sample_variance: 10,
            max_sample,
        };

        let spheres = (0..n_of_shapes).map(|_| gen.get_sphere()).collect();
        SpheresGenerator { spheres }
    }
}

impl SampleGenerator for SpheresGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16 {
        let pos = coords.cast::<f32>();
        for sphere in &self.spheres {
            if (pos - sphere.center).magnitude() <= sphere.radius {
                return sphere.sample;
            }
        }
        0
    }
}

/// One sphere in volume
struct SphereInfo {
    center: Vector3<f32>,
    radius: f32,
    sample: u16,
}

/// Randomized sphere construction
/// Helper type
struct SphereInfoGenerator {
    rng: fastrand::Rng,
    vol_dims: Vector3<u32>,
    diameter: u32,
    diameter_variance: u32,
    sample: u16,
    sample_variance: u16,
    max_sample: u16,
}

fn seeded_rng(seed: Option<u64>) -> fastrand::Rng {
    let rng = fastrand::Rng::new();
    if let Some(seed) = seed {
        rng.seed(seed);
    }
    rng
}

impl SphereInfoGenerator {
    fn get_sphere(&self) -> SphereInfo {
        let low = self.diameter.saturating_sub(self.diameter_variance).max(1);
        let high = self.diameter + self.diameter_variance;
        let diameter = self.rng.u32(low..=high);

        // spawn only where the sphere fully fits
        let size = vector![diameter, diameter, diameter];
        let position_low = vector![
            self.random_offset(self.vol_dims.x, size.x),
            self.random_offset(self.vol_dims.y, size.y),
            self.random_offset(self.vol_dims.z, size.z)
        ];

        let radius = diameter as f32 / 2.0;
        let center = position_low.cast::<f32>().add_scalar(radius);

        SphereInfo {
            center,
            radius,
            sample: self.random_sample(),
        }
    }

    fn random_offset(&self, dim: u32, size: u32) -> u32 {
        if size >= dim {
            return 0;
        }
        self.rng.u32(0..=(dim - size))
    }

    fn random_sample(&self) -> u16 {
        let low = self.sample.saturating_sub(self.sample_variance);
        let high = self
            .sample
            .saturating_add(self.sample_variance)
            .min(self.max_sample);
        self.rng.u16(low..=high)
    }
}
