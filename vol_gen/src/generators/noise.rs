use nalgebra::Vector3;

use crate::config::Config;

use super::SampleGenerator;

/// Uniform random samples over the whole bit range
pub struct NoiseGenerator {
    rng: fastrand::Rng,
    max_sample: u16,
}

impl NoiseGenerator {
    pub fn from_config(config: &Config) -> NoiseGenerator {
        let rng = fastrand::Rng::new();
        if let Some(seed) = config.seed {
            rng.seed(seed);
        }

        let max_sample = ((1_u32 << config.bits_per_voxel) - 1) as u16;
        NoiseGenerator { rng, max_sample }
    }
}

impl SampleGenerator for NoiseGenerator {
    fn sample_at(&self, _coords: Vector3<u32>) -> u16 {
        self.rng.u16(0..=self.max_sample)
    }
}
