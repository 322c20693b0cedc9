use std::{ffi::OsString, str::FromStr};

use clap::ArgMatches;
use nalgebra::{vector, Vector3};

/// Axis limit shared with the renderer's loader.
const MAX_AXIS: u32 = 1000;

/// Transform `Values` into `Vector`
fn values_to_vector3<T>(args: &ArgMatches, key: &str) -> Vector3<T>
where
    T: FromStr + Copy,
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    let vals: Vec<T> = args
        .values_of(key)
        .unwrap()
        .map(|v| v.parse::<T>().expect("Parse error"))
        .collect();
    vector![vals[0], vals[1], vals[2]]
}

/// App configuration
/// Config is built from args parsed by `clap`
#[derive(Debug)]
pub struct Config {
    /// Dimensions of volume
    pub dims: Vector3<u32>,
    /// Bits per stored sample, 8 or 16
    pub bits_per_voxel: u16,
    /// Type of generator to be used
    pub generator: GeneratorConfig,
    /// Output file name
    pub file_name: OsString,
    /// Optional seed for RNG, to replicate results
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_args(args: ArgMatches) -> Result<Config, String> {
        let dims: Vector3<u32> = values_to_vector3(&args, "dims");
        for &dim in dims.iter() {
            if dim > MAX_AXIS {
                return Err(format!("dimension {dim} exceeds the limit of {MAX_AXIS}"));
            }
        }

        // value validated by the parser
        let bits_per_voxel: u16 = args.value_of("bits").unwrap().parse().unwrap();

        let generator = GeneratorConfig::from_args(&args);

        let limit = 1_u32 << bits_per_voxel;
        if let Some(sample) = generator.sample() {
            if sample as u32 >= limit {
                return Err(format!(
                    "sample {sample} does not fit into {bits_per_voxel} bits"
                ));
            }
        }

        // unwrap safe, has default value
        let file_name = args.value_of_os("output-file").unwrap().into();

        let seed = args.value_of("seed").map(|s| s.parse().unwrap());

        Ok(Config {
            dims,
            bits_per_voxel,
            generator,
            file_name,
            seed,
        })
    }

    pub fn voxel_count(&self) -> u64 {
        self.dims.x as u64 * self.dims.y as u64 * self.dims.z as u64
    }
}

/// Settings specific to generator variant
#[derive(Debug, Clone, Copy)]
pub enum GeneratorConfig {
    /// Fill volume with one value
    Solid { sample: u16 },
    /// Randomly placed spheres
    Spheres {
        n_of_shapes: usize,
        sample: u16,
        obj_size: u32,
    },
    /// Uniform random data
    Noise,
}

impl GeneratorConfig {
    pub fn from_args(args: &ArgMatches) -> GeneratorConfig {
        // Safe to unwrap, args checked by parser
        let s = args.value_of("generator").unwrap();

        let sample_str = args.value_of("sample");
        let n_of_shapes_str = args.value_of("n-of-shapes");
        let obj_size_str = args.value_of("object-size");

        match s {
            "solid" => GeneratorConfig::Solid {
                sample: sample_str.unwrap().parse().unwrap(),
            },
            "spheres" => GeneratorConfig::Spheres {
                n_of_shapes: n_of_shapes_str.unwrap().parse().unwrap(),
                sample: sample_str.unwrap().parse().unwrap(),
                obj_size: obj_size_str.unwrap().parse().unwrap(),
            },
            "noise" => GeneratorConfig::Noise,
            _ => panic!("Error parsing generator config"),
        }
    }

    fn sample(&self) -> Option<u16> {
        match *self {
            GeneratorConfig::Solid { sample } => Some(sample),
            GeneratorConfig::Spheres { sample, .. } => Some(sample),
            GeneratorConfig::Noise => None,
        }
    }
}
