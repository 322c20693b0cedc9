use std::{
    error::Error,
    io::{BufWriter, Write},
};

use indicatif::ProgressBar;
use nalgebra::Vector3;

use crate::{
    config::{Config, GeneratorConfig},
    file::open_create_file,
    header::generate_header,
};

mod noise;
mod solid;
mod spheres;

/// Generates one raw sample at a time, at any location
pub trait SampleGenerator {
    fn sample_at(&self, coords: Vector3<u32>) -> u16;
}

pub fn get_sample_generator(config: &Config) -> Box<dyn SampleGenerator> {
    match config.generator {
        GeneratorConfig::Solid { .. } => Box::new(solid::SolidGenerator::from_config(config)),
        GeneratorConfig::Spheres { .. } => Box::new(spheres::SpheresGenerator::from_config(config)),
        GeneratorConfig::Noise => Box::new(noise::NoiseGenerator::from_config(config)),
    }
}

/// Write the header and all samples, x fastest.
pub fn generate_into(
    out: &mut impl Write,
    sg: &dyn SampleGenerator,
    config: &Config,
    progress: &ProgressBar,
) -> Result<(), Box<dyn Error>> {
    let header = generate_header(config);
    out.write_all(&header)?;

    let dims = config.dims;
    let wide = config.bits_per_voxel > 8;

    for z in 0..dims.z {
        for y in 0..dims.y {
            for x in 0..dims.x {
                let sample = sg.sample_at(Vector3::new(x, y, z));
                if wide {
                    out.write_all(&sample.to_le_bytes())?;
                } else {
                    out.write_all(&[sample as u8])?;
                }
            }
        }
        progress.inc((dims.x * dims.y) as u64);
    }

    Ok(())
}

pub fn generate_vol(config: Config) -> Result<(), Box<dyn Error>> {
    let gen = get_sample_generator(&config);

    let file = open_create_file(&config.file_name)?;
    let mut writer = BufWriter::new(file);

    let progress = ProgressBar::new(config.voxel_count());
    generate_into(&mut writer, gen.as_ref(), &config, &progress)?;
    writer.flush()?;
    progress.finish();

    println!("Generating finished, result in {:#?}", config.file_name);
    Ok(())
}
