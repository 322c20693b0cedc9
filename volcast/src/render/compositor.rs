use nalgebra::{Point3, Vector3};

use crate::{
    transfer_function::TransferFunction,
    volumetric::{GradientField, Volume},
};

use super::params::{CompositingMethod, RenderParams};

/// Opacity level treated as fully saturated for early ray termination.
const SATURATION: f32 = 0.999;

/// Everything one ray march reads. All references are immutable for the
/// whole frame.
pub struct RayMarchContext<'a> {
    pub volume: &'a Volume,
    pub gradients: Option<&'a GradientField>,
    pub tf: &'a TransferFunction,
    pub params: &'a RenderParams,
}

/// Per-ray accumulation state, dispatched on inside the sampling loop.
/// One variant per compositing method; no per-sample virtual dispatch.
enum Accumulator {
    Alpha {
        color: Vector3<f32>,
        alpha: f32,
    },
    Mida {
        color: Vector3<f32>,
        alpha: f32,
        max: f32,
    },
    /// Extremum value and its position, resolved after the loop
    Mip {
        best: Option<(f32, Point3<f32>)>,
    },
    Minip {
        best: Option<(f32, Point3<f32>)>,
    },
    Average {
        sum: f32,
    },
}

impl Accumulator {
    fn new(method: CompositingMethod) -> Accumulator {
        match method {
            CompositingMethod::Alpha => Accumulator::Alpha {
                color: Vector3::zeros(),
                alpha: 0.0,
            },
            CompositingMethod::Mida => Accumulator::Mida {
                color: Vector3::zeros(),
                alpha: 0.0,
                max: f32::NEG_INFINITY,
            },
            CompositingMethod::Mip => Accumulator::Mip { best: None },
            CompositingMethod::Minip => Accumulator::Minip { best: None },
            CompositingMethod::Average => Accumulator::Average { sum: 0.0 },
        }
    }
}

/// March one ray from `entry` to `exit` (cube-local coordinates) and
/// composite the samples.
///
/// Returns premultiplied color and opacity, or `None` for a ray that
/// contributes nothing; the caller resolves that to the background.
pub fn composite_ray(
    ctx: &RayMarchContext,
    entry: Point3<f32>,
    exit: Point3<f32>,
) -> Option<(Vector3<f32>, f32)> {
    let params = ctx.params;

    let segment = exit - entry;
    let start = entry + segment * params.sample_range_start;
    let end = entry + segment * params.sample_range_end;

    let span = end - start;
    if span.norm_squared() <= f32::EPSILON {
        return None;
    }

    let num_samples = params.num_samples.max(1);
    let step = span / num_samples as f32;

    // headlight direction, from the volume towards the viewer
    let light = -span.normalize();

    let mut acc = Accumulator::new(params.compositing);

    for i in 0..num_samples {
        let pos = start + step * i as f32;
        let grid = ctx.volume.grid_coords(pos);

        let raw = ctx.volume.sample_at(grid);

        // below the clamp floor the sample is fully transparent
        if raw < params.intensity_clamp.low {
            continue;
        }
        let value = raw.min(params.intensity_clamp.high);

        match &mut acc {
            Accumulator::Alpha { color, alpha } => {
                let (rgb, opacity) = shaded_lookup(ctx, value, grid, light);

                *color += (1.0 - *alpha) * opacity * rgb;
                *alpha += (1.0 - *alpha) * opacity;

                if params.early_ray_termination && *alpha >= SATURATION {
                    break;
                }
            }
            Accumulator::Mida { color, alpha, max } => {
                let (rgb, opacity) = shaded_lookup(ctx, value, grid, light);

                if value > *max {
                    // a new local maximum discounts what was accumulated
                    // before it; -1 retains everything (plain DVR), +1
                    // discards it (MIP-like transparency)
                    let retained = (1.0 - params.mida_param) * 0.5;
                    *color *= retained;
                    *alpha *= retained;
                    *max = value;
                }

                *color += (1.0 - *alpha) * opacity * rgb;
                *alpha += (1.0 - *alpha) * opacity;

                if params.early_ray_termination && *alpha >= SATURATION {
                    break;
                }
            }
            Accumulator::Mip { best } => {
                if best.map_or(true, |(v, _)| value > v) {
                    *best = Some((value, grid));
                }
            }
            Accumulator::Minip { best } => {
                if best.map_or(true, |(v, _)| value < v) {
                    *best = Some((value, grid));
                }
            }
            Accumulator::Average { sum } => *sum += value,
        }
    }

    match acc {
        Accumulator::Alpha { color, alpha } | Accumulator::Mida { color, alpha, .. } => {
            Some((color, alpha))
        }
        Accumulator::Mip { best } | Accumulator::Minip { best } => best.map(|(value, grid)| {
            let (rgb, opacity) = shaded_lookup(ctx, value, grid, light);
            (rgb * opacity, opacity)
        }),
        Accumulator::Average { sum } => {
            let mean = sum / num_samples as f32;
            let rgba = ctx.tf.sample(mean);
            let opacity = transform_opacity(params, rgba.w);
            Some((rgba.xyz() * opacity, opacity))
        }
    }
}

/// Transfer-function lookup with opacity transform and optional
/// gradient-based shading at the sample position.
fn shaded_lookup(
    ctx: &RayMarchContext,
    value: f32,
    grid: Point3<f32>,
    light: Vector3<f32>,
) -> (Vector3<f32>, f32) {
    let rgba = ctx.tf.sample(value);
    let mut rgb = rgba.xyz();
    let opacity = transform_opacity(ctx.params, rgba.w);

    if ctx.params.shading {
        if let Some(gradients) = ctx.gradients {
            let gradient = gradients.sample_at(grid);
            let magnitude = gradient.norm();

            // flat regions stay unshaded; shading noise in near-uniform
            // areas would only darken them
            if magnitude >= ctx.params.shading_threshold && magnitude > 0.0 {
                let normal = gradient / magnitude;
                // two-sided: the gradient may point either way through a
                // boundary surface
                rgb *= normal.dot(&light).abs();
            }
        }
    }

    (rgb, opacity)
}

fn transform_opacity(params: &RenderParams, opacity: f32) -> f32 {
    (opacity * params.opacity_factor + params.opacity_offset).clamp(0.0, 1.0)
}

#[cfg(test)]
mod test {

    use nalgebra::{point, vector};

    use super::*;
    use crate::{
        premade::transfer_functions::solid_white_tf,
        test_helpers::{cube_volume, layered_volume},
        volumetric,
    };

    const ENTRY: Point3<f32> = point![0.5, 0.5, 1.0];
    const EXIT: Point3<f32> = point![0.5, 0.5, 0.0];

    fn ctx<'a>(
        volume: &'a Volume,
        tf: &'a TransferFunction,
        params: &'a RenderParams,
    ) -> RayMarchContext<'a> {
        RayMarchContext {
            volume,
            gradients: None,
            tf,
            params,
        }
    }

    fn expected_single_lookup(
        volume: &Volume,
        tf: &TransferFunction,
        params: &RenderParams,
        pos: Point3<f32>,
    ) -> (Vector3<f32>, f32) {
        let value = volume.sample_at(volume.grid_coords(pos));
        let rgba = tf.sample(value);
        let opacity = transform_opacity(params, rgba.w);
        (rgba.xyz() * opacity, opacity)
    }

    #[test]
    fn single_sample_methods_agree() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(1);

        // one sample lands at the segment start
        let (expected_rgb, expected_a) = expected_single_lookup(&volume, &tf, &params, ENTRY);

        for method in [
            CompositingMethod::Alpha,
            CompositingMethod::Mip,
            CompositingMethod::Minip,
            CompositingMethod::Average,
        ] {
            params.set_compositing_method(method);
            let (rgb, a) = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

            assert!((rgb - expected_rgb).norm() < 1e-6, "{method:?}");
            assert!((a - expected_a).abs() < 1e-6, "{method:?}");
        }
    }

    #[test]
    fn zero_length_segment_yields_background() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_sample_range_start(0.5);
        params.set_sample_range_end(0.5);

        for method in [
            CompositingMethod::Alpha,
            CompositingMethod::Mida,
            CompositingMethod::Mip,
            CompositingMethod::Minip,
            CompositingMethod::Average,
        ] {
            params.set_compositing_method(method);
            assert!(composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).is_none());
        }
    }

    #[test]
    fn saturation_ignores_trailing_samples() {
        // same values near the entry, wildly different further along
        let front = [200_u16; 4];
        let volume_a = layered_volume(vector![2, 2, 4], &front, 0);
        let volume_b = layered_volume(vector![2, 2, 4], &front, 255);

        let tf = solid_white_tf();

        let mut params = RenderParams::default();
        params.set_compositing_method(CompositingMethod::Alpha);
        params.set_num_samples(16);

        let entry = point![0.5, 0.5, 0.0];
        let exit = point![0.5, 0.5, 1.0];

        let a = composite_ray(&ctx(&volume_a, &tf, &params), entry, exit).unwrap();
        let b = composite_ray(&ctx(&volume_b, &tf, &params), entry, exit).unwrap();

        assert_eq!(a.1, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn mida_at_minus_one_is_alpha() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(32);

        params.set_compositing_method(CompositingMethod::Alpha);
        let alpha_out = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        params.set_compositing_method(CompositingMethod::Mida);
        params.set_mida_param(-1.0);
        let mida_out = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        assert_eq!(alpha_out, mida_out);
    }

    #[test]
    fn mida_at_plus_one_approaches_mip() {
        // single bright voxel along the ray, everything else dark
        let volume = layered_volume(vector![1, 1, 9], &[0, 0, 0, 0, 255], 0);
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(64);

        params.set_compositing_method(CompositingMethod::Mip);
        let mip_out = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        params.set_compositing_method(CompositingMethod::Mida);
        params.set_mida_param(1.0);
        let mida_out = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        // after the bright voxel no higher maximum appears, so the MIDA
        // accumulation is dominated by the same sample MIP picks
        assert!((mida_out.0 - mip_out.0).norm() < 0.08);
        assert!((mida_out.1 - mip_out.1).abs() < 0.08);
    }

    #[test]
    fn minip_tracks_minimum() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(64);

        params.set_compositing_method(CompositingMethod::Minip);
        let (_, a) = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        params.set_compositing_method(CompositingMethod::Mip);
        let (_, a_max) = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        assert!(a <= a_max);
    }

    #[test]
    fn clamp_floor_skips_samples() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(32);
        params.set_compositing_method(CompositingMethod::Mip);
        params.set_intensity_clamp_min(1.0);

        // everything below the floor, so MIP never observes a sample
        assert!(composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).is_none());
    }

    #[test]
    fn clamp_ceiling_limits_values() {
        let volume = cube_volume();
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(32);
        params.set_compositing_method(CompositingMethod::Mip);
        params.set_intensity_clamp_max(0.25);

        let (_, a) = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();
        assert!(a <= 0.25 + 1e-4);
    }

    #[test]
    fn average_divides_by_sample_count() {
        let volume = layered_volume(vector![1, 1, 2], &[0], 255);
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_compositing_method(CompositingMethod::Average);
        params.set_num_samples(2);

        let (_, a) = composite_ray(&ctx(&volume, &tf, &params), ENTRY, EXIT).unwrap();

        // samples at z = 1.0 (bright) and z = 0.5 (interpolated half)
        let bright = 255.0 / 256.0;
        let expected = (bright + bright * 0.5) / 2.0;
        assert!((a - expected).abs() < 0.01);
    }

    #[test]
    fn shading_darkens_lit_geometry() {
        let bytes = crate::test_helpers::encode_volume(
            vector![4, 4, 4],
            8,
            &(0..64).map(|i| (i * 4) as u16).collect::<Vec<_>>(),
        );
        let volume = volumetric::from_bytes(bytes, &crate::progress::NoProgress).unwrap();
        let gradients = GradientField::from_volume(&volume);
        let tf = TransferFunction::default();

        let mut params = RenderParams::default();
        params.set_num_samples(16);
        params.set_compositing_method(CompositingMethod::Alpha);

        let base = {
            let c = ctx(&volume, &tf, &params);
            composite_ray(&c, ENTRY, EXIT).unwrap()
        };

        params.set_shading(true);
        params.set_shading_threshold(0.0);
        let shaded = {
            let c = RayMarchContext {
                volume: &volume,
                gradients: Some(&gradients),
                tf: &tf,
                params: &params,
            };
            composite_ray(&c, ENTRY, EXIT).unwrap()
        };

        // modulation can only dim the color, never change opacity
        assert!(shaded.0.norm() <= base.0.norm() + 1e-6);
        assert!((shaded.1 - base.1).abs() < 1e-6);
    }
}
