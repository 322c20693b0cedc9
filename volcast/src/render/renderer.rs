use nalgebra::Point3;

use crate::{
    camera::Camera,
    common::Ray,
    transfer_function::TransferFunction,
    volumetric::{GradientField, Volume},
};

use super::{
    compositor::{composite_ray, RayMarchContext},
    exit_pass::{CullMode, ExitPositionPass},
    params::RenderParams,
};

/// How far behind the exit point the reconstruction ray starts. Anything
/// beyond the cube diagonal (sqrt(3)) works.
const BACKTRACK_DISTANCE: f32 = 4.0;

/// Serial two-pass renderer.
///
/// Owns the dataset and all per-frame state. A frame is produced in two
/// passes: the geometry pass rasterizes the volume bounding cube into
/// per-pixel entry and exit positions, then the compositor marches a ray
/// through every covered pixel. Output is tightly packed RGB8, row 0 on top.
pub struct Renderer {
    volume: Volume,
    /// Built on first shaded frame, dropped when the volume changes
    gradients: Option<GradientField>,
    tf: TransferFunction,
    params: RenderParams,
    exit_pass: ExitPositionPass,
    entry_pass: ExitPositionPass,
}

impl Renderer {
    pub fn new(volume: Volume, params: RenderParams) -> Renderer {
        let (width, height) = params.resolution;
        Renderer {
            volume,
            gradients: None,
            tf: TransferFunction::default(),
            params,
            exit_pass: ExitPositionPass::new(width, height),
            entry_pass: ExitPositionPass::new(width, height),
        }
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// Replace the dataset. Cached gradients belong to the old data and
    /// are dropped.
    pub fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        self.gradients = None;
    }

    pub fn set_transfer_function(&mut self, tf: TransferFunction) {
        self.tf = tf;
    }

    pub fn set_render_params(&mut self, params: RenderParams) {
        self.params = params;
    }

    pub fn set_render_resolution(&mut self, resolution: (usize, usize)) {
        self.params.resolution = resolution;
    }

    /// Render one frame into `buffer` (RGB8, `width * height * 3` bytes).
    pub fn render_to_buffer(&mut self, camera: &Camera, buffer: &mut [u8]) {
        let (width, height) = self.params.resolution;
        assert!(buffer.len() >= width * height * 3);

        if self.params.shading && self.gradients.is_none() {
            log::debug!("computing gradient field");
            self.gradients = Some(GradientField::from_volume(&self.volume));
        }

        let aspect = if height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
        let mvp = camera.mvp(aspect);

        log::trace!(
            "rendering {}x{} frame, {:?}, {} samples",
            width,
            height,
            self.params.compositing,
            self.params.num_samples
        );

        let exit_buffer = self
            .exit_pass
            .render(&mvp, CullMode::Front, (width, height));
        let entry_buffer = self
            .entry_pass
            .render(&mvp, CullMode::Back, (width, height));

        let ctx = RayMarchContext {
            volume: &self.volume,
            gradients: self.gradients.as_ref(),
            tf: &self.tf,
            params: &self.params,
        };

        let bbox = self.volume.bound_box();
        let eye = camera.local_eye();
        let eye_inside = bbox.is_in(&eye);
        let view_dir = camera.local_view_dir();
        let perspective = camera.is_perspective();

        let background = self.params.background;
        let bg_bytes = [
            to_byte(background.x),
            to_byte(background.y),
            to_byte(background.z),
        ];

        for y in 0..height {
            for x in 0..width {
                let index = (x + y * width) * 3;

                let exit = match exit_buffer.get(x, y) {
                    Some(exit) => exit,
                    None => {
                        buffer[index..index + 3].copy_from_slice(&bg_bytes);
                        continue;
                    }
                };

                // Front faces get clipped by the near plane once the eye is
                // inside (or nearly inside) the cube, so the entry buffer
                // can be empty where the exit buffer is not.
                let entry = match entry_buffer.get(x, y) {
                    Some(entry) => entry,
                    // perspective rays all originate at the eye; parallel
                    // rays must keep their per-pixel lateral offset
                    None if perspective && eye_inside => eye,
                    None => reconstruct_entry(&exit, &eye, view_dir, perspective, &bbox),
                };

                let (rgb, alpha) = match composite_ray(&ctx, entry, exit) {
                    Some(result) => result,
                    None => {
                        buffer[index..index + 3].copy_from_slice(&bg_bytes);
                        continue;
                    }
                };

                // ray color is premultiplied, blend over the background
                let rest = 1.0 - alpha;
                buffer[index] = to_byte(rgb.x + rest * background.x);
                buffer[index + 1] = to_byte(rgb.y + rest * background.y);
                buffer[index + 2] = to_byte(rgb.z + rest * background.z);
            }
        }
    }
}

/// Entry position for a pixel whose front faces were clipped away. The ray
/// through the exit point is cast backwards from well outside the cube and
/// its first intersection with the bounding box is the entry. A face lying
/// behind the viewer (camera inside the cube) is clamped forward to the
/// camera plane, so only visible samples are marched.
fn reconstruct_entry(
    exit: &Point3<f32>,
    eye: &Point3<f32>,
    view_dir: nalgebra::Vector3<f32>,
    perspective: bool,
    bbox: &crate::common::BoundBox,
) -> Point3<f32> {
    let direction = if perspective {
        (exit - eye).normalize()
    } else {
        view_dir
    };

    let ray = Ray::new(exit - direction * BACKTRACK_DISTANCE, direction);
    let mut entry = match bbox.intersect(&ray) {
        Some((t_near, _)) => ray.point_from_t(t_near.max(0.0)),
        // exit came from the rasterizer, so the ray grazes the cube at
        // worst; fall back to a zero-length segment
        None => *exit,
    };

    let behind = (eye - entry).dot(&direction);
    if behind > 0.0 {
        entry += direction * behind;
    }

    entry
}

fn to_byte(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod test {

    use nalgebra::vector;

    use super::*;
    use crate::{camera::InputEvent, render::params::CompositingMethod, test_helpers::cube_volume};

    const RES: (usize, usize) = (16, 16);

    fn small_params() -> RenderParams {
        let mut params = RenderParams::default();
        params.resolution = RES;
        params.set_num_samples(32);
        params
    }

    fn frame(renderer: &mut Renderer, camera: &Camera) -> Vec<u8> {
        let mut buffer = vec![0; RES.0 * RES.1 * 3];
        renderer.render_to_buffer(camera, &mut buffer);
        buffer
    }

    #[test]
    fn empty_volume_renders_background() {
        let mut params = small_params();
        params.background = vector![1.0, 0.0, 0.0];

        let mut renderer = Renderer::new(Volume::default(), params);
        let buffer = frame(&mut renderer, &Camera::new());

        for pixel in buffer.chunks(3) {
            assert_eq!(pixel, [255, 0, 0]);
        }
    }

    #[test]
    fn volume_covers_center_pixel() {
        let mut params = small_params();
        params.set_compositing_method(CompositingMethod::Mip);

        let mut renderer = Renderer::new(cube_volume(), params);
        let buffer = frame(&mut renderer, &Camera::new());

        let center = (8 + 8 * RES.0) * 3;
        assert!(buffer[center] > 0);

        // corners stay background black
        assert_eq!(&buffer[0..3], [0, 0, 0]);
    }

    #[test]
    fn mida_at_minus_one_matches_alpha_frame() {
        let mut camera = Camera::new();
        camera.handle_event(InputEvent::Drag { dx: 35.0, dy: 20.0 });

        let mut params = small_params();
        params.set_compositing_method(CompositingMethod::Alpha);
        let mut renderer = Renderer::new(cube_volume(), params.clone());
        let alpha_frame = frame(&mut renderer, &camera);

        params.set_compositing_method(CompositingMethod::Mida);
        params.set_mida_param(-1.0);
        renderer.set_render_params(params);
        let mida_frame = frame(&mut renderer, &camera);

        assert_eq!(alpha_frame, mida_frame);
    }

    #[test]
    fn collapsed_sample_range_renders_background() {
        let mut params = small_params();
        params.set_sample_range_start(0.6);
        params.set_sample_range_end(0.6);
        params.background = vector![0.0, 1.0, 0.0];

        let mut renderer = Renderer::new(cube_volume(), params);
        let buffer = frame(&mut renderer, &Camera::new());

        for pixel in buffer.chunks(3) {
            assert_eq!(pixel, [0, 255, 0]);
        }
    }

    #[test]
    fn camera_inside_volume_still_renders() {
        let mut camera = Camera::new();
        for _ in 0..20 {
            camera.handle_event(InputEvent::Wheel { delta: 1.0 });
        }

        let mut params = small_params();
        params.set_compositing_method(CompositingMethod::Mip);

        let mut renderer = Renderer::new(cube_volume(), params);
        let buffer = frame(&mut renderer, &camera);

        let center = (8 + 8 * RES.0) * 3;
        assert!(buffer[center] > 0);
    }

    #[test]
    fn ortho_camera_inside_keeps_rays_parallel() {
        // intensity rises along x, so each ray column has its own maximum
        let (volume, _) = crate::test_helpers::ramp_volume();

        let mut camera = Camera::new();
        camera.handle_event(InputEvent::SetPerspective(false));
        for _ in 0..20 {
            camera.handle_event(InputEvent::Wheel { delta: 1.0 });
        }
        assert!(volume.bound_box().is_in(&camera.local_eye()));

        let mut params = small_params();
        params.set_compositing_method(CompositingMethod::Mip);

        let mut renderer = Renderer::new(volume, params);
        let buffer = frame(&mut renderer, &camera);

        let row = 8 * RES.0 * 3;
        let left = buffer[row + 2 * 3];
        let center = buffer[row + 8 * 3];
        let right = buffer[row + 13 * 3];

        // the ramp ordering must survive the clipped entry buffer; a
        // single shared entry point would flatten left onto center
        assert!(left < center, "left {left} center {center}");
        assert!(center < right, "center {center} right {right}");
    }

    #[test]
    fn shading_builds_gradients_once() {
        let mut params = small_params();
        params.set_shading(true);

        let mut renderer = Renderer::new(cube_volume(), params);
        assert!(renderer.gradients.is_none());

        let camera = Camera::new();
        frame(&mut renderer, &camera);
        assert!(renderer.gradients.is_some());

        renderer.set_volume(cube_volume());
        assert!(renderer.gradients.is_none());
    }
}
