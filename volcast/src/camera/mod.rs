use std::f32::consts::TAU;

use nalgebra::{point, vector, Matrix4, Point3, Rotation3, Vector2, Vector3};

const FOV_Y_DEG: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

const DRAG_SPEED: f32 = 0.01;
const PAN_SPEED: f32 = 0.002;
const ZOOM_SPEED: f32 = 0.25;
const MIN_DISTANCE: f32 = 0.2;

/// Typed input events delivered by an external windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer drag, in pixels; rotates the volume.
    Drag { dx: f32, dy: f32 },
    /// Pointer drag with modifier; pans the view.
    Pan { dx: f32, dy: f32 },
    /// Wheel scroll; moves the camera closer or further.
    Wheel { delta: f32 },
    /// Switch between perspective and orthographic projection.
    SetPerspective(bool),
}

/// Accumulated interaction state: volume orientation, view offset and
/// projection mode.
///
/// The volume cube stays centered at the origin of view space; dragging
/// rotates the cube (the model matrix), the wheel changes viewing distance
/// and panning offsets the view. The camera looks down negative z.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Euler angles around x, y, z, wrapped to `<0;TAU)`
    rot: Vector3<f32>,
    pan: Vector2<f32>,
    distance: f32,
    perspective: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            rot: vector![0.0, 0.0, 0.0],
            pan: vector![0.0, 0.0],
            distance: 2.5,
            perspective: true,
        }
    }
}

impl Camera {
    pub fn new() -> Camera {
        Camera::default()
    }

    pub fn is_perspective(&self) -> bool {
        self.perspective
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rot
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Drag { dx, dy } => {
                self.rot.y = (self.rot.y + dx * DRAG_SPEED).rem_euclid(TAU);
                self.rot.x = (self.rot.x + dy * DRAG_SPEED).rem_euclid(TAU);
            }
            InputEvent::Pan { dx, dy } => {
                self.pan.x -= dx * PAN_SPEED * self.distance;
                self.pan.y += dy * PAN_SPEED * self.distance;
            }
            InputEvent::Wheel { delta } => {
                self.distance = (self.distance - delta * ZOOM_SPEED).max(MIN_DISTANCE);
            }
            InputEvent::SetPerspective(enabled) => self.perspective = enabled,
        }
    }

    fn rotation_matrix(&self) -> Rotation3<f32> {
        Rotation3::from_euler_angles(self.rot.x, self.rot.y, self.rot.z)
    }

    /// Cube-local `[0,1]^3` to world. Rotation is about the cube center.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        let center = vector![0.5, 0.5, 0.5];
        Matrix4::new_translation(&center)
            * self.rotation_matrix().to_homogeneous()
            * Matrix4::new_translation(&-center)
    }

    pub fn inverse_model_matrix(&self) -> Matrix4<f32> {
        let center = vector![0.5, 0.5, 0.5];
        Matrix4::new_translation(&center)
            * self.rotation_matrix().inverse().to_homogeneous()
            * Matrix4::new_translation(&-center)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&vector![
            -0.5 - self.pan.x,
            -0.5 - self.pan.y,
            -0.5 - self.distance
        ])
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        let fov_y = FOV_Y_DEG.to_radians();
        if self.perspective {
            nalgebra::Perspective3::new(aspect, fov_y, NEAR, FAR).to_homogeneous()
        } else {
            // match the apparent size of the perspective frustum at the
            // cube center, so toggling projection keeps framing
            let half_h = self.distance * f32::tan(0.5 * fov_y);
            let half_w = half_h * aspect;
            nalgebra::Orthographic3::new(-half_w, half_w, -half_h, half_h, NEAR, FAR)
                .to_homogeneous()
        }
    }

    pub fn mvp(&self, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * self.view_matrix() * self.model_matrix()
    }

    /// Eye position in cube-local coordinates.
    pub fn local_eye(&self) -> Point3<f32> {
        let eye_world = point![0.5 + self.pan.x, 0.5 + self.pan.y, 0.5 + self.distance];
        self.inverse_model_matrix().transform_point(&eye_world)
    }

    /// View direction in cube-local coordinates.
    pub fn local_view_dir(&self) -> Vector3<f32> {
        self.rotation_matrix().inverse() * vector![0.0, 0.0, -1.0]
    }
}
