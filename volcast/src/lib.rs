//! Two-pass volume ray-marching renderer.
//!
//! A scalar 3D dataset ([`volumetric::Volume`]) is rendered to a 2D image by
//! marching view rays through its bounding cube. The segment each ray covers
//! is found geometrically: the cube is rasterized twice with opposite face
//! culling ([`render::ExitPositionPass`]), yielding per-pixel entry and exit
//! positions in cube-local space. The compositor then steps a fixed number of
//! samples along each segment and accumulates color and opacity under one of
//! five compositing methods (alpha/DVR, MIP, MINIP, average, MIDA).
//!
//! Rendering can run inline via [`render::Renderer`] or on a dedicated
//! thread behind [`render::RendererFront`].

pub mod camera;
pub mod color;
pub mod common;
pub mod premade;
pub mod progress;
pub mod render;
pub mod test_helpers;
pub mod transfer_function;
pub mod volumetric;

pub use camera::{Camera, InputEvent};
pub use transfer_function::TransferFunction;
