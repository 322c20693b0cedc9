//! Frame production: geometry pass, ray-march compositor and the
//! thread-facing renderer front.

mod compositor;
mod exit_pass;
mod params;
mod render_front;
mod renderer;

pub use compositor::{composite_ray, RayMarchContext};
pub use exit_pass::{CullMode, ExitPositionPass, PositionBuffer};
pub use params::{CompositingMethod, RenderParams};
pub use render_front::{RenderThread, RendererFront, RendererMessage, SerialRenderThread};
pub use renderer::Renderer;
