use nalgebra::{point, Matrix4, Point3, Vector2, Vector4};

/// Corners of the volume bounding cube in cube-local coordinates.
pub const CUBE_VERTICES: [Point3<f32>; 8] = [
    // front (z = 1)
    point![0.0, 0.0, 1.0],
    point![1.0, 0.0, 1.0],
    point![1.0, 1.0, 1.0],
    point![0.0, 1.0, 1.0],
    // back (z = 0)
    point![0.0, 0.0, 0.0],
    point![1.0, 0.0, 0.0],
    point![1.0, 1.0, 0.0],
    point![0.0, 1.0, 0.0],
];

/// The cube's 12 triangles, counter-clockwise seen from outside.
pub const CUBE_TRIANGLES: [[usize; 3]; 12] = [
    // front
    [0, 1, 2],
    [2, 3, 0],
    // top
    [1, 5, 6],
    [6, 2, 1],
    // back
    [7, 6, 5],
    [5, 4, 7],
    // bottom
    [4, 0, 3],
    [3, 7, 4],
    // left
    [4, 5, 1],
    [1, 0, 4],
    // right
    [3, 2, 6],
    [6, 7, 3],
];

/// Which faces get culled. `Front` keeps back faces, producing ray exit
/// positions; `Back` keeps front faces, producing entry positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    Front,
    Back,
}

/// Per-pixel cube-local positions; `None` outside the cube silhouette.
///
/// First-class intermediate artifact between the geometry pass and the
/// compositor: one producer, one consumer per frame, reused across frames.
pub struct PositionBuffer {
    width: usize,
    height: usize,
    data: Vec<Option<Point3<f32>>>,
}

impl PositionBuffer {
    pub fn new(width: usize, height: usize) -> PositionBuffer {
        PositionBuffer {
            width,
            height,
            data: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize to the viewport and reset every pixel, so stale
    /// previous-frame positions can never read as fresh.
    fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, None);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Point3<f32>> {
        self.data[x + y * self.width]
    }

    fn set(&mut self, x: usize, y: usize, pos: Point3<f32>) {
        self.data[x + y * self.width] = Some(pos);
    }
}

/// Clip-space vertex with its cube-local position carried along.
#[derive(Clone, Copy)]
struct ClipVertex {
    clip: Vector4<f32>,
    attr: Point3<f32>,
}

/// Screen-space vertex prepared for rasterization.
#[derive(Clone, Copy)]
struct ScreenVertex {
    pos: Vector2<f32>,
    inv_w: f32,
    attr: Point3<f32>,
}

/// Geometry pass: rasterizes the volume bounding cube and records each
/// covered pixel's interpolated cube-local position.
///
/// Rendering the cube with front faces culled yields, for every pixel the
/// cube covers, the farthest ray/cube intersection. No analytic ray-box
/// test is needed, and a camera inside the volume still works since only
/// the rasterized position matters. The same pass with the opposite cull
/// mode yields entry positions.
pub struct ExitPositionPass {
    buffer: PositionBuffer,
}

impl ExitPositionPass {
    pub fn new(width: usize, height: usize) -> ExitPositionPass {
        ExitPositionPass {
            buffer: PositionBuffer::new(width, height),
        }
    }

    pub fn render(
        &mut self,
        mvp: &Matrix4<f32>,
        cull: CullMode,
        resolution: (usize, usize),
    ) -> &PositionBuffer {
        let (width, height) = resolution;
        self.buffer.reset(width, height);

        if width == 0 || height == 0 {
            return &self.buffer;
        }

        let clip_corners: Vec<ClipVertex> = CUBE_VERTICES
            .iter()
            .map(|&p| ClipVertex {
                clip: mvp * p.to_homogeneous(),
                attr: p,
            })
            .collect();

        for tri in CUBE_TRIANGLES {
            let polygon = clip_near([
                clip_corners[tri[0]],
                clip_corners[tri[1]],
                clip_corners[tri[2]],
            ]);

            if polygon.len() < 3 {
                continue;
            }

            let screen: Vec<ScreenVertex> = polygon
                .iter()
                .map(|v| to_screen(v, width, height))
                .collect();

            // fan triangulation; all fan triangles share the winding of
            // the clipped polygon
            for i in 1..screen.len() - 1 {
                self.raster_triangle(&[screen[0], screen[i], screen[i + 1]], cull);
            }
        }

        &self.buffer
    }

    fn raster_triangle(&mut self, tri: &[ScreenVertex; 3], cull: CullMode) {
        let [a, b, c] = tri;

        let area = cross2(b.pos - a.pos, c.pos - a.pos);

        // Screen y grows downwards, so triangles facing the camera wind
        // clockwise and have negative area here.
        let keep = match cull {
            CullMode::Front => area > f32::EPSILON,
            CullMode::Back => area < -f32::EPSILON,
        };
        if !keep {
            return;
        }

        let min_x = a.pos.x.min(b.pos.x).min(c.pos.x).floor().max(0.0) as usize;
        let min_y = a.pos.y.min(b.pos.y).min(c.pos.y).floor().max(0.0) as usize;
        let max_x = a.pos.x.max(b.pos.x).max(c.pos.x).ceil() as usize;
        let max_y = a.pos.y.max(b.pos.y).max(c.pos.y).ceil() as usize;

        let max_x = max_x.min(self.buffer.width());
        let max_y = max_y.min(self.buffer.height());

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);

                let l0 = cross2(c.pos - b.pos, p - b.pos) / area;
                let l1 = cross2(a.pos - c.pos, p - c.pos) / area;
                let l2 = cross2(b.pos - a.pos, p - a.pos) / area;

                const IN: f32 = -1e-6;
                if l0 < IN || l1 < IN || l2 < IN {
                    continue;
                }

                // perspective-correct interpolation of the cube-local
                // position; for orthographic projections w is 1 and this
                // degrades to plain barycentric weighting
                let denom = l0 * a.inv_w + l1 * b.inv_w + l2 * c.inv_w;
                let attr = (a.attr.coords * (l0 * a.inv_w)
                    + b.attr.coords * (l1 * b.inv_w)
                    + c.attr.coords * (l2 * c.inv_w))
                    / denom;

                self.buffer.set(x, y, attr.into());
            }
        }
    }
}

fn cross2(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

fn to_screen(v: &ClipVertex, width: usize, height: usize) -> ScreenVertex {
    let inv_w = 1.0 / v.clip.w;
    let ndc_x = v.clip.x * inv_w;
    let ndc_y = v.clip.y * inv_w;

    // pixel row 0 is the top scanline
    ScreenVertex {
        pos: Vector2::new(
            (ndc_x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc_y) * 0.5 * height as f32,
        ),
        inv_w,
        attr: v.attr,
    }
}

/// Sutherland-Hodgman clip against the near plane (`z + w > 0` in clip
/// space). Attributes are interpolated along clipped edges; linear
/// interpolation in clip space matches linear interpolation in object
/// space.
fn clip_near(tri: [ClipVertex; 3]) -> Vec<ClipVertex> {
    let mut out = Vec::with_capacity(4);

    for i in 0..3 {
        let a = tri[i];
        let b = tri[(i + 1) % 3];

        let da = a.clip.z + a.clip.w;
        let db = b.clip.z + b.clip.w;

        if da > 0.0 {
            out.push(a);
        }

        if (da > 0.0) != (db > 0.0) {
            let t = da / (da - db);
            out.push(ClipVertex {
                clip: a.clip + (b.clip - a.clip) * t,
                attr: (a.attr.coords + (b.attr.coords - a.attr.coords) * t).into(),
            });
        }
    }

    out
}
