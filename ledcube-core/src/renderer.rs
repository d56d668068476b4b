/// Wireframe renderer
///
/// Each frame is computed from scratch: the base mesh is rotated according to
/// the elapsed time, moved into camera space, culled, clipped against the near
/// plane, projected and drawn as triangle outlines.

use image::{Rgb, RgbImage};
use nalgebra::{Matrix4, Point2};

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::projection::{Camera, Projector};
use crate::transform::{self, Transform};

/// Raster produced by one render call
pub type Frame = RgbImage;

pub const DEFAULT_STROKE: Rgb<u8> = Rgb([255, 255, 255]);

/// Projected points are clamped to this many pixels from the origin so a
/// vertex right at the near plane cannot make a line walk for too long.
const MAX_COORD: f32 = 16_384.0;

/// Rotation angle in radians after `elapsed` seconds of a rotation taking
/// `period` seconds, wrapped into `[0, 2π)`.
pub fn angle(elapsed: f64, period: f64) -> f32 {
    if period <= 0.0 {
        return 0.0;
    }
    (elapsed.rem_euclid(period) / period * std::f64::consts::TAU) as f32
}

/// Renders a tumbling wireframe of a mesh
#[derive(Debug, Clone)]
pub struct Renderer {
    model: Mesh,
    view: Matrix4<f32>,
    projector: Projector,
    /// Seconds per full turn around Z; Y turns twice as fast
    rotation_period: f64,
    stroke: Rgb<u8>,
}

impl Renderer {
    pub fn new(
        model: Mesh,
        camera: &Camera,
        projector: Projector,
        rotation_period: f64,
    ) -> Result<Self> {
        if rotation_period.is_nan() || rotation_period <= 0.0 {
            return Err(Error::Config(format!(
                "rotation period must be positive, got {}",
                rotation_period
            )));
        }
        if model.is_empty() {
            log::warn!("rendering an empty mesh, frames will stay black");
        }
        Ok(Self {
            model,
            view: camera.view_matrix()?,
            projector,
            rotation_period,
            stroke: DEFAULT_STROKE,
        })
    }

    pub fn with_stroke(mut self, stroke: Rgb<u8>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn width(&self) -> u32 {
        self.projector.width
    }

    pub fn height(&self) -> u32 {
        self.projector.height
    }

    pub fn model(&self) -> &Mesh {
        &self.model
    }

    /// Model rotation after `elapsed` seconds.
    ///
    /// The model is stood up by a quarter turn around X, then spun around Z
    /// once per period and around Y twice per period.
    pub fn animation(&self, elapsed: f64) -> Matrix4<f32> {
        let angle_z = angle(elapsed, self.rotation_period);
        let angle_y = angle(elapsed, self.rotation_period / 2.0);
        Transform::rotation(std::f32::consts::FRAC_PI_2, angle_y, angle_z)
    }

    /// The animated model in camera space
    pub fn camera_space(&self, elapsed: f64) -> Mesh {
        let m = Transform::compose(&self.view, &self.animation(elapsed));
        self.model.apply(&m)
    }

    /// Indices of the triangles of a camera-space mesh that face the viewer
    /// and lie entirely beyond the near plane.
    pub fn visible_triangles(&self, mesh: &Mesh) -> Vec<usize> {
        mesh.triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                // The first vertex doubles as the ray from the eye.
                transform::dot(&t.vertices[0], &t.normal()) < 0.0
                    && t.vertices.iter().all(|v| self.projector.is_visible(v))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Draw the visible triangles of a camera-space mesh
    pub fn render_mesh(&self, mesh: &Mesh) -> Frame {
        let mut frame = RgbImage::new(self.projector.width, self.projector.height);
        let visible = self.visible_triangles(mesh);
        for &i in &visible {
            let [a, b, c] = mesh.triangles[i]
                .vertices
                .map(|v| pixel(self.projector.project(&v)));
            draw_line(&mut frame, a, b, self.stroke);
            draw_line(&mut frame, b, c, self.stroke);
            draw_line(&mut frame, c, a, self.stroke);
        }
        log::trace!("drew {} of {} triangles", visible.len(), mesh.len());
        frame
    }

    /// Render the frame for `elapsed` seconds since the animation started
    pub fn frame(&self, elapsed: f64) -> Frame {
        self.render_mesh(&self.camera_space(elapsed))
    }
}

fn pixel(p: Point2<f32>) -> (i32, i32) {
    (
        p.x.clamp(-MAX_COORD, MAX_COORD).floor() as i32,
        p.y.clamp(-MAX_COORD, MAX_COORD).floor() as i32,
    )
}

/// Draw a line from `from` to `to` using Bresenham's algorithm, skipping
/// pixels outside the frame.
pub fn draw_line(frame: &mut RgbImage, from: (i32, i32), to: (i32, i32), color: Rgb<u8>) {
    let (x0, y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let (width, height) = frame.dimensions();

    loop {
        if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
            frame.put_pixel(x as u32, y as u32, color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
