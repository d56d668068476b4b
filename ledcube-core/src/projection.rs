/// Camera and pinhole projection onto the panel raster
use nalgebra::{Matrix4, Point2, Vector4};

use crate::error::{Error, Result};
use crate::transform::Transform;

/// Pinhole projector looking down -z in camera space
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    pub width: u32,
    pub height: u32,
    /// Pixels per unit of `x / -z`, half the pixel height times the focal factor
    scale: f32,
    /// Vertices with camera-space z above this are too close to draw
    pub clipping: f32,
}

impl Projector {
    /// `fov_degrees` is the vertical field of view, `near` the distance of
    /// the near plane in front of the camera.
    pub fn new(width: u32, height: u32, fov_degrees: f32, near: f32) -> Self {
        let half = height as f32 / 2.0;
        let focal = 1.0 / (fov_degrees.to_radians() / 2.0).tan();
        Self {
            width,
            height,
            scale: half * focal,
            clipping: -near,
        }
    }

    /// Camera-space point to pixel coordinates, y growing downwards.
    pub fn project(&self, p: &Vector4<f32>) -> Point2<f32> {
        let depth = -p.z;
        Point2::new(
            self.width as f32 / 2.0 + self.scale * (p.x / depth),
            self.height as f32 / 2.0 - self.scale * (p.y / depth),
        )
    }

    /// Whether the vertex lies beyond the near plane
    pub fn is_visible(&self, p: &Vector4<f32>) -> bool {
        p.z <= self.clipping
    }
}

/// The viewer, placed in the world by a rigid transform
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub transform: Matrix4<f32>,
}

impl Camera {
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self { transform }
    }

    /// Camera on the +z axis looking at the origin
    pub fn at_distance(distance: f32) -> Self {
        Self::new(Transform::translation(0.0, 0.0, distance))
    }

    /// World-to-camera matrix
    pub fn view_matrix(&self) -> Result<Matrix4<f32>> {
        Transform::inverse(&self.transform)
            .ok_or_else(|| Error::Config("camera transform is not invertible".to_string()))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::at_distance(2.0)
    }
}
