/// Run configuration
///
/// Read once at startup from an optional RON file, then handed to the
/// pipeline by value. Every field has a default matching the reference
/// 32x16 build, so a file only needs the values it changes:
///
/// ```ron
/// (width: 32, height: 16, tile_height: Some(8), model: Some("teapot.stl"))
/// ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Mesh;
use crate::panel::PanelLayout;
use crate::projection::{Camera, Projector};
use crate::renderer::Renderer;
use crate::stl::{self, NormalMode};
use crate::transform::RotationState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Driver brightness, 0-255
    pub brightness: u8,
    pub width: u32,
    pub height: u32,
    /// Width of one physical tile, the panel width when unset
    pub tile_width: Option<u32>,
    /// Height of one physical tile, the panel height when unset
    pub tile_height: Option<u32>,
    /// Minimum time between frames, in milliseconds
    pub sleep_ms: u64,
    /// Frames to show before clearing; 0 runs until the driver stops
    pub cycles: u32,
    /// STL file to show instead of the built-in cube
    pub model: Option<PathBuf>,
    /// Keep facet normals from the STL file instead of recomputing them
    pub trust_normals: bool,
    /// Seconds per full turn
    pub rotation_period: f64,
    pub fov_degrees: f32,
    pub camera_distance: f32,
    pub near_clip: f32,
    /// Wireframe color as red, green, blue
    pub stroke: [u8; 3],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brightness: 255,
            width: 32,
            height: 16,
            tile_width: None,
            tile_height: None,
            sleep_ms: 2,
            cycles: 0,
            model: None,
            trust_normals: false,
            rotation_period: 5.0,
            fov_degrees: 52.0,
            camera_distance: 2.0,
            near_clip: 0.1,
            stroke: [255, 255, 255],
        }
    }
}

impl Config {
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Config = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout()?;
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(Error::Config(format!(
                "field of view must be between 0 and 180 degrees, got {}",
                self.fov_degrees
            )));
        }
        if !(self.near_clip > 0.0) {
            return Err(Error::Config(format!(
                "near clip distance must be positive, got {}",
                self.near_clip
            )));
        }
        if !(self.rotation_period > 0.0) {
            return Err(Error::Config(format!(
                "rotation period must be positive, got {}",
                self.rotation_period
            )));
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<PanelLayout> {
        PanelLayout::new(
            self.width,
            self.height,
            self.tile_width.unwrap_or(self.width),
            self.tile_height.unwrap_or(self.height),
        )
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    pub fn normal_mode(&self) -> NormalMode {
        if self.trust_normals {
            NormalMode::Trust
        } else {
            NormalMode::Recompute
        }
    }

    /// The configured STL model, or a unit cube tilted 45° on every axis
    pub fn load_model(&self) -> Result<Mesh> {
        match &self.model {
            Some(path) => Ok(stl::load_stl(path, self.normal_mode())?.normalized()),
            None => {
                let tilt = std::f32::consts::FRAC_PI_4;
                Ok(Mesh::cube(1.0).apply(&RotationState::new(tilt, tilt, tilt).matrix()))
            }
        }
    }

    pub fn projector(&self) -> Projector {
        Projector::new(self.width, self.height, self.fov_degrees, self.near_clip)
    }

    pub fn camera(&self) -> Camera {
        Camera::at_distance(self.camera_distance)
    }

    pub fn renderer(&self, model: Mesh) -> Result<Renderer> {
        Ok(
            Renderer::new(model, &self.camera(), self.projector(), self.rotation_period)?
                .with_stroke(Rgb(self.stroke)),
        )
    }
}
