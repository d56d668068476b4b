/// ledcube core library - rendering and panel mapping pipeline
///
/// Renders a tumbling wireframe model, maps the raster onto the serpentine
/// wiring of an LED panel and pushes it to an LED driver.

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod panel;
pub mod projection;
pub mod pump;
pub mod renderer;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use config::Config;
pub use driver::{LedDriver, MemoryDriver};
pub use error::{Error, FormatError, Result};
pub use geometry::{Mesh, Triangle};
pub use panel::PanelLayout;
pub use projection::{Camera, Projector};
pub use pump::FramePump;
pub use renderer::{Frame, Renderer};
pub use stl::NormalMode;
pub use transform::{RotationState, Transform};
