/// Frame pump: renderer → panel mapping → LED driver, paced by sleeping
use std::thread;
use std::time::{Duration, Instant};

use crate::color::pack_rgb8;
use crate::driver::LedDriver;
use crate::error::{Error, Result};
use crate::panel::PanelLayout;
use crate::renderer::Renderer;

/// The pump drives a single string on the first channel
const CHANNEL: usize = 0;

pub struct FramePump<D: LedDriver> {
    renderer: Renderer,
    layout: PanelLayout,
    driver: D,
    frames: u64,
}

impl<D: LedDriver> FramePump<D> {
    pub fn new(renderer: Renderer, layout: PanelLayout, driver: D) -> Result<Self> {
        if (renderer.width(), renderer.height()) != (layout.width(), layout.height()) {
            return Err(Error::Config(format!(
                "renderer is {}x{} but the panel is {}x{}",
                renderer.width(),
                renderer.height(),
                layout.width(),
                layout.height()
            )));
        }
        Ok(Self {
            renderer,
            layout,
            driver,
            frames: 0,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Frames displayed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Render the frame at `elapsed` seconds, write it to the string and
    /// trigger a hardware render.
    pub fn display(&mut self, elapsed: f64) -> Result<()> {
        let frame = self.renderer.frame(elapsed);
        let leds = self.driver.leds(CHANNEL)?;
        if leds.len() < self.layout.len() {
            return Err(Error::Hardware(format!(
                "channel {} has {} LEDs, panel needs {}",
                CHANNEL,
                leds.len(),
                self.layout.len()
            )));
        }
        for (x, y, pixel) in frame.enumerate_pixels() {
            leds[self.layout.index(x, y)] = pack_rgb8(*pixel);
        }
        self.frames += 1;
        self.driver.render()
    }

    /// Turn every LED off
    pub fn clear(&mut self) -> Result<()> {
        self.driver.leds(CHANNEL)?.fill(0);
        self.driver.render()
    }

    /// Initialise the driver and show `cycles` frames (0 runs until the
    /// driver asks to stop), at most one per `interval`. The string is
    /// cleared and the driver finalized afterwards, also on error.
    pub fn run(&mut self, cycles: u32, interval: Duration) -> Result<()> {
        self.driver.init()?;
        log::info!(
            "driving {} LEDs ({} tile(s)), {} cycles every {:?}",
            self.layout.len(),
            self.layout.tiles(),
            cycles,
            interval
        );

        let result = self.animate(cycles, interval);
        if let Err(e) = &result {
            log::error!("frame {} failed: {}", self.frames, e);
        }
        let cleared = self.clear();
        self.driver.finalize();
        log::info!("stopped after {} frames", self.frames);
        result.and(cleared)
    }

    fn animate(&mut self, cycles: u32, interval: Duration) -> Result<()> {
        let start = Instant::now();
        let mut shown = 0u32;
        while cycles == 0 || shown < cycles {
            let frame_start = Instant::now();
            self.display(start.elapsed().as_secs_f64())?;
            self.driver.wait()?;
            shown += 1;

            if self.driver.stop_requested() {
                log::info!("driver requested stop");
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;
    use crate::geometry::Mesh;
    use crate::projection::{Camera, Projector};

    fn pump(width: u32, height: u32, tile_height: u32, leds: usize) -> FramePump<MemoryDriver> {
        let renderer = Renderer::new(
            Mesh::cube(1.0),
            &Camera::at_distance(2.0),
            Projector::new(width, height, 52.0, 0.1),
            5.0,
        )
        .unwrap();
        let layout = PanelLayout::new(width, height, width, tile_height).unwrap();
        FramePump::new(renderer, layout, MemoryDriver::new(leds)).unwrap()
    }

    /// Stops after a fixed number of renders
    struct StopAfter {
        inner: MemoryDriver,
        limit: usize,
    }

    impl LedDriver for StopAfter {
        fn init(&mut self) -> Result<()> {
            self.inner.init()
        }
        fn render(&mut self) -> Result<()> {
            self.inner.render()
        }
        fn wait(&mut self) -> Result<()> {
            self.inner.wait()
        }
        fn finalize(&mut self) {
            self.inner.finalize()
        }
        fn leds(&mut self, channel: usize) -> Result<&mut [u32]> {
            self.inner.leds(channel)
        }
        fn stop_requested(&mut self) -> bool {
            self.inner.renders() >= self.limit
        }
    }

    #[test]
    fn test_display_writes_every_led() {
        let mut pump = pump(32, 16, 8, 32 * 16);
        pump.driver_mut().init().unwrap();
        // Anything wider than 24 bits can only be left over.
        pump.driver_mut().leds(0).unwrap().fill(u32::MAX);
        pump.display(0.0).unwrap();

        let shown = pump.driver().shown();
        assert!(shown.iter().all(|&c| c <= 0xFF_FFFF));
        assert!(shown.contains(&0xFF_FFFF));
        assert_eq!(pump.frames(), 1);
    }

    #[test]
    fn test_display_follows_wiring_order() {
        let mut pump = pump(16, 16, 16, 256);
        pump.driver_mut().init().unwrap();
        pump.display(0.0).unwrap();

        let frame = pump.renderer.frame(0.0);
        let layout = pump.layout;
        let shown = pump.driver().shown();
        for (x, y, pixel) in frame.enumerate_pixels() {
            assert_eq!(shown[layout.index(x, y)], pack_rgb8(*pixel));
        }
    }

    #[test]
    fn test_run_clears_and_finalizes() {
        let mut pump = pump(8, 8, 8, 64);
        pump.run(3, Duration::ZERO).unwrap();

        let driver = pump.driver();
        assert_eq!(driver.renders(), 4);
        assert!(driver.shown().iter().all(|&c| c == 0));
        assert!(driver.is_finalized());
    }

    #[test]
    fn test_run_until_driver_stops() {
        let renderer = Renderer::new(
            Mesh::cube(1.0),
            &Camera::default(),
            Projector::new(8, 8, 52.0, 0.1),
            5.0,
        )
        .unwrap();
        let driver = StopAfter {
            inner: MemoryDriver::new(64),
            limit: 2,
        };
        let mut pump = FramePump::new(renderer, PanelLayout::single(8, 8).unwrap(), driver).unwrap();
        pump.run(0, Duration::ZERO).unwrap();
        assert_eq!(pump.frames(), 2);
        assert!(pump.driver().inner.is_finalized());
    }

    #[test]
    fn test_short_string_is_a_hardware_error() {
        let mut pump = pump(8, 8, 8, 10);
        let err = pump.run(1, Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Hardware(_)));
        assert!(pump.driver().is_finalized());
    }

    #[test]
    fn test_geometry_mismatch() {
        let renderer = Renderer::new(
            Mesh::cube(1.0),
            &Camera::default(),
            Projector::new(8, 8, 52.0, 0.1),
            5.0,
        )
        .unwrap();
        let layout = PanelLayout::single(8, 16).unwrap();
        assert!(matches!(
            FramePump::new(renderer, layout, MemoryDriver::new(128)),
            Err(Error::Config(_))
        ));
    }
}
