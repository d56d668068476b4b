/// LED string drivers
///
/// The pipeline writes packed colors into the driver's per-channel buffer, in
/// wiring order, and asks it to push them out. Real hardware, previews and
/// test doubles all sit behind [`LedDriver`].

use crate::error::{Error, Result};

/// Capabilities the frame pump needs from an LED string
pub trait LedDriver {
    fn init(&mut self) -> Result<()>;

    /// Push the current buffer to the string
    fn render(&mut self) -> Result<()>;

    /// Block until the last render has been transmitted
    fn wait(&mut self) -> Result<()>;

    /// Release the hardware. Called once, after the last render.
    fn finalize(&mut self);

    /// Packed `0xRRGGBB` colors of `channel`, one per element in wiring order
    fn leds(&mut self, channel: usize) -> Result<&mut [u32]>;

    /// Whether the driver wants the pump to stop, e.g. a preview window closed
    fn stop_requested(&mut self) -> bool {
        false
    }
}

/// Driver that keeps the string in memory
///
/// Used for headless runs, the web preview and tests. Every `render` stores
/// a copy of the buffer as the last shown frame.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    channels: Vec<Vec<u32>>,
    shown: Vec<u32>,
    initialized: bool,
    finalized: bool,
    renders: usize,
}

impl MemoryDriver {
    /// A single channel of `led_count` elements
    pub fn new(led_count: usize) -> Self {
        Self::with_channels(&[led_count])
    }

    pub fn with_channels(led_counts: &[usize]) -> Self {
        Self {
            channels: led_counts.iter().map(|&n| vec![0; n]).collect(),
            ..Self::default()
        }
    }

    /// Buffer contents at the last `render`
    pub fn shown(&self) -> &[u32] {
        &self.shown
    }

    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl LedDriver for MemoryDriver {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::Hardware("driver already initialized".to_string()));
        }
        self.initialized = true;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if !self.initialized || self.finalized {
            return Err(Error::Hardware("render on an inactive driver".to_string()));
        }
        if let Some(first) = self.channels.first() {
            self.shown.clone_from(first);
        }
        self.renders += 1;
        Ok(())
    }

    fn wait(&mut self) -> Result<()> {
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalized = true;
    }

    fn leds(&mut self, channel: usize) -> Result<&mut [u32]> {
        let count = self.channels.len();
        self.channels
            .get_mut(channel)
            .map(Vec::as_mut_slice)
            .ok_or_else(|| Error::Hardware(format!("no channel {} (driver has {})", channel, count)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_requires_init() {
        let mut driver = MemoryDriver::new(4);
        assert!(matches!(driver.render(), Err(Error::Hardware(_))));
        driver.init().unwrap();
        driver.leds(0).unwrap()[2] = 0xFF0000;
        driver.render().unwrap();
        assert_eq!(driver.shown(), &[0, 0, 0xFF0000, 0]);
        driver.finalize();
        assert!(driver.render().is_err());
    }

    #[test]
    fn test_unknown_channel() {
        let mut driver = MemoryDriver::with_channels(&[4, 2]);
        assert_eq!(driver.leds(1).unwrap().len(), 2);
        assert!(matches!(driver.leds(2), Err(Error::Hardware(_))));
    }
}
