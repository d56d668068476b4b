/// ledcube Web - WASM preview of the LED panel
///
/// Runs the full pipeline against an in-memory string and hands JavaScript
/// the packed colors, either in wiring order (what the hardware would
/// receive) or unmapped back to row-major order for drawing on a canvas.
use ledcube_core::{Config, Error, FramePump, LedDriver, MemoryDriver, PanelLayout};
use wasm_bindgen::prelude::*;

fn to_js(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebPanel {
    pump: FramePump<MemoryDriver>,
    layout: PanelLayout,
}

#[wasm_bindgen]
impl WebPanel {
    /// Panel of `width` x `height` LEDs made of tiles `tile_height` tall,
    /// showing the default cube.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, tile_height: u32) -> Result<WebPanel, JsValue> {
        let config = Config {
            width,
            height,
            tile_height: Some(tile_height),
            ..Config::default()
        };
        Self::from_config(&config).map_err(to_js)
    }

    /// Panel described by a RON configuration; the model must be built in
    #[wasm_bindgen(js_name = fromRon)]
    pub fn from_ron(text: &str) -> Result<WebPanel, JsValue> {
        let config = Config::from_ron(text).map_err(to_js)?;
        if config.model.is_some() {
            return Err(JsValue::from_str("model files cannot be loaded in the browser"));
        }
        Self::from_config(&config).map_err(to_js)
    }

    /// Render the frame `elapsed` seconds into the animation
    pub fn render(&mut self, elapsed: f64) -> Result<(), JsValue> {
        self.pump.display(elapsed).map_err(to_js)
    }

    /// Colors as the LED string receives them
    #[wasm_bindgen(js_name = wiringOrder)]
    pub fn wiring_order(&self) -> Vec<u32> {
        self.pump.driver().shown().to_vec()
    }

    /// Colors in row-major raster order
    pub fn pixels(&self) -> Vec<u32> {
        let shown = self.pump.driver().shown();
        let mut pixels = vec![0; self.layout.len()];
        for (index, &color) in shown.iter().enumerate() {
            if let Some((x, y)) = self.layout.coordinates(index) {
                pixels[(y * self.layout.width() + x) as usize] = color;
            }
        }
        pixels
    }

    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.layout.height()
    }
}

impl WebPanel {
    fn from_config(config: &Config) -> ledcube_core::Result<WebPanel> {
        config.validate()?;
        let layout = config.layout()?;
        let renderer = config.renderer(config.load_model()?)?;
        let mut driver = MemoryDriver::new(layout.len());
        driver.init()?;
        Ok(WebPanel {
            pump: FramePump::new(renderer, layout, driver)?,
            layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_unmap_wiring_order() {
        let mut panel = WebPanel::from_config(&Config {
            width: 16,
            height: 16,
            tile_height: Some(8),
            ..Config::default()
        })
        .unwrap();
        panel.pump.display(0.0).unwrap();

        let wiring = panel.wiring_order();
        let pixels = panel.pixels();
        assert_eq!(wiring.len(), 256);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(
                    pixels[(y * 16 + x) as usize],
                    wiring[panel.layout.index(x, y)]
                );
            }
        }
        assert!(pixels.iter().any(|&c| c != 0));
    }

    #[test]
    fn test_rejects_bad_geometry() {
        let config = Config {
            width: 16,
            height: 12,
            tile_height: Some(8),
            ..Config::default()
        };
        assert!(WebPanel::from_config(&config).is_err());
    }
}
