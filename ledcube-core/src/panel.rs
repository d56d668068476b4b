/// Raster coordinates to LED string positions
///
/// Panels are wired column by column in a serpentine: down column 0, up
/// column 1, down column 2 and so on. Taller surfaces are built by stacking
/// identical panels vertically, each one continuing the string where the
/// previous one ended.
///
/// Tiles placed side by side are not supported. A layout whose tile width
/// differs from the surface width is rejected when it is built.

use crate::error::{Error, Result};

/// Serpentine index of `(x, y)` within a single panel `h` elements tall.
pub fn serpentine_index(x: u32, y: u32, h: u32) -> usize {
    let column = x as usize * h as usize;
    if x % 2 == 0 {
        column + y as usize
    } else {
        column + (h - 1 - y) as usize
    }
}

/// Geometry of a surface made of vertically stacked serpentine tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl PanelLayout {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Config(format!(
                "panel dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(Error::Config(format!(
                "tile dimensions must be positive, got {}x{}",
                tile_width, tile_height
            )));
        }
        if tile_width != width {
            return Err(Error::Config(format!(
                "tile width {} differs from panel width {}: only vertically stacked tiles are supported",
                tile_width, width
            )));
        }
        if height % tile_height != 0 {
            return Err(Error::Config(format!(
                "panel height {} is not a multiple of tile height {}",
                height, tile_height
            )));
        }
        let layout = Self {
            width,
            height,
            tile_width,
            tile_height,
        };
        log::debug!(
            "panel layout {}x{} made of {} tile(s) of {}x{}",
            width,
            height,
            layout.tiles(),
            tile_width,
            tile_height
        );
        Ok(layout)
    }

    /// A single untiled panel
    pub fn single(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn tiles(&self) -> u32 {
        self.height / self.tile_height
    }

    /// Number of addressed elements
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position in the LED string of raster pixel `(x, y)`
    pub fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        let (dw, dh) = (self.tile_width, self.tile_height);
        let local = serpentine_index(x % dw, y % dh, dh);
        let tile_size = dw as usize * dh as usize;
        local + tile_size * (y / dh) as usize
    }

    /// Raster pixel driven by the LED at `index`, the inverse of [`index`].
    ///
    /// [`index`]: PanelLayout::index
    pub fn coordinates(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.len() {
            return None;
        }
        let dh = self.tile_height as usize;
        let tile_size = self.tile_width as usize * dh;
        let (tile, local) = (index / tile_size, index % tile_size);
        let (x, offset) = (local / dh, local % dh);
        let y_local = if x % 2 == 0 { offset } else { dh - 1 - offset };
        Some((x as u32, (tile * dh + y_local) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_bijection(layout: &PanelLayout) {
        let mut seen = vec![false; layout.len()];
        for y in 0..layout.height() {
            for x in 0..layout.width() {
                let i = layout.index(x, y);
                assert!(i < layout.len(), "({}, {}) -> {} out of range", x, y, i);
                assert!(!seen[i], "({}, {}) -> {} collides", x, y, i);
                seen[i] = true;
                assert_eq!(layout.coordinates(i), Some((x, y)));
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_single_panel_bijection() {
        for (w, h) in [(1, 1), (1, 7), (5, 1), (32, 16), (7, 3)] {
            assert_bijection(&PanelLayout::single(w, h).unwrap());
        }
    }

    #[test]
    fn test_tiled_bijection() {
        assert_bijection(&PanelLayout::new(32, 16, 32, 8).unwrap());
        assert_bijection(&PanelLayout::new(8, 24, 8, 8).unwrap());
        assert_bijection(&PanelLayout::new(3, 10, 3, 2).unwrap());
    }

    #[test]
    fn test_serpentine_symmetry() {
        let h = 16;
        let layout = PanelLayout::single(32, h).unwrap();
        for x in 0..32u32 {
            let base = x as usize * h as usize;
            if x % 2 == 0 {
                assert_eq!(layout.index(x, 0), base);
                assert_eq!(layout.index(x, h - 1), base + (h as usize - 1));
            } else {
                assert_eq!(layout.index(x, 0), base + (h as usize - 1));
                assert_eq!(layout.index(x, h - 1), base);
            }
        }
    }

    #[test]
    fn test_tiles_continue_the_string() {
        // 32x16 surface of two 32x8 panels, as on the original hardware.
        let layout = PanelLayout::new(32, 16, 32, 8).unwrap();
        assert_eq!(layout.index(0, 0), 0);
        assert_eq!(layout.index(0, 7), 7);
        assert_eq!(layout.index(1, 7), 8);
        assert_eq!(layout.index(1, 0), 15);
        assert_eq!(layout.index(31, 0), 255);
        assert_eq!(layout.index(0, 8), 256);
        assert_eq!(layout.index(1, 8), 256 + 15);
        assert_eq!(layout.index(31, 15), 256 + 31 * 8);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        assert!(matches!(PanelLayout::single(0, 8), Err(Error::Config(_))));
        assert!(matches!(PanelLayout::new(8, 8, 8, 0), Err(Error::Config(_))));
        assert!(matches!(PanelLayout::new(8, 12, 8, 8), Err(Error::Config(_))));
        // Side-by-side tiles would collide.
        assert!(matches!(PanelLayout::new(16, 8, 8, 8), Err(Error::Config(_))));
    }

    #[test]
    fn test_coordinates_out_of_range() {
        let layout = PanelLayout::single(4, 4).unwrap();
        assert_eq!(layout.coordinates(16), None);
        assert_eq!(layout.coordinates(15), Some((3, 0)));
    }
}
