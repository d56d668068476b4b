/// Packing of RGB colors into the `0xRRGGBB` words the LED string takes
use image::Rgb;

pub fn pack_rgb8(color: Rgb<u8>) -> u32 {
    let [r, g, b] = color.0;
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Pack 16-bit channels, keeping the high byte of each.
pub fn pack_rgb16(r: u16, g: u16, b: u16) -> u32 {
    pack_rgb8(Rgb([(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8]))
}

pub fn unpack_rgb(packed: u32) -> Rgb<u8> {
    Rgb([(packed >> 16) as u8, (packed >> 8) as u8, packed as u8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rgb16_takes_high_bytes() {
        assert_eq!(pack_rgb16(0xFFFF, 0x8000, 0x0000), 0xFF8000);
        assert_eq!(pack_rgb16(0x12FF, 0x3400, 0x56AB), 0x123456);
    }

    #[test]
    fn test_pack_rgb8_layout() {
        assert_eq!(pack_rgb8(Rgb([0xFF, 0, 0])), 0xFF0000);
        assert_eq!(pack_rgb8(Rgb([0, 0xFF, 0])), 0x00FF00);
        assert_eq!(pack_rgb8(Rgb([0, 0, 0xFF])), 0x0000FF);
        assert_eq!(unpack_rgb(0xAB12CD), Rgb([0xAB, 0x12, 0xCD]));
    }
}
