//! Packed `0xRRGGBB` colour conversions used by asset metadata and the
//! object colour API.

use glam::Vec3;

/// Unpack `0xRRGGBB` into linear 0..1 channels.
#[must_use]
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32,
        ((hex >> 8) & 0xff) as f32,
        (hex & 0xff) as f32,
    ) / 255.0
}

/// Pack 0..1 channels into `0xRRGGBB`, clamping out-of-range values.
#[must_use]
pub fn hex_from_rgb(rgb: Vec3) -> u32 {
    let c = (rgb.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    ((c.x as u32) << 16) | ((c.y as u32) << 8) | c.z as u32
}

/// Six-digit lowercase hex string without a prefix.
#[must_use]
pub fn hex_string(rgb: Vec3) -> String {
    format!("{:06x}", hex_from_rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_channels() {
        assert_eq!(hex_from_rgb(rgb_from_hex(0x12ab7f)), 0x12ab7f);
        assert_eq!(rgb_from_hex(0xff0000), Vec3::X);
        assert_eq!(hex_string(Vec3::new(2.0, 0.0, 1.0)), "ff00ff");
    }
}
