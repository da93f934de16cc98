//! RGBA colours and the game palette

use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque colour from a 0xRRGGBB literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 255,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colours, `t` clamped to [0, 1]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Named palette
pub mod palette {
    use super::Color;

    pub const BLACK: Color = Color::hex(0x141728);
    pub const GREY: Color = Color::hex(0x727880);
    pub const VIOLET: Color = Color::hex(0x5C3A93);
    pub const PETROL: Color = Color::hex(0x387487);
    pub const BLUE: Color = Color::hex(0x59C3C3);
    pub const WHITE: Color = Color::hex(0xEBEBEB);
    pub const PINK: Color = Color::hex(0xD154CA);
    pub const DARK_SLATE_GRAY: Color = Color::hex(0x2F4F4F);
    pub const STEEL_BLUE: Color = Color::hex(0x4682B4);
    pub const OLIVE_DRAB: Color = Color::hex(0x6B8E23);
    pub const CORAL: Color = Color::hex(0xFF7F50);
    pub const TEAL: Color = Color::hex(0x008080);
    pub const MEDIUM_PURPLE: Color = Color::hex(0x9370DB);
    pub const LIGHT_SKY_BLUE: Color = Color::hex(0x87CEFA);
    pub const CRIMSON: Color = Color::hex(0x740B20);
    pub const ORANGE_RED: Color = Color::hex(0xFF4500);
    pub const GOLD: Color = Color::hex(0xFFF200);
    pub const DARK_BLUE: Color = Color::hex(0x00008B);
    pub const FOREST_GREEN: Color = Color::hex(0x228B22);

    /// Background colour cycle
    pub const BG_CYCLE: [Color; 5] = [BLACK, DARK_SLATE_GRAY, PETROL, DARK_BLUE, VIOLET];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        let c = Color::hex(0x4682B4);
        assert_eq!((c.r, c.g, c.b, c.a), (0x46, 0x82, 0xB4, 255));
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = palette::BLACK;
        let b = palette::WHITE;
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 5.0), b);
    }
}
