//! Material descriptions for mesh nodes.
//!
//! Materials are plain CPU-side values; the renderer packs them into a
//! uniform each frame. Worlds mutate them freely between frames (the tank's
//! target cycles its hue every frame).

use crate::assets::TextureHandle;

/// RGB color with float components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Build a color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Set this color from hue/saturation/lightness, all in `0.0..=1.0`.
    ///
    /// Hue wraps around; saturation and lightness are clamped.
    pub fn set_hsl(&mut self, h: f32, s: f32, l: f32) {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);

        if s == 0.0 {
            self.r = l;
            self.g = l;
            self.b = l;
            return;
        }

        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        self.r = hue_to_rgb(p, q, h + 1.0 / 3.0);
        self.g = hue_to_rgb(p, q, h);
        self.b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// How a mesh surface is drawn.
#[derive(Clone, Debug)]
pub enum Material {
    /// Unlit surface, optionally textured. Until an async texture arrives the
    /// renderer substitutes a default white pixel.
    Basic {
        color: Color,
        map: Option<TextureHandle>,
    },
    /// Lit surface with a specular highlight.
    Phong {
        color: Color,
        emissive: Color,
        flat_shading: bool,
        double_sided: bool,
    },
    /// Lit surface with stepped (cel) lighting.
    Toon {
        color: Color,
        emissive: Color,
        flat_shading: bool,
    },
    /// Color for line-topology geometry.
    Line { color: Color },
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Material::Basic { color, map: None }
    }

    pub fn phong(color: Color) -> Self {
        Material::Phong {
            color,
            emissive: Color::BLACK,
            flat_shading: false,
            double_sided: false,
        }
    }

    pub fn line(color: Color) -> Self {
        Material::Line { color }
    }

    /// Base color of the material, whatever its kind.
    pub fn color(&self) -> Color {
        match self {
            Material::Basic { color, .. }
            | Material::Phong { color, .. }
            | Material::Toon { color, .. }
            | Material::Line { color } => *color,
        }
    }

    pub fn color_mut(&mut self) -> &mut Color {
        match self {
            Material::Basic { color, .. }
            | Material::Phong { color, .. }
            | Material::Toon { color, .. }
            | Material::Line { color } => color,
        }
    }

    /// Emissive term, black for material kinds without one.
    pub fn emissive(&self) -> Color {
        match self {
            Material::Phong { emissive, .. } | Material::Toon { emissive, .. } => *emissive,
            _ => Color::BLACK,
        }
    }

    pub fn emissive_mut(&mut self) -> Option<&mut Color> {
        match self {
            Material::Phong { emissive, .. } | Material::Toon { emissive, .. } => Some(emissive),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Color, b: Color) {
        assert!(
            (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn hex_unpacks_channels() {
        let c = Color::from_hex(0x44aa88);
        assert!((c.r - 0x44 as f32 / 255.0).abs() < 1e-6);
        assert!((c.g - 0xaa as f32 / 255.0).abs() < 1e-6);
        assert!((c.b - 0x88 as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn zero_saturation_is_grey() {
        let mut c = Color::BLACK;
        c.set_hsl(0.3, 0.0, 0.25);
        assert_eq!(c.to_array(), [0.25, 0.25, 0.25]);
    }

    #[test]
    fn hue_wraps_past_one() {
        // 1.2f32.rem_euclid(1.0) is not bit-equal to 0.2f32
        let mut a = Color::BLACK;
        let mut b = Color::BLACK;
        a.set_hsl(0.2, 1.0, 0.25);
        b.set_hsl(1.2, 1.0, 0.25);
        assert_close(a, b);
    }

    #[test]
    fn primary_hues_land_on_channels() {
        // at h = 0 the blue channel sits on the 2/3 segment boundary, which
        // f32 rounding can push either way
        let mut c = Color::BLACK;
        c.set_hsl(0.0, 1.0, 0.5);
        assert_close(
            c,
            Color {
                r: 1.0,
                g: 0.0,
                b: 0.0,
            },
        );
        c.set_hsl(1.0 / 3.0, 1.0, 0.5);
        assert_close(
            c,
            Color {
                r: 0.0,
                g: 1.0,
                b: 0.0,
            },
        );
    }
}
