//! Light descriptions attached to scene nodes.

use crate::material::Color;

/// Orthographic frustum a shadow-casting directional light would render from.
///
/// Shadow map rendering itself is not part of this crate's renderer; the
/// parameters are kept as part of the scene description so a world can state
/// its lighting intent in full.
#[derive(Clone, Copy, Debug)]
pub struct ShadowProjection {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub bias: f32,
    pub map_size: [u32; 2],
}

impl Default for ShadowProjection {
    fn default() -> Self {
        Self {
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            near: 0.5,
            far: 500.0,
            bias: 0.0,
            map_size: [512, 512],
        }
    }
}

/// A light source. Its position comes from the owning node's transform.
#[derive(Clone, Debug)]
pub enum Light {
    /// Parallel rays aimed from the node position toward the target.
    Directional {
        color: Color,
        intensity: f32,
        target: cgmath::Vector3<f32>,
        cast_shadow: bool,
        shadow: ShadowProjection,
    },
    /// Omnidirectional point source with distance falloff.
    Point { color: Color, intensity: f32 },
}

impl Light {
    /// White directional light aimed at the origin, no shadows.
    pub fn directional(intensity: f32) -> Self {
        Light::Directional {
            color: Color::WHITE,
            intensity,
            target: cgmath::Vector3::new(0.0, 0.0, 0.0),
            cast_shadow: false,
            shadow: ShadowProjection::default(),
        }
    }

    /// White point light.
    pub fn point(intensity: f32) -> Self {
        Light::Point {
            color: Color::WHITE,
            intensity,
        }
    }
}
