//! Screen-space overlay drawn after the scenes.

use glam::{Mat4, Vec2};

/// Where a sprite is pinned when the drawable resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Keep the sprite's position.
    #[default]
    Free,
    /// Keep the sprite flush with the bottom-right corner.
    BottomRight,
}

/// One overlay image, positioned by its centre in pixels relative to the
/// middle of the drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSprite {
    /// Texture location, resolved by the backend.
    pub texture: String,
    /// Size in pixels.
    pub size: Vec2,
    /// Centre in pixels.
    pub position: Vec2,
    /// Resize behaviour.
    pub anchor: Anchor,
}

/// Orthographic overlay whose units are pixels and whose origin is the
/// centre of the drawable.
#[derive(Debug, Clone, Default)]
pub struct Hud {
    sprites: Vec<HudSprite>,
    size: Vec2,
}

impl Hud {
    /// Whether anything would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Sprites in draw order.
    #[must_use]
    pub fn sprites(&self) -> &[HudSprite] {
        &self.sprites
    }

    /// Add a sprite, placing it for the current size.
    pub fn add_sprite(&mut self, mut sprite: HudSprite) {
        Self::place(&mut sprite, self.size);
        self.sprites.push(sprite);
    }

    /// Add a logo pinned to the bottom-right corner.
    pub fn add_logo(&mut self, texture: impl Into<String>, width: f32, height: f32) {
        self.add_sprite(HudSprite {
            texture: texture.into(),
            size: Vec2::new(width, height),
            position: Vec2::ZERO,
            anchor: Anchor::BottomRight,
        });
    }

    /// Re-anchor sprites for a new drawable size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        for sprite in &mut self.sprites {
            Self::place(sprite, self.size);
        }
    }

    fn place(sprite: &mut HudSprite, size: Vec2) {
        if sprite.anchor == Anchor::BottomRight {
            sprite.position = Vec2::new(
                (size.x - sprite.size.x) / 2.0,
                (-size.y + sprite.size.y) / 2.0,
            );
        }
    }

    /// Projection spanning `[-w/2, w/2] x [-h/2, h/2]`.
    #[must_use]
    pub fn projection(&self) -> Mat4 {
        let half = self.size / 2.0;
        Mat4::orthographic_rh_gl(-half.x, half.x, -half.y, half.y, 1.0, 10.0)
    }
}
