use super::scene::Vec2;

/// Linear RGBA color in `[0, 1]`, multiplied into sprite texels when drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    pub const WHITE: Tint = Tint::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Tint = Tint::rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Tint = Tint::rgba(1.0, 0.0, 0.0, 1.0);
    pub const CLEAR: Tint = Tint::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex_rgba(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgba(channel(24), channel(16), channel(8), channel(0))
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let quantize = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::CLEAR
    }
}

/// Translation-only 2D transform; the translation is the bottom-left corner of a quad.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform2D {
    pub translation: Vec2,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        translation: Vec2::ZERO,
    };

    pub fn from_translation(translation: Vec2) -> Self {
        Self { translation }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            translation: Vec2::new(self.translation.x + dx, self.translation.y + dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// World space, projected through the scene camera.
    World,
    /// Fixed orthographic UI space, see `UiProjection`.
    Ui,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image {
        layer: Layer,
        sprite_key: &'static str,
        transform: Transform2D,
        size: Vec2,
        tint: Tint,
    },
    Rect {
        layer: Layer,
        transform: Transform2D,
        size: Vec2,
        tint: Tint,
    },
    Text {
        layer: Layer,
        transform: Transform2D,
        text: String,
        glyph_height: f32,
        tint: Tint,
    },
}

#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn draw_image_xform(
        &mut self,
        layer: Layer,
        sprite_key: &'static str,
        transform: Transform2D,
        size: Vec2,
        tint: Tint,
    ) {
        self.commands.push(DrawCommand::Image {
            layer,
            sprite_key,
            transform,
            size,
            tint,
        });
    }

    pub fn draw_rect_xform(&mut self, layer: Layer, transform: Transform2D, size: Vec2, tint: Tint) {
        self.commands.push(DrawCommand::Rect {
            layer,
            transform,
            size,
            tint,
        });
    }

    pub fn draw_text(
        &mut self,
        layer: Layer,
        transform: Transform2D,
        text: impl Into<String>,
        glyph_height: f32,
        tint: Tint,
    ) {
        self.commands.push(DrawCommand::Text {
            layer,
            transform,
            text: text.into(),
            glyph_height,
            tint,
        });
    }
}
