use std::collections::HashSet;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use super::sprites::{LoadedSprite, SpriteStore};
use super::text::{glyph_for, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::transform::{world_to_screen, UiProjection, Viewport};
use crate::app::{Camera2D, DrawCommand, DrawList, Layer, SpriteCatalog, Tint, Transform2D, Vec2};

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprites: SpriteStore,
    ui: UiProjection,
    clear_color: [u8; 4],
    warned_missing_sprite_keys: HashSet<&'static str>,
}

impl Renderer {
    pub(crate) fn new(
        window: Arc<Window>,
        sprites: SpriteStore,
        clear_color: Tint,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            sprites,
            ui: UiProjection::default(),
            clear_color: clear_color.to_rgba8(),
            warned_missing_sprite_keys: HashSet::new(),
        })
    }

    pub fn sprite_catalog(&self) -> SpriteCatalog {
        self.sprites.catalog()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render(&mut self, camera: &Camera2D, draw: &DrawList) -> Result<(), Error> {
        if self.viewport.is_empty() {
            return Ok(());
        }
        let frame = self.pixels.frame_mut();
        clear_frame(frame, self.clear_color);
        let target = RasterTarget {
            viewport: self.viewport,
            camera: *camera,
            ui: self.ui,
        };
        for command in draw.commands() {
            rasterize_command(
                frame,
                &target,
                &self.sprites,
                command,
                &mut self.warned_missing_sprite_keys,
            );
        }
        self.pixels.render()
    }
}

#[derive(Debug, Clone, Copy)]
struct RasterTarget {
    viewport: Viewport,
    camera: Camera2D,
    ui: UiProjection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenRect {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSpan {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl ScreenRect {
    /// Pixels whose centers fall inside the rect, clipped to the viewport.
    fn pixel_span(&self, viewport: Viewport) -> Option<PixelSpan> {
        let span = PixelSpan {
            left: (self.left.round() as i32).max(0),
            top: (self.top.round() as i32).max(0),
            right: ((self.left + self.width).round() as i32).min(viewport.width as i32),
            bottom: ((self.top + self.height).round() as i32).min(viewport.height as i32),
        };
        (span.left < span.right && span.top < span.bottom).then_some(span)
    }
}

fn clear_frame(frame: &mut [u8], color: [u8; 4]) {
    for pixel in frame.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
}

/// Projects a quad whose bottom-left corner is `transform.translation`.
fn project_rect(target: &RasterTarget, layer: Layer, transform: Transform2D, size: Vec2) -> ScreenRect {
    let top_left = Vec2::new(transform.translation.x, transform.translation.y + size.y);
    match layer {
        Layer::World => {
            let (left, top) = world_to_screen(top_left, &target.camera, target.viewport);
            let zoom = target.camera.effective_zoom();
            ScreenRect {
                left,
                top,
                width: size.x * zoom,
                height: size.y * zoom,
            }
        }
        Layer::Ui => {
            let (left, top) = target.ui.ui_to_screen(top_left, target.viewport);
            let (scale_x, scale_y) = target.ui.scale(target.viewport);
            ScreenRect {
                left,
                top,
                width: size.x * scale_x,
                height: size.y * scale_y,
            }
        }
    }
}

fn rasterize_command(
    frame: &mut [u8],
    target: &RasterTarget,
    sprites: &SpriteStore,
    command: &DrawCommand,
    warned_missing_sprite_keys: &mut HashSet<&'static str>,
) {
    match command {
        DrawCommand::Image {
            layer,
            sprite_key,
            transform,
            size,
            tint,
        } => {
            let Some(sprite) = sprites.get(sprite_key) else {
                if warned_missing_sprite_keys.insert(*sprite_key) {
                    warn!(sprite_key, "sprite_not_loaded");
                }
                return;
            };
            let rect = project_rect(target, *layer, *transform, *size);
            draw_sprite_scaled(frame, target.viewport, rect, sprite, *tint);
        }
        DrawCommand::Rect {
            layer,
            transform,
            size,
            tint,
        } => {
            let rect = project_rect(target, *layer, *transform, *size);
            fill_rect(frame, target.viewport, rect, *tint);
        }
        DrawCommand::Text {
            layer,
            transform,
            text,
            glyph_height,
            tint,
        } => draw_text(frame, target, *layer, *transform, text, *glyph_height, *tint),
    }
}

fn draw_sprite_scaled(
    frame: &mut [u8],
    viewport: Viewport,
    rect: ScreenRect,
    sprite: &LoadedSprite,
    tint: Tint,
) {
    if sprite.width == 0 || sprite.height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
        return;
    }
    let Some(span) = rect.pixel_span(viewport) else {
        return;
    };

    for out_y in span.top..span.bottom {
        let v = (out_y as f32 + 0.5 - rect.top) / rect.height;
        let src_y = (v * sprite.height as f32).floor().max(0.0) as u32;
        for out_x in span.left..span.right {
            let u = (out_x as f32 + 0.5 - rect.left) / rect.width;
            let src_x = (u * sprite.width as f32).floor().max(0.0) as u32;
            let texel = sprite.texel(src_x, src_y);
            if texel[3] == 0 {
                continue;
            }
            blend_pixel(frame, viewport.width as usize, out_x, out_y, modulate(texel, tint));
        }
    }
}

fn fill_rect(frame: &mut [u8], viewport: Viewport, rect: ScreenRect, tint: Tint) {
    let Some(span) = rect.pixel_span(viewport) else {
        return;
    };
    let color = [tint.r, tint.g, tint.b, tint.a];
    for y in span.top..span.bottom {
        for x in span.left..span.right {
            blend_pixel(frame, viewport.width as usize, x, y, color);
        }
    }
}

/// Text anchored at its bottom-left; `glyph_height` is in layer units.
fn draw_text(
    frame: &mut [u8],
    target: &RasterTarget,
    layer: Layer,
    transform: Transform2D,
    text: &str,
    glyph_height: f32,
    tint: Tint,
) {
    if glyph_height <= 0.0 {
        return;
    }
    let cell = glyph_height / GLYPH_HEIGHT as f32;
    let cell_size = Vec2::new(cell, cell);
    for (index, ch) in text.chars().enumerate() {
        let glyph = glyph_for(ch);
        let origin_cells = index as i32 * GLYPH_ADVANCE;
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyph.is_set(col, row) {
                    continue;
                }
                let cell_transform = transform.translated(
                    (origin_cells + col) as f32 * cell,
                    (GLYPH_HEIGHT - 1 - row) as f32 * cell,
                );
                let rect = project_rect(target, layer, cell_transform, cell_size);
                fill_rect(frame, target.viewport, rect, tint);
            }
        }
    }
}

fn modulate(texel: [u8; 4], tint: Tint) -> [f32; 4] {
    let channel = |value: u8| value as f32 / 255.0;
    [
        channel(texel[0]) * tint.r,
        channel(texel[1]) * tint.g,
        channel(texel[2]) * tint.b,
        channel(texel[3]) * tint.a,
    ]
}

/// Source-over blend of a straight-alpha color in `[0, 1]` onto an opaque frame.
fn blend_pixel(frame: &mut [u8], width: usize, x: i32, y: i32, color: [f32; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let alpha = color[3].clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(dst) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    for (channel, src) in dst.iter_mut().take(3).zip(color) {
        let blended = src.clamp(0.0, 1.0) * 255.0 * alpha + *channel as f32 * (1.0 - alpha);
        *channel = blended.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 240,
        height: 135,
    };

    fn target(camera: Camera2D) -> RasterTarget {
        RasterTarget {
            viewport: VIEWPORT,
            camera,
            ui: UiProjection::default(),
        }
    }

    fn blank_frame() -> Vec<u8> {
        let mut frame = vec![0; (VIEWPORT.width * VIEWPORT.height * 4) as usize];
        clear_frame(&mut frame, [0x18, 0x18, 0x18, 0xff]);
        frame
    }

    fn pixel(frame: &[u8], x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * VIEWPORT.width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn render(camera: Camera2D, sprites: &SpriteStore, draw: &DrawList) -> Vec<u8> {
        let mut frame = blank_frame();
        let mut warned = HashSet::new();
        for command in draw.commands() {
            rasterize_command(&mut frame, &target(camera), sprites, command, &mut warned);
        }
        frame
    }

    #[test]
    fn ui_rect_is_y_up_from_bottom_left() {
        let mut draw = DrawList::default();
        draw.draw_rect_xform(
            Layer::Ui,
            Transform2D::IDENTITY.translated(10.0, 0.0),
            Vec2::new(4.0, 2.0),
            Tint::WHITE,
        );
        let frame = render(Camera2D::default(), &SpriteStore::default(), &draw);

        assert_eq!(pixel(&frame, 10, 134), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 13, 133), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 14, 134), [0x18, 0x18, 0x18, 0xff]);
        assert_eq!(pixel(&frame, 10, 132), [0x18, 0x18, 0x18, 0xff]);
    }

    #[test]
    fn world_image_is_scaled_by_zoom_and_tinted() {
        let mut sprites = SpriteStore::default();
        sprites.insert(
            "rock0",
            LoadedSprite {
                width: 1,
                height: 1,
                rgba: vec![200, 100, 50, 255],
            },
        );
        let camera = Camera2D {
            position: Vec2::ZERO,
            zoom: 2.0,
        };
        let mut draw = DrawList::default();
        draw.draw_image_xform(
            Layer::World,
            "rock0",
            Transform2D::IDENTITY,
            Vec2::new(3.0, 3.0),
            Tint::rgba(0.5, 1.0, 1.0, 1.0),
        );
        let frame = render(camera, &sprites, &draw);

        // Bottom-left at the viewport center, 6x6 pixels extending up and right.
        assert_eq!(pixel(&frame, 120, 62), [100, 100, 50, 255]);
        assert_eq!(pixel(&frame, 125, 67), [100, 100, 50, 255]);
        assert_eq!(pixel(&frame, 126, 67), [0x18, 0x18, 0x18, 0xff]);
        assert_eq!(pixel(&frame, 120, 61), [0x18, 0x18, 0x18, 0xff]);
    }

    #[test]
    fn half_alpha_rect_blends_with_background() {
        let mut draw = DrawList::default();
        draw.draw_rect_xform(
            Layer::Ui,
            Transform2D::IDENTITY,
            Vec2::new(1.0, 1.0),
            Tint::rgba(1.0, 1.0, 1.0, 0.5),
        );
        let frame = render(Camera2D::default(), &SpriteStore::default(), &draw);
        let blended = pixel(&frame, 0, 134);
        assert_eq!(blended[0], 140);
        assert_eq!(blended[3], 255);
    }

    #[test]
    fn transparent_texels_are_skipped() {
        let mut sprites = SpriteStore::default();
        sprites.insert(
            "player",
            LoadedSprite {
                width: 1,
                height: 1,
                rgba: vec![255, 0, 0, 0],
            },
        );
        let mut draw = DrawList::default();
        draw.draw_image_xform(
            Layer::Ui,
            "player",
            Transform2D::IDENTITY,
            Vec2::new(8.0, 8.0),
            Tint::WHITE,
        );
        let frame = render(Camera2D::default(), &sprites, &draw);
        assert_eq!(pixel(&frame, 2, 130), [0x18, 0x18, 0x18, 0xff]);
    }

    #[test]
    fn unknown_sprite_draws_nothing_and_warns_once() {
        let mut frame = blank_frame();
        let mut warned = HashSet::new();
        let command = DrawCommand::Image {
            layer: Layer::Ui,
            sprite_key: "tree0",
            transform: Transform2D::IDENTITY,
            size: Vec2::new(8.0, 8.0),
            tint: Tint::WHITE,
        };
        let sprites = SpriteStore::default();
        let target = target(Camera2D::default());
        rasterize_command(&mut frame, &target, &sprites, &command, &mut warned);
        rasterize_command(&mut frame, &target, &sprites, &command, &mut warned);

        assert_eq!(warned.len(), 1);
        assert!(frame == blank_frame());
    }

    #[test]
    fn text_sets_glyph_cells() {
        let mut draw = DrawList::default();
        draw.draw_text(Layer::Ui, Transform2D::IDENTITY, "I", 5.0, Tint::WHITE);
        let frame = render(Camera2D::default(), &SpriteStore::default(), &draw);

        // 'I' top row is full, middle row only has the center column.
        assert_eq!(pixel(&frame, 0, 130), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 2, 130), [255, 255, 255, 255]);
        assert_eq!(pixel(&frame, 0, 132), [0x18, 0x18, 0x18, 0xff]);
        assert_eq!(pixel(&frame, 1, 132), [255, 255, 255, 255]);
    }

    #[test]
    fn offscreen_rect_is_clipped() {
        let rect = ScreenRect {
            left: -20.0,
            top: -20.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(rect.pixel_span(VIEWPORT), None);

        let partial = ScreenRect {
            left: 235.0,
            top: 130.0,
            width: 10.0,
            height: 10.0,
        };
        assert_eq!(
            partial.pixel_span(VIEWPORT),
            Some(PixelSpan {
                left: 235,
                top: 130,
                right: 240,
                bottom: 135,
            })
        );
    }
}
