use crate::app::{Camera2D, Vec2};

pub const UI_WIDTH: f32 = 240.0;
pub const UI_HEIGHT: f32 = 135.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// World space is y-up and centered on the camera; one world unit is `zoom` pixels.
pub fn world_to_screen(world: Vec2, camera: &Camera2D, viewport: Viewport) -> (f32, f32) {
    let zoom = camera.effective_zoom();
    let x = (world.x - camera.position.x) * zoom + viewport.width as f32 * 0.5;
    let y = viewport.height as f32 * 0.5 - (world.y - camera.position.y) * zoom;
    (x, y)
}

pub fn world_to_screen_px(camera: &Camera2D, window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let viewport = Viewport {
        width: window_size.0,
        height: window_size.1,
    };
    let (x, y) = world_to_screen(world, camera, viewport);
    (x.round() as i32, y.round() as i32)
}

pub fn screen_to_world_px(camera: &Camera2D, window_size: (u32, u32), screen_px: Vec2) -> Vec2 {
    let zoom = camera.effective_zoom();
    Vec2 {
        x: (screen_px.x - window_size.0 as f32 * 0.5) / zoom + camera.position.x,
        y: (window_size.1 as f32 * 0.5 - screen_px.y) / zoom + camera.position.y,
    }
}

/// Orthographic UI space of `UI_WIDTH x UI_HEIGHT`, y-up, stretched over the whole window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiProjection {
    pub width: f32,
    pub height: f32,
}

impl Default for UiProjection {
    fn default() -> Self {
        Self {
            width: UI_WIDTH,
            height: UI_HEIGHT,
        }
    }
}

impl UiProjection {
    pub fn screen_to_ui(&self, screen_px: Vec2, window_size: (u32, u32)) -> Option<Vec2> {
        let (window_width, window_height) = window_size;
        if window_width == 0 || window_height == 0 {
            return None;
        }
        Some(Vec2 {
            x: screen_px.x / window_width as f32 * self.width,
            y: (window_height as f32 - screen_px.y) / window_height as f32 * self.height,
        })
    }

    pub fn ui_to_screen(&self, ui: Vec2, viewport: Viewport) -> (f32, f32) {
        let (scale_x, scale_y) = self.scale(viewport);
        (ui.x * scale_x, viewport.height as f32 - ui.y * scale_y)
    }

    pub fn scale(&self, viewport: Viewport) -> (f32, f32) {
        (
            viewport.width as f32 / self.width,
            viewport.height as f32 / self.height,
        )
    }
}
