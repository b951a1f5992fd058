mod draw;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use draw::{DrawCommand, DrawList, Layer, Tint, Transform2D};
pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    screen_to_world_px, text_width, world_to_screen_px, Renderer, SpriteKeyError, UiProjection,
    UI_HEIGHT, UI_WIDTH,
};
pub use scene::{
    Camera2D, InputSnapshot, Scene, SceneCommand, SceneError, SpriteCatalog, Vec2,
};
