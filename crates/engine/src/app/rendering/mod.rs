mod renderer;
mod sprites;
mod text;
mod transform;

pub use renderer::Renderer;
pub use sprites::SpriteKeyError;
pub(crate) use sprites::{SpriteLoadError, SpriteStore};
pub use text::text_width;
pub use transform::{screen_to_world_px, world_to_screen_px, UiProjection, UI_HEIGHT, UI_WIDTH};
