mod archetype;
mod hud;
mod interaction;
mod math;
mod scene;
mod tuning;
mod world;


use engine::Scene;

pub(crate) use tuning::{load_tuning, GameTuning, TuningError, TUNING_ENV_VAR};

pub(crate) fn build_scene(tuning: GameTuning) -> Box<dyn Scene> {
    Box::new(scene::SurvivalScene::new(tuning))
}

/// Every sprite the scene draws; loaded by the engine before the first frame.
pub(crate) fn sprite_keys() -> Vec<&'static str> {
    archetype::SpriteId::loadable_keys()
}
