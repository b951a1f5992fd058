use engine::{resolve_app_paths, AppPaths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, TuningError, TUNING_ENV_VAR};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Pirate Survival Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        tuning_override = std::env::var_os(TUNING_ENV_VAR).is_some(),
        assets_dir = %paths.assets_dir.display(),
        "tuning_lookup"
    );
    let tuning = gameplay::load_tuning(&paths.assets_dir)?;

    let config = LoopConfig {
        sprite_keys: gameplay::sprite_keys(),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        paths,
        scene: gameplay::build_scene(tuning),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
