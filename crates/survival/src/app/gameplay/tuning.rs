use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::hud::HudLayoutMode;
use super::interaction::{SelectionParams, SelectionTieBreak};
use super::world::MAX_ENTITY_COUNT;

pub(crate) const TUNING_ENV_VAR: &str = "SURVIVAL_TUNING";
const DEFAULT_TUNING_FILE: &str = "tuning.json";
/// Upper bound on pool slots; the pool is allocated up front.
const CAPACITY_CEILING: usize = 1 << 16;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameTuning {
    pub(crate) selection_radius: f32,
    pub(crate) pickup_radius: f32,
    pub(crate) player_speed: f32,
    pub(crate) camera_follow_rate: f32,
    pub(crate) camera_zoom: f32,
    pub(crate) rock_health: i32,
    pub(crate) tree_health: i32,
    pub(crate) bush_health: i32,
    pub(crate) rock0_count: u32,
    pub(crate) rock1_count: u32,
    pub(crate) tree_count: u32,
    pub(crate) bush_count: u32,
    pub(crate) world_half_extent: f32,
    pub(crate) world_seed: u64,
    pub(crate) selection_tie_break: SelectionTieBreak,
    pub(crate) hud_layout: HudLayoutMode,
    pub(crate) entity_capacity: usize,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            selection_radius: 100.0,
            pickup_radius: 20.0,
            player_speed: 100.0,
            camera_follow_rate: 30.0,
            camera_zoom: 5.3,
            rock_health: 3,
            tree_health: 3,
            bush_health: 2,
            rock0_count: 29,
            rock1_count: 29,
            tree_count: 99,
            bush_count: 40,
            world_half_extent: 500.0,
            world_seed: 0x5eed,
            selection_tie_break: SelectionTieBreak::default(),
            hud_layout: HudLayoutMode::default(),
            entity_capacity: MAX_ENTITY_COUNT,
        }
    }
}

impl GameTuning {
    pub(crate) fn selection_params(&self) -> SelectionParams {
        SelectionParams {
            selection_radius: self.selection_radius,
            tie_break: self.selection_tie_break,
        }
    }

    /// Player plus every configured resource.
    pub(crate) fn initial_entity_count(&self) -> usize {
        1 + [
            self.rock0_count,
            self.rock1_count,
            self.tree_count,
            self.bush_count,
        ]
        .iter()
        .map(|count| *count as usize)
        .sum::<usize>()
    }

    fn validate(&self) -> Result<(), TuningError> {
        let non_negative = [
            ("selection_radius", self.selection_radius),
            ("pickup_radius", self.pickup_radius),
            ("player_speed", self.player_speed),
            ("camera_follow_rate", self.camera_follow_rate),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("expected a finite value >= 0, got {value}"),
                });
            }
        }
        if !self.world_half_extent.is_finite() || self.world_half_extent <= 0.0 {
            return Err(TuningError::Invalid {
                field: "world_half_extent",
                reason: format!("expected a finite value > 0, got {}", self.world_half_extent),
            });
        }
        if !self.camera_zoom.is_finite() || self.camera_zoom <= 0.0 {
            return Err(TuningError::Invalid {
                field: "camera_zoom",
                reason: format!("expected a finite value > 0, got {}", self.camera_zoom),
            });
        }
        let healths = [
            ("rock_health", self.rock_health),
            ("tree_health", self.tree_health),
            ("bush_health", self.bush_health),
        ];
        for (field, value) in healths {
            if value < 1 {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("expected a value >= 1, got {value}"),
                });
            }
        }
        if self.entity_capacity == 0 || self.entity_capacity > CAPACITY_CEILING {
            return Err(TuningError::Invalid {
                field: "entity_capacity",
                reason: format!(
                    "expected between 1 and {CAPACITY_CEILING} slots, got {}",
                    self.entity_capacity
                ),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reads tuning from `SURVIVAL_TUNING` when set, otherwise from `assets/base/tuning.json`.
/// A missing default file is not an error; a missing explicit file is.
pub(crate) fn load_tuning(assets_dir: &Path) -> Result<GameTuning, TuningError> {
    match env::var(TUNING_ENV_VAR) {
        Ok(value) => load_tuning_file(Path::new(&value)),
        Err(env::VarError::NotPresent) => {
            let path = assets_dir.join("base").join(DEFAULT_TUNING_FILE);
            if !path.is_file() {
                info!(path = %path.display(), "tuning_defaults_used");
                return Ok(GameTuning::default());
            }
            load_tuning_file(&path)
        }
        Err(source) => Err(TuningError::EnvVar {
            var: TUNING_ENV_VAR,
            source,
        }),
    }
}

pub(crate) fn load_tuning_file(path: &Path) -> Result<GameTuning, TuningError> {
    let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning = parse_tuning(&raw, path)?;
    tuning.validate()?;
    info!(
        path = %path.display(),
        entity_capacity = tuning.entity_capacity,
        world_seed = tuning.world_seed,
        "tuning_loaded"
    );
    Ok(tuning)
}

fn parse_tuning(raw: &str, path: &Path) -> Result<GameTuning, TuningError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameTuning>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        TuningError::Parse {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}
