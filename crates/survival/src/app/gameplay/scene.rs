use engine::{
    screen_to_world_px, text_width, Camera2D, DrawList, InputAction, InputSnapshot, Layer, Scene,
    SceneCommand, SceneError, SpriteCatalog, Tint, Transform2D, UiProjection, Vec2,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info};

use super::archetype::{item_sprite_for, Archetype, ArchetypeRegistry, SpriteSizes};
use super::hud::{compute_layout, update_hover, HudLayout, HUD_ICON_SIZE, HUD_ROW_Y};
use super::interaction::{
    activation_pass, pickup_pass, selection_pass, ActivationOutcome, WorldFrame,
};
use super::math::{animate_v2_to_target, round_v2_to_tile, sin_breathe, TILE_WIDTH};
use super::tuning::GameTuning;
use super::world::{EntityHandle, World};

const ITEM_BOB_AMPLITUDE: f32 = 2.0;
const ITEM_BOB_RATE: f32 = 5.0;
const HUD_BOUNCE_AMPLITUDE: f32 = 2.0;
const HUD_BOUNCE_RATE: f32 = 8.0;
const HUD_LABEL_GLYPH_HEIGHT: f32 = 5.0;
const HUD_LABEL_GAP: f32 = 3.0;

const HUD_SLOT_TINT: Tint = Tint::BLACK;
const HUD_SLOT_HOVER_TINT: Tint = Tint::rgba(0.3, 0.3, 0.3, 1.0);
const HUD_PANEL_TINT: Tint = Tint::rgba(0.0, 0.0, 0.0, 0.5);
const HUD_LABEL_TINT: Tint = Tint::WHITE;

/// Everything the simulation mutates, created in `load` and dropped in `unload`.
#[derive(Debug)]
pub(crate) struct SimContext {
    pub(crate) world: World,
    pub(crate) sprite_sizes: SpriteSizes,
    pub(crate) frame: WorldFrame,
    pub(crate) player: EntityHandle,
    pub(crate) camera: Camera2D,
    pub(crate) elapsed_seconds: f32,
    pub(crate) hud: HudLayout,
}

impl SimContext {
    pub(crate) fn player_position(&self) -> Option<Vec2> {
        self.world.get(self.player).map(|entity| entity.position)
    }
}

pub(crate) struct SurvivalScene {
    tuning: GameTuning,
    registry: ArchetypeRegistry,
    sim: Option<SimContext>,
}

impl SurvivalScene {
    pub(crate) fn new(tuning: GameTuning) -> Self {
        let registry = ArchetypeRegistry::new(&tuning);
        Self {
            tuning,
            registry,
            sim: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn sim(&self) -> Option<&SimContext> {
        self.sim.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn sim_mut(&mut self) -> Option<&mut SimContext> {
        self.sim.as_mut()
    }

    fn default_camera(&self) -> Camera2D {
        let mut camera = Camera2D::default();
        camera.set_zoom_clamped(self.tuning.camera_zoom);
        camera
    }
}

/// Spawns the player at the origin, then every resource group at seeded tile-snapped positions.
pub(crate) fn populate_world(
    world: &mut World,
    registry: &ArchetypeRegistry,
    tuning: &GameTuning,
) -> Result<EntityHandle, SceneError> {
    let descriptor = |archetype: Archetype| {
        registry.descriptor_for(archetype).ok_or_else(|| {
            SceneError::MissingContent(format!("no descriptor for archetype {archetype:?}"))
        })
    };

    let required = tuning.initial_entity_count();
    if required > world.capacity() {
        return Err(SceneError::ResourceExhausted(format!(
            "tuning spawns {required} entities but the pool holds {}",
            world.capacity()
        )));
    }

    let player = world.create_from(descriptor(Archetype::Player)?, Vec2::ZERO)?;

    let extent = tuning.world_half_extent.abs();
    let mut rng = ChaCha8Rng::seed_from_u64(tuning.world_seed);
    let groups = [
        (Archetype::Rock0, tuning.rock0_count),
        (Archetype::Rock1, tuning.rock1_count),
        (Archetype::Tree, tuning.tree_count),
        (Archetype::Bush0, tuning.bush_count),
    ];
    for (archetype, count) in groups {
        let resource = descriptor(archetype)?;
        for _ in 0..count {
            let position = Vec2::new(
                rng.gen_range(-extent..=extent),
                rng.gen_range(-extent..=extent),
            );
            world.create_from(resource, round_v2_to_tile(position))?;
        }
    }
    Ok(player)
}

fn movement_axis(input: &InputSnapshot) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if input.is_down(InputAction::MoveUp) {
        axis.y += 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        axis.y -= 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        axis.x -= 1.0;
    }
    if input.is_down(InputAction::MoveRight) {
        axis.x += 1.0;
    }
    axis.normalize_or_zero()
}

fn hud_label(archetype: Archetype, amount: u32) -> String {
    format!("{} x{}", archetype.display_name(), amount)
}

impl Scene for SurvivalScene {
    fn load(&mut self, sprites: &SpriteCatalog) -> Result<(), SceneError> {
        let sprite_sizes = SpriteSizes::from_catalog(sprites)?;
        let mut world = World::with_capacity(self.tuning.entity_capacity);
        let player = populate_world(&mut world, &self.registry, &self.tuning)?;

        info!(
            entity_count = world.valid_count(),
            capacity = world.capacity(),
            seed = self.tuning.world_seed,
            "scene_loaded"
        );
        self.sim = Some(SimContext {
            world,
            sprite_sizes,
            frame: WorldFrame::default(),
            player,
            camera: self.default_camera(),
            elapsed_seconds: 0.0,
            hud: HudLayout::default(),
        });
        Ok(())
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let Some(sim) = self.sim.as_mut() else {
            return SceneCommand::None;
        };
        sim.elapsed_seconds += fixed_dt_seconds;
        sim.frame = WorldFrame::default();

        let Some(player_position) = sim.player_position() else {
            return SceneCommand::Abort {
                reason: "player entity is no longer valid".to_string(),
            };
        };

        animate_v2_to_target(
            &mut sim.camera.position,
            player_position,
            fixed_dt_seconds,
            self.tuning.camera_follow_rate,
        );

        let window_size = input.window_size();
        let pointer_world = input
            .cursor_position_px()
            .map(|cursor| screen_to_world_px(&sim.camera, window_size, cursor));

        sim.frame = selection_pass(
            &mut sim.world,
            &sim.sprite_sizes,
            player_position,
            pointer_world,
            self.tuning.selection_params(),
        );

        match activation_pass(
            &mut sim.world,
            &self.registry,
            &sim.frame,
            input.primary_pressed(),
        ) {
            Ok(ActivationOutcome::None) => {}
            Ok(ActivationOutcome::Damaged { handle, remaining }) => {
                debug!(slot = handle.index, remaining, "entity_damaged");
            }
            Ok(ActivationOutcome::Destroyed {
                archetype,
                position,
                drop,
            }) => {
                info!(
                    archetype = ?archetype,
                    x = position.x,
                    y = position.y,
                    dropped = drop.is_some(),
                    "entity_destroyed"
                );
            }
            Err(err) => {
                error!(error = %err, "entity_pool_exhausted");
                return SceneCommand::Abort {
                    reason: err.to_string(),
                };
            }
        }

        pickup_pass(&mut sim.world, player_position, self.tuning.pickup_radius);

        let mut hud = compute_layout(&sim.world, self.tuning.hud_layout);
        let pointer_ui = input
            .cursor_position_px()
            .and_then(|cursor| UiProjection::default().screen_to_ui(cursor, window_size));
        update_hover(&mut sim.world, &mut hud, pointer_ui);
        sim.hud = hud;

        let step = movement_axis(input) * (self.tuning.player_speed * fixed_dt_seconds);
        if let Some(player) = sim.world.get_mut(sim.player) {
            player.position = player.position + step;
        }

        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        SceneCommand::None
    }

    fn render(&mut self, draw: &mut DrawList) {
        let Some(sim) = self.sim.as_ref() else {
            return;
        };

        let bob = ITEM_BOB_AMPLITUDE * sin_breathe(sim.elapsed_seconds, ITEM_BOB_RATE);
        for (_, entity) in sim.world.iter_valid() {
            let Some(sprite_key) = entity.sprite.key() else {
                continue;
            };
            let size = sim.sprite_sizes.size_of(entity.sprite);
            let mut xform = Transform2D::IDENTITY
                .translated(0.0, -(TILE_WIDTH as f32) * 0.5)
                .translated(entity.position.x, entity.position.y)
                .translated(-size.x * 0.5, 0.0);
            if entity.is_item {
                xform = xform.translated(0.0, bob);
            }
            draw.draw_image_xform(Layer::World, sprite_key, xform, size, entity.color);
        }

        if sim.hud.item_count == 0 {
            return;
        }
        if let Some(panel) = sim.hud.panel {
            draw.draw_rect_xform(
                Layer::Ui,
                Transform2D::from_translation(panel.min),
                panel.size,
                HUD_PANEL_TINT,
            );
        }

        let icon_size = Vec2::new(HUD_ICON_SIZE, HUD_ICON_SIZE);
        let bounce = HUD_BOUNCE_AMPLITUDE * sin_breathe(sim.elapsed_seconds, HUD_BOUNCE_RATE);
        for slot in &sim.hud.slots {
            let background = if slot.hovered {
                HUD_SLOT_HOVER_TINT
            } else {
                HUD_SLOT_TINT
            };
            draw.draw_rect_xform(
                Layer::Ui,
                Transform2D::from_translation(slot.rect.min),
                slot.rect.size,
                background,
            );

            let Some(icon_key) = item_sprite_for(slot.archetype).key() else {
                continue;
            };
            let mut icon_xform = Transform2D::from_translation(slot.rect.min);
            if slot.hovered {
                icon_xform = icon_xform.translated(0.0, bounce);
            }
            draw.draw_image_xform(Layer::Ui, icon_key, icon_xform, icon_size, Tint::WHITE);
        }

        if let Some(slot) = sim.hud.hovered_slot() {
            let label = hud_label(slot.archetype, slot.amount);
            let width = text_width(&label, HUD_LABEL_GLYPH_HEIGHT);
            let origin = Vec2::new(
                slot.center.x - width * 0.5,
                HUD_ROW_Y + HUD_ICON_SIZE * 0.5 + HUD_LABEL_GAP,
            );
            draw.draw_text(
                Layer::Ui,
                Transform2D::from_translation(origin),
                label,
                HUD_LABEL_GLYPH_HEIGHT,
                HUD_LABEL_TINT,
            );
        }
    }

    fn camera(&self) -> Camera2D {
        self.sim
            .as_ref()
            .map(|sim| sim.camera)
            .unwrap_or_else(|| self.default_camera())
    }

    fn unload(&mut self) {
        if let Some(sim) = self.sim.take() {
            info!(
                entity_count = sim.world.valid_count(),
                items = sim.world.inventory_total(),
                "scene_unloaded"
            );
        }
    }

    fn debug_title(&self) -> Option<String> {
        let sim = self.sim.as_ref()?;
        let player = sim.player_position().unwrap_or(Vec2::ZERO);
        Some(format!(
            "Pirate Game | Player ({:.1}, {:.1}) | Entities {} | Items {}",
            player.x,
            player.y,
            sim.world.valid_count(),
            sim.world.inventory_total()
        ))
    }
}
