use engine::{Tint, Vec2};
use serde::Deserialize;
use tracing::info;

use super::archetype::{Archetype, ArchetypeRegistry, SpriteSizes};
use super::math::distance;
use super::world::{EntityHandle, World, WorldError};

pub(crate) const TINT_INACTIVE: Tint = Tint::rgba(0.5, 0.5, 0.5, 1.0);
pub(crate) const TINT_ACTIVE: Tint = Tint::WHITE;
pub(crate) const TINT_SELECTED: Tint = Tint::RED;

pub(crate) const HIT_BOX_SIZE: f32 = 15.0;
pub(crate) const HIT_THRESHOLD: f32 = 7.0;

/// Per-tick selection scratch; rebuilt from scratch every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorldFrame {
    pub(crate) selected_entity: Option<EntityHandle>,
}

/// Which hit wins when several entities pass the pointer test in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SelectionTieBreak {
    /// The hit visited last in slot order.
    #[default]
    LastVisited,
    /// The hit whose anchor is closest to the pointer; earlier slot on equal distance.
    NearestToPointer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SelectionParams {
    pub(crate) selection_radius: f32,
    pub(crate) tie_break: SelectionTieBreak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ActivationOutcome {
    None,
    Damaged {
        handle: EntityHandle,
        remaining: i32,
    },
    Destroyed {
        archetype: Archetype,
        position: Vec2,
        drop: Option<EntityHandle>,
    },
}

/// Anchor the pointer is tested against, offset into the sprite's lower-left area.
pub(crate) fn hit_anchor(entity_position: Vec2, sprite_size: Vec2) -> Vec2 {
    Vec2::new(
        entity_position.x + sprite_size.x * 0.2,
        entity_position.y + sprite_size.y * 0.03,
    )
}

fn pointer_offset_from(anchor: Vec2, pointer_world: Vec2) -> f32 {
    let half_box = Vec2::new(HIT_BOX_SIZE * 0.5, HIT_BOX_SIZE * 0.5);
    distance(pointer_world - half_box, anchor)
}

pub(crate) fn pointer_hit(anchor: Vec2, pointer_world: Vec2) -> bool {
    pointer_offset_from(anchor, pointer_world) < HIT_THRESHOLD
}

/// Tints every valid entity and picks at most one selection.
pub(crate) fn selection_pass(
    world: &mut World,
    sprite_sizes: &SpriteSizes,
    player_position: Vec2,
    pointer_world: Option<Vec2>,
    params: SelectionParams,
) -> WorldFrame {
    let mut selected: Option<(EntityHandle, f32)> = None;

    for (handle, entity) in world.iter_valid_mut() {
        if !entity.destroyable_world_item {
            entity.color = TINT_ACTIVE;
            continue;
        }

        entity.color = TINT_INACTIVE;
        if distance(player_position, entity.position) >= params.selection_radius {
            continue;
        }
        entity.color = TINT_ACTIVE;

        let Some(pointer) = pointer_world else {
            continue;
        };
        let anchor = hit_anchor(entity.position, sprite_sizes.size_of(entity.sprite));
        if !pointer_hit(anchor, pointer) {
            continue;
        }
        entity.color = TINT_SELECTED;

        let offset = pointer_offset_from(anchor, pointer);

        let replace = match (params.tie_break, selected) {
            (_, None) => true,
            (SelectionTieBreak::LastVisited, Some(_)) => true,
            (SelectionTieBreak::NearestToPointer, Some((_, best))) => offset < best,
        };
        if replace {
            selected = Some((handle, offset));
        }
    }

    WorldFrame {
        selected_entity: selected.map(|(handle, _)| handle),
    }
}

/// Applies one hit to the selection on a fresh press. The destroyed slot is freed
/// before the drop spawns, so the drop can reuse it on a full pool.
pub(crate) fn activation_pass(
    world: &mut World,
    registry: &ArchetypeRegistry,
    frame: &WorldFrame,
    press: bool,
) -> Result<ActivationOutcome, WorldError> {
    if !press {
        return Ok(ActivationOutcome::None);
    }
    let Some(handle) = frame.selected_entity else {
        return Ok(ActivationOutcome::None);
    };
    let Some(entity) = world.get_mut(handle) else {
        return Ok(ActivationOutcome::None);
    };
    if !entity.destroyable_world_item {
        return Ok(ActivationOutcome::None);
    }

    entity.health -= 1;
    let remaining = entity.health;
    let archetype = entity.archetype;
    let position = entity.position;
    if remaining > 0 {
        return Ok(ActivationOutcome::Damaged { handle, remaining });
    }

    world.destroy(handle);
    let drop = match registry
        .drop_for(archetype)
        .and_then(|drop_archetype| registry.descriptor_for(drop_archetype))
    {
        Some(descriptor) => Some(world.create_from(descriptor, position)?),
        None => None,
    };
    Ok(ActivationOutcome::Destroyed {
        archetype,
        position,
        drop,
    })
}

/// Collects every item within `pickup_radius` of the player into the inventory.
pub(crate) fn pickup_pass(
    world: &mut World,
    player_position: Vec2,
    pickup_radius: f32,
) -> Vec<Archetype> {
    let in_reach: Vec<(EntityHandle, Archetype)> = world
        .iter_valid()
        .filter(|(_, entity)| entity.is_item)
        .filter(|(_, entity)| distance(entity.position, player_position) < pickup_radius)
        .map(|(handle, entity)| (handle, entity.archetype))
        .collect();

    let mut picked = Vec::with_capacity(in_reach.len());
    for (handle, archetype) in in_reach {
        if world.destroy(handle) {
            world.add_to_inventory(archetype, 1);
            info!(
                archetype = ?archetype,
                amount = world.inventory(archetype).amount,
                "item_picked_up"
            );
            picked.push(archetype);
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::tuning::GameTuning;

    const SPRITE: Vec2 = Vec2::new(10.0, 10.0);

    fn params(tie_break: SelectionTieBreak) -> SelectionParams {
        SelectionParams {
            selection_radius: 100.0,
            tie_break,
        }
    }

    fn pointer_over(position: Vec2) -> Vec2 {
        let anchor = hit_anchor(position, SPRITE);
        Vec2::new(anchor.x + HIT_BOX_SIZE * 0.5, anchor.y + HIT_BOX_SIZE * 0.5)
    }

    fn spawn(
        world: &mut World,
        registry: &ArchetypeRegistry,
        archetype: Archetype,
        at: Vec2,
    ) -> EntityHandle {
        let descriptor = registry.descriptor_for(archetype).expect("descriptor");
        world.create_from(descriptor, at).expect("spawn")
    }

    #[test]
    fn hit_anchor_and_threshold_follow_pointer_offset() {
        let anchor = hit_anchor(Vec2::new(100.0, 50.0), Vec2::new(20.0, 40.0));
        assert!((anchor.x - 104.0).abs() < 0.0001);
        assert!((anchor.y - 51.2).abs() < 0.0001);

        let centered = Vec2::new(anchor.x + 7.5, anchor.y + 7.5);
        assert!(pointer_hit(anchor, centered));
        assert!(pointer_hit(anchor, Vec2::new(centered.x + 6.9, centered.y)));
        assert!(!pointer_hit(anchor, Vec2::new(centered.x + 7.1, centered.y)));
        assert!(!pointer_hit(anchor, anchor));
    }

    #[test]
    fn selection_tints_by_radius_and_hit() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(8);
        let sizes = SpriteSizes::uniform(SPRITE);
        let player = spawn(&mut world, &registry, Archetype::Player, Vec2::ZERO);
        let far = spawn(&mut world, &registry, Archetype::Rock0, Vec2::new(200.0, 0.0));
        let near = spawn(&mut world, &registry, Archetype::Tree, Vec2::new(40.0, 0.0));
        let hovered = spawn(&mut world, &registry, Archetype::Rock1, Vec2::new(-40.0, 0.0));

        let frame = selection_pass(
            &mut world,
            &sizes,
            Vec2::ZERO,
            Some(pointer_over(Vec2::new(-40.0, 0.0))),
            params(SelectionTieBreak::LastVisited),
        );

        assert_eq!(frame.selected_entity, Some(hovered));
        let color = |handle| world.get(handle).expect("entity").color;
        assert_eq!(color(player), TINT_ACTIVE);
        assert_eq!(color(far), TINT_INACTIVE);
        assert_eq!(color(near), TINT_ACTIVE);
        assert_eq!(color(hovered), TINT_SELECTED);
    }

    #[test]
    fn out_of_radius_entity_is_never_selected() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(2);
        let far_position = Vec2::new(150.0, 0.0);
        spawn(&mut world, &registry, Archetype::Rock0, far_position);

        let frame = selection_pass(
            &mut world,
            &SpriteSizes::uniform(SPRITE),
            Vec2::ZERO,
            Some(pointer_over(far_position)),
            params(SelectionTieBreak::LastVisited),
        );
        assert_eq!(frame.selected_entity, None);
    }

    #[test]
    fn missing_pointer_skips_hit_test() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(2);
        let rock = spawn(&mut world, &registry, Archetype::Rock0, Vec2::new(5.0, 5.0));

        let frame = selection_pass(
            &mut world,
            &SpriteSizes::uniform(SPRITE),
            Vec2::ZERO,
            None,
            params(SelectionTieBreak::LastVisited),
        );
        assert_eq!(frame.selected_entity, None);
        assert_eq!(world.get(rock).expect("rock").color, TINT_ACTIVE);
    }

    #[test]
    fn activation_requires_press_and_live_selection() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(2);
        let rock = spawn(&mut world, &registry, Archetype::Rock0, Vec2::ZERO);
        let frame = WorldFrame {
            selected_entity: Some(rock),
        };

        assert_eq!(
            activation_pass(&mut world, &registry, &frame, false),
            Ok(ActivationOutcome::None)
        );
        assert_eq!(
            activation_pass(&mut world, &registry, &WorldFrame::default(), true),
            Ok(ActivationOutcome::None)
        );
        assert_eq!(
            activation_pass(&mut world, &registry, &frame, true),
            Ok(ActivationOutcome::Damaged {
                handle: rock,
                remaining: 2
            })
        );
    }

    #[test]
    fn stale_selection_is_rejected() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(2);
        let rock = spawn(&mut world, &registry, Archetype::Rock0, Vec2::ZERO);
        world.destroy(rock);
        let reused = spawn(&mut world, &registry, Archetype::Tree, Vec2::ZERO);
        assert_eq!(reused.index, rock.index);

        let stale = WorldFrame {
            selected_entity: Some(rock),
        };
        assert_eq!(
            activation_pass(&mut world, &registry, &stale, true),
            Ok(ActivationOutcome::None)
        );
        assert_eq!(world.get(reused).expect("tree").health, 3);
    }

    #[test]
    fn destroying_bush_drops_berry_at_its_position() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(4);
        let position = Vec2::new(24.0, -16.0);
        let bush = spawn(&mut world, &registry, Archetype::Bush0, position);
        let frame = WorldFrame {
            selected_entity: Some(bush),
        };

        activation_pass(&mut world, &registry, &frame, true).expect("first hit");
        let outcome = activation_pass(&mut world, &registry, &frame, true).expect("second hit");
        let ActivationOutcome::Destroyed {
            archetype,
            position: destroyed_at,
            drop: Some(drop),
        } = outcome
        else {
            panic!("expected destruction with drop, got {outcome:?}");
        };
        assert_eq!(archetype, Archetype::Bush0);
        assert_eq!(destroyed_at, position);
        let berry = world.get(drop).expect("berry");
        assert_eq!(berry.archetype, Archetype::ItemBerry);
        assert_eq!(berry.position, position);
        assert!(berry.is_item);
        assert!(world.get(bush).is_none());
    }

    #[test]
    fn pickup_collects_only_items_in_radius() {
        let registry = ArchetypeRegistry::new(&GameTuning::default());
        let mut world = World::with_capacity(8);
        spawn(&mut world, &registry, Archetype::Player, Vec2::ZERO);
        let near_item = spawn(&mut world, &registry, Archetype::ItemRock0, Vec2::new(19.0, 0.0));
        let far_item = spawn(&mut world, &registry, Archetype::ItemRock0, Vec2::new(21.0, 0.0));
        let near_rock = spawn(&mut world, &registry, Archetype::Rock0, Vec2::new(1.0, 0.0));

        let picked = pickup_pass(&mut world, Vec2::ZERO, 20.0);

        assert_eq!(picked, vec![Archetype::ItemRock0]);
        assert!(world.get(near_item).is_none());
        assert!(world.get(far_item).is_some());
        assert!(world.get(near_rock).is_some());
        assert_eq!(world.inventory(Archetype::ItemRock0).amount, 1);
    }

    #[test]
    fn pickup_with_nothing_nearby_is_a_no_op() {
        let mut world = World::with_capacity(4);
        assert!(pickup_pass(&mut world, Vec2::ZERO, 20.0).is_empty());
        assert_eq!(world.inventory_total(), 0);
    }
}
