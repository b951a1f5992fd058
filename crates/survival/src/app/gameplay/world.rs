use engine::{SceneError, Tint, Vec2};
use thiserror::Error;

use super::archetype::{Archetype, ArchetypeDescriptor, SpriteId};

pub(crate) const MAX_ENTITY_COUNT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Entity {
    pub(crate) is_valid: bool,
    pub(crate) archetype: Archetype,
    pub(crate) position: Vec2,
    pub(crate) color: Tint,
    pub(crate) sprite: SpriteId,
    pub(crate) health: i32,
    pub(crate) destroyable_world_item: bool,
    pub(crate) is_item: bool,
}

impl Entity {
    pub(crate) fn apply_descriptor(&mut self, descriptor: &ArchetypeDescriptor) {
        self.archetype = descriptor.archetype;
        self.sprite = descriptor.sprite;
        self.health = descriptor.initial_health;
        self.destroyable_world_item = descriptor.destroyable_world_item;
        self.is_item = descriptor.is_item;
        self.color = Tint::WHITE;
    }
}

/// Slot index plus the generation the slot had when the handle was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntityHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct InventoryItem {
    pub(crate) amount: u32,
    pub(crate) hover: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum WorldError {
    #[error("entity pool exhausted: all {capacity} slots are in use")]
    CapacityExhausted { capacity: usize },
}

impl From<WorldError> for SceneError {
    fn from(error: WorldError) -> Self {
        SceneError::ResourceExhausted(error.to_string())
    }
}

/// Fixed-capacity entity pool plus the inventory aggregate.
#[derive(Debug, Clone)]
pub(crate) struct World {
    entities: Vec<Entity>,
    generations: Vec<u32>,
    inventory: [InventoryItem; Archetype::COUNT],
}

impl Default for World {
    fn default() -> Self {
        Self::with_capacity(MAX_ENTITY_COUNT)
    }
}

impl World {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: vec![Entity::default(); capacity],
            generations: vec![0; capacity],
            inventory: [InventoryItem::default(); Archetype::COUNT],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entities.len()
    }

    /// Claims the first free slot in index order.
    pub(crate) fn create(&mut self) -> Result<EntityHandle, WorldError> {
        let index = self
            .entities
            .iter()
            .position(|entity| !entity.is_valid)
            .ok_or(WorldError::CapacityExhausted {
                capacity: self.capacity(),
            })?;
        self.entities[index].is_valid = true;
        Ok(EntityHandle {
            index: index as u32,
            generation: self.generations[index],
        })
    }

    pub(crate) fn create_from(
        &mut self,
        descriptor: &ArchetypeDescriptor,
        position: Vec2,
    ) -> Result<EntityHandle, WorldError> {
        let handle = self.create()?;
        let entity = &mut self.entities[handle.index as usize];
        entity.apply_descriptor(descriptor);
        entity.position = position;
        Ok(handle)
    }

    /// Zeroes the slot and retires every copy of `handle`. Stale handles are a no-op.
    pub(crate) fn destroy(&mut self, handle: EntityHandle) -> bool {
        if self.get(handle).is_none() {
            return false;
        }
        let index = handle.index as usize;
        self.entities[index] = Entity::default();
        self.generations[index] = self.generations[index].wrapping_add(1);
        true
    }

    pub(crate) fn get(&self, handle: EntityHandle) -> Option<&Entity> {
        let index = handle.index as usize;
        if self.generations.get(index) != Some(&handle.generation) {
            return None;
        }
        self.entities.get(index).filter(|entity| entity.is_valid)
    }

    pub(crate) fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        let index = handle.index as usize;
        if self.generations.get(index) != Some(&handle.generation) {
            return None;
        }
        self.entities.get_mut(index).filter(|entity| entity.is_valid)
    }

    pub(crate) fn iter_valid(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.entities
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (entity, _))| entity.is_valid)
            .map(|(index, (entity, generation))| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation: *generation,
                    },
                    entity,
                )
            })
    }

    pub(crate) fn iter_valid_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut Entity)> {
        self.entities
            .iter_mut()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (entity, _))| entity.is_valid)
            .map(|(index, (entity, generation))| {
                (
                    EntityHandle {
                        index: index as u32,
                        generation: *generation,
                    },
                    entity,
                )
            })
    }

    pub(crate) fn valid_count(&self) -> usize {
        self.entities.iter().filter(|entity| entity.is_valid).count()
    }

    pub(crate) fn inventory(&self, archetype: Archetype) -> &InventoryItem {
        &self.inventory[archetype.index()]
    }

    pub(crate) fn inventory_mut(&mut self, archetype: Archetype) -> &mut InventoryItem {
        &mut self.inventory[archetype.index()]
    }

    pub(crate) fn add_to_inventory(&mut self, archetype: Archetype, amount: u32) {
        let item = self.inventory_mut(archetype);
        item.amount = item.amount.saturating_add(amount);
    }

    pub(crate) fn inventory_total(&self) -> u32 {
        self.inventory
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::archetype::ArchetypeRegistry;
    use crate::app::gameplay::tuning::GameTuning;

    fn descriptor(archetype: Archetype) -> ArchetypeDescriptor {
        *ArchetypeRegistry::new(&GameTuning::default())
            .descriptor_for(archetype)
            .expect("descriptor")
    }

    #[test]
    fn create_claims_first_free_slot() {
        let mut world = World::with_capacity(3);
        let a = world.create().expect("a");
        let b = world.create().expect("b");
        assert_eq!((a.index, b.index), (0, 1));
        assert!(world.get(a).is_some_and(|entity| entity.is_valid));
        assert_eq!(world.valid_count(), 2);
    }

    #[test]
    fn create_on_full_pool_reports_capacity() {
        let mut world = World::with_capacity(2);
        world.create().expect("first");
        world.create().expect("second");
        assert_eq!(
            world.create(),
            Err(WorldError::CapacityExhausted { capacity: 2 })
        );
    }

    #[test]
    fn create_from_stamps_descriptor_fields() {
        let mut world = World::default();
        let rock = descriptor(Archetype::Rock0);
        let handle = world
            .create_from(&rock, Vec2::new(16.0, -8.0))
            .expect("rock");
        let entity = world.get(handle).expect("entity");

        assert_eq!(entity.archetype, Archetype::Rock0);
        assert_eq!(entity.sprite, rock.sprite);
        assert_eq!(entity.health, 3);
        assert!(entity.destroyable_world_item);
        assert!(!entity.is_item);
        assert_eq!(entity.position, Vec2::new(16.0, -8.0));
        assert_eq!(entity.color, Tint::WHITE);
    }

    #[test]
    fn reused_slot_carries_no_leftover_state() {
        let mut world = World::with_capacity(1);
        let tree = world
            .create_from(&descriptor(Archetype::Tree), Vec2::new(40.0, 40.0))
            .expect("tree");
        world.get_mut(tree).expect("tree").health = 1;
        assert!(world.destroy(tree));

        let item_descriptor = descriptor(Archetype::ItemPineWood);
        let item = world
            .create_from(&item_descriptor, Vec2::ZERO)
            .expect("item");
        assert_eq!(item.index, tree.index);

        let mut expected = Entity {
            is_valid: true,
            ..Entity::default()
        };
        expected.apply_descriptor(&item_descriptor);
        assert_eq!(world.get(item), Some(&expected));
    }

    #[test]
    fn destroy_retires_handle_and_copies() {
        let mut world = World::with_capacity(1);
        let handle = world.create().expect("create");
        let copy = handle;
        assert!(world.destroy(handle));

        assert!(world.get(copy).is_none());
        assert!(!world.destroy(copy));

        let reused = world.create().expect("reuse");
        assert_eq!(reused.index, handle.index);
        assert_ne!(reused.generation, handle.generation);
        assert!(world.get(handle).is_none());
        assert!(world.get(reused).is_some());
    }

    #[test]
    fn out_of_range_handle_is_rejected() {
        let mut world = World::with_capacity(1);
        let bogus = EntityHandle {
            index: 7,
            generation: 0,
        };
        assert!(world.get(bogus).is_none());
        assert!(world.get_mut(bogus).is_none());
        assert!(!world.destroy(bogus));
    }

    #[test]
    fn iteration_visits_valid_slots_in_order() {
        let mut world = World::with_capacity(4);
        let a = world.create().expect("a");
        let b = world.create().expect("b");
        let c = world.create().expect("c");
        world.destroy(b);

        let handles: Vec<EntityHandle> = world.iter_valid().map(|(handle, _)| handle).collect();
        assert_eq!(handles, vec![a, c]);
        for (_, entity) in world.iter_valid_mut() {
            entity.health = 9;
        }
        assert!(world.iter_valid().all(|(_, entity)| entity.health == 9));
    }

    #[test]
    fn capacity_error_maps_to_resource_exhausted() {
        let error: SceneError = WorldError::CapacityExhausted { capacity: 4 }.into();
        assert!(matches!(error, SceneError::ResourceExhausted(message) if message.contains('4')));
    }

    #[test]
    fn inventory_starts_empty_and_accumulates() {
        let mut world = World::default();
        assert!(Archetype::ALL
            .iter()
            .all(|archetype| world.inventory(*archetype).amount == 0));

        world.add_to_inventory(Archetype::ItemRock0, 1);
        world.add_to_inventory(Archetype::ItemRock0, 2);
        world.add_to_inventory(Archetype::ItemBerry, 1);
        assert_eq!(world.inventory(Archetype::ItemRock0).amount, 3);
        assert_eq!(world.inventory_total(), 4);
    }
}
