use engine::{SceneError, SpriteCatalog, Vec2};

use super::tuning::GameTuning;

/// Entity kinds in HUD slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub(crate) enum Archetype {
    #[default]
    Nil,
    Rock0,
    Rock1,
    Tree,
    Player,
    ItemRock0,
    ItemRock1,
    ItemPineWood,
    Bush0,
    ItemBerry,
}

impl Archetype {
    pub(crate) const COUNT: usize = 10;
    pub(crate) const ALL: [Archetype; Self::COUNT] = [
        Archetype::Nil,
        Archetype::Rock0,
        Archetype::Rock1,
        Archetype::Tree,
        Archetype::Player,
        Archetype::ItemRock0,
        Archetype::ItemRock1,
        Archetype::ItemPineWood,
        Archetype::Bush0,
        Archetype::ItemBerry,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub(crate) fn display_name(self) -> &'static str {
        match self {
            Archetype::Nil => "Nil",
            Archetype::Rock0 => "Rock",
            Archetype::Rock1 => "Dark Rock",
            Archetype::Tree => "Pine Tree",
            Archetype::Player => "Player",
            Archetype::ItemRock0 => "Rock",
            Archetype::ItemRock1 => "Dark Rock",
            Archetype::ItemPineWood => "Pine Wood",
            Archetype::Bush0 => "Berry Bush",
            Archetype::ItemBerry => "Berry",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum SpriteId {
    #[default]
    Nil,
    Player,
    Tree0,
    Rock0,
    Rock1,
    Bush0,
    ItemPineWood,
    ItemRock0,
    ItemRock1,
    ItemBerry,
}

impl SpriteId {
    pub(crate) const COUNT: usize = 10;
    pub(crate) const LOADABLE: [SpriteId; Self::COUNT - 1] = [
        SpriteId::Player,
        SpriteId::Tree0,
        SpriteId::Rock0,
        SpriteId::Rock1,
        SpriteId::Bush0,
        SpriteId::ItemPineWood,
        SpriteId::ItemRock0,
        SpriteId::ItemRock1,
        SpriteId::ItemBerry,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Image key under `assets/base/sprites`; `Nil` has no image.
    pub(crate) fn key(self) -> Option<&'static str> {
        let key = match self {
            SpriteId::Nil => return None,
            SpriteId::Player => "player",
            SpriteId::Tree0 => "tree0",
            SpriteId::Rock0 => "rock0",
            SpriteId::Rock1 => "rock1",
            SpriteId::Bush0 => "bush0",
            SpriteId::ItemPineWood => "item_pine_wood",
            SpriteId::ItemRock0 => "item_rock0",
            SpriteId::ItemRock1 => "item_rock1",
            SpriteId::ItemBerry => "item_berry",
        };
        Some(key)
    }

    pub(crate) fn loadable_keys() -> Vec<&'static str> {
        Self::LOADABLE.iter().filter_map(|sprite| sprite.key()).collect()
    }
}

/// Pixel size per sprite, captured from the asset loader once at scene load.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpriteSizes {
    sizes: [Vec2; SpriteId::COUNT],
}

impl SpriteSizes {
    pub(crate) fn from_catalog(catalog: &SpriteCatalog) -> Result<Self, SceneError> {
        let mut sizes = [Vec2::ZERO; SpriteId::COUNT];
        for sprite in SpriteId::LOADABLE {
            let Some(key) = sprite.key() else {
                continue;
            };
            let (width, height) = catalog
                .size_of(key)
                .ok_or_else(|| SceneError::MissingContent(format!("sprite '{key}' not loaded")))?;
            sizes[sprite.index()] = Vec2::new(width as f32, height as f32);
        }
        Ok(Self { sizes })
    }

    #[cfg(test)]
    pub(crate) fn uniform(size: Vec2) -> Self {
        let mut sizes = [size; SpriteId::COUNT];
        sizes[SpriteId::Nil.index()] = Vec2::ZERO;
        Self { sizes }
    }

    pub(crate) fn size_of(&self, sprite: SpriteId) -> Vec2 {
        self.sizes[sprite.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArchetypeDescriptor {
    pub(crate) archetype: Archetype,
    pub(crate) sprite: SpriteId,
    pub(crate) initial_health: i32,
    pub(crate) destroyable_world_item: bool,
    pub(crate) is_item: bool,
    pub(crate) drop: Option<Archetype>,
}

impl ArchetypeDescriptor {
    fn plain(archetype: Archetype, sprite: SpriteId) -> Self {
        Self {
            archetype,
            sprite,
            initial_health: 0,
            destroyable_world_item: false,
            is_item: false,
            drop: None,
        }
    }

    fn resource(archetype: Archetype, sprite: SpriteId, initial_health: i32) -> Self {
        Self {
            initial_health,
            destroyable_world_item: true,
            drop: drop_for(archetype),
            ..Self::plain(archetype, sprite)
        }
    }

    fn item(archetype: Archetype, sprite: SpriteId) -> Self {
        Self {
            is_item: true,
            ..Self::plain(archetype, sprite)
        }
    }
}

/// Drop table for destroyable kinds; anything unlisted drops nothing.
pub(crate) fn drop_for(archetype: Archetype) -> Option<Archetype> {
    match archetype {
        Archetype::Tree => Some(Archetype::ItemPineWood),
        Archetype::Rock0 => Some(Archetype::ItemRock0),
        Archetype::Rock1 => Some(Archetype::ItemRock1),
        Archetype::Bush0 => Some(Archetype::ItemBerry),
        Archetype::Nil
        | Archetype::Player
        | Archetype::ItemRock0
        | Archetype::ItemRock1
        | Archetype::ItemPineWood
        | Archetype::ItemBerry => None,
    }
}

/// HUD icon for an inventory slot.
pub(crate) fn item_sprite_for(archetype: Archetype) -> SpriteId {
    match archetype {
        Archetype::ItemPineWood => SpriteId::ItemPineWood,
        Archetype::ItemRock0 => SpriteId::ItemRock0,
        Archetype::ItemRock1 => SpriteId::ItemRock1,
        Archetype::ItemBerry => SpriteId::ItemBerry,
        _ => SpriteId::Nil,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArchetypeRegistry {
    descriptors: [Option<ArchetypeDescriptor>; Archetype::COUNT],
}

impl ArchetypeRegistry {
    pub(crate) fn new(tuning: &GameTuning) -> Self {
        let table = [
            ArchetypeDescriptor::plain(Archetype::Player, SpriteId::Player),
            ArchetypeDescriptor::resource(Archetype::Rock0, SpriteId::Rock0, tuning.rock_health),
            ArchetypeDescriptor::resource(Archetype::Rock1, SpriteId::Rock1, tuning.rock_health),
            ArchetypeDescriptor::resource(Archetype::Tree, SpriteId::Tree0, tuning.tree_health),
            ArchetypeDescriptor::resource(Archetype::Bush0, SpriteId::Bush0, tuning.bush_health),
            ArchetypeDescriptor::item(Archetype::ItemRock0, SpriteId::ItemRock0),
            ArchetypeDescriptor::item(Archetype::ItemRock1, SpriteId::ItemRock1),
            ArchetypeDescriptor::item(Archetype::ItemPineWood, SpriteId::ItemPineWood),
            ArchetypeDescriptor::item(Archetype::ItemBerry, SpriteId::ItemBerry),
        ];

        let mut descriptors = [None; Archetype::COUNT];
        for descriptor in table {
            descriptors[descriptor.archetype.index()] = Some(descriptor);
        }
        Self { descriptors }
    }

    pub(crate) fn descriptor_for(&self, archetype: Archetype) -> Option<&ArchetypeDescriptor> {
        self.descriptors[archetype.index()].as_ref()
    }

    pub(crate) fn drop_for(&self, archetype: Archetype) -> Option<Archetype> {
        self.descriptor_for(archetype).and_then(|descriptor| descriptor.drop)
    }
}
