use engine::{Vec2, UI_WIDTH};
use serde::Deserialize;

use super::archetype::Archetype;
use super::world::World;

pub(crate) const HUD_ROW_Y: f32 = 70.0;
pub(crate) const HUD_ICON_SIZE: f32 = 8.0;
pub(crate) const HUD_PADDING: f32 = 2.0;
pub(crate) const HUD_SLOT_WIDTH: f32 = HUD_ICON_SIZE + HUD_PADDING;
pub(crate) const HUD_LEFT_MARGIN: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum HudLayoutMode {
    #[default]
    Centered,
    /// Row starts at `HUD_LEFT_MARGIN` with a background panel behind it.
    LeftAligned,
}

/// Axis-aligned rect in UI space, `min` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct UiRect {
    pub(crate) min: Vec2,
    pub(crate) size: Vec2,
}

impl UiRect {
    pub(crate) fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(center.x - size.x * 0.5, center.y - size.y * 0.5),
            size,
        }
    }

    pub(crate) fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.min.x + self.size.x
            && point.y >= self.min.y
            && point.y <= self.min.y + self.size.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HudSlot {
    pub(crate) archetype: Archetype,
    pub(crate) amount: u32,
    pub(crate) center: Vec2,
    pub(crate) rect: UiRect,
    pub(crate) hovered: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct HudLayout {
    pub(crate) item_count: usize,
    pub(crate) slots: Vec<HudSlot>,
    pub(crate) panel: Option<UiRect>,
}

impl HudLayout {
    pub(crate) fn hovered_slot(&self) -> Option<&HudSlot> {
        self.slots.iter().find(|slot| slot.hovered)
    }
}

pub(crate) fn item_count(world: &World) -> usize {
    Archetype::ALL
        .iter()
        .filter(|archetype| world.inventory(**archetype).amount > 0)
        .count()
}

fn row_start_center_x(item_count: usize, mode: HudLayoutMode) -> f32 {
    match mode {
        HudLayoutMode::Centered => {
            UI_WIDTH * 0.5 - item_count as f32 * HUD_SLOT_WIDTH * 0.5 + HUD_SLOT_WIDTH * 0.5
        }
        HudLayoutMode::LeftAligned => HUD_LEFT_MARGIN + HUD_SLOT_WIDTH * 0.5,
    }
}

/// Slots follow ascending archetype order over non-empty inventory entries.
pub(crate) fn compute_layout(world: &World, mode: HudLayoutMode) -> HudLayout {
    let item_count = item_count(world);
    let x_start = row_start_center_x(item_count, mode);
    let icon = Vec2::new(HUD_ICON_SIZE, HUD_ICON_SIZE);

    let slots: Vec<HudSlot> = Archetype::ALL
        .iter()
        .filter_map(|archetype| {
            let item = world.inventory(*archetype);
            (item.amount > 0).then_some((*archetype, item.amount))
        })
        .enumerate()
        .map(|(slot_index, (archetype, amount))| {
            let center = Vec2::new(x_start + slot_index as f32 * HUD_SLOT_WIDTH, HUD_ROW_Y);
            HudSlot {
                archetype,
                amount,
                center,
                rect: UiRect::centered(center, icon),
                hovered: false,
            }
        })
        .collect();

    let panel = match mode {
        HudLayoutMode::LeftAligned if item_count > 0 => Some(UiRect {
            min: Vec2::new(HUD_LEFT_MARGIN, HUD_ROW_Y - HUD_SLOT_WIDTH * 0.5),
            size: Vec2::new(item_count as f32 * HUD_SLOT_WIDTH, HUD_SLOT_WIDTH),
        }),
        _ => None,
    };

    HudLayout {
        item_count,
        slots,
        panel,
    }
}

/// Marks hovered slots in both the layout and the inventory; everything else is cleared.
pub(crate) fn update_hover(world: &mut World, layout: &mut HudLayout, pointer_ui: Option<Vec2>) {
    for archetype in Archetype::ALL {
        world.inventory_mut(archetype).hover = false;
    }
    for slot in &mut layout.slots {
        slot.hovered = pointer_ui.is_some_and(|pointer| slot.rect.contains(pointer));
        if slot.hovered {
            world.inventory_mut(slot.archetype).hover = true;
        }
    }
}
