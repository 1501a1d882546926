//! Local (single-player) loot items

use uuid::Uuid;

use crate::util::time::ITEM_EXPIRY;
use crate::ws::protocol::ItemKind;

/// Distance at which the player scoops up an item
pub const PICKUP_RADIUS: f32 = 0.6;

/// Health restored by a health pack
pub const HEALTH_ITEM_AMOUNT: i32 = 25;
/// Rounds granted by an ammo box
pub const AMMO_ITEM_ROUNDS: u32 = 24;

/// Loot dropped on an enemy death; picked up or expired, whichever first
#[derive(Debug, Clone)]
pub struct LootItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    /// Seconds since spawn
    pub age: f32,
}

impl LootItem {
    pub fn new(kind: ItemKind, x: f32, y: f32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            age: 0.0,
        }
    }

    /// Advance age; returns false once the item has expired
    pub fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.age < ITEM_EXPIRY.as_secs_f32()
    }

    pub fn in_pickup_range(&self, x: f32, y: f32) -> bool {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy <= PICKUP_RADIUS * PICKUP_RADIUS
    }
}
