//! Game state as seen by the engine
//!
//! - `GameSnapshot` - the sole input to condition evaluation
//! - `GameClient` - the live source snapshots are read from

mod client;
mod snapshot;

pub use client::{GameClient, SnapshotClient};
pub use snapshot::{
    GameSnapshot, GameState, GroundItem, ItemContainer, ItemStack, QuestId, QuestState, QuestVar,
    Skill, SkillLevel, WidgetText, WorldPoint, Zone, INVENTORY_SIZE,
};
