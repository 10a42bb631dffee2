//! Game state snapshot types
//!
//! A [`GameSnapshot`] is a read of live game state at one instant. Every
//! lookup falls back to a neutral default (0, empty, `NotStarted`) so that
//! conditions can treat missing state as "not satisfied" without erroring.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::Result;

/// Number of slots in the player's inventory
pub const INVENTORY_SIZE: u32 = 28;

/// Identifier of a quest (e.g., "shilo-village")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    /// Create a new quest id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Completion state of a quest
///
/// Ordered so that `NotStarted < InProgress < Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestState {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

/// Login state of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    #[default]
    LoginScreen,
    Loading,
    LoggedIn,
    Hopping,
}

/// Player skills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Attack,
    Defence,
    Strength,
    Hitpoints,
    Ranged,
    Prayer,
    Magic,
    Cooking,
    Woodcutting,
    Fletching,
    Fishing,
    Firemaking,
    Crafting,
    Smithing,
    Mining,
    Herblore,
    Agility,
    Thieving,
    Slayer,
    Farming,
    Runecraft,
    Hunter,
    Construction,
}

/// Real and boosted level of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillLevel {
    pub real: u32,
    pub boosted: u32,
}

/// A tile in the game world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

impl WorldPoint {
    pub fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }
}

/// An inclusive box of tiles spanning one or more planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    min: WorldPoint,
    max: WorldPoint,
}

impl Zone {
    /// Create a zone from two opposite corners, given in any order
    pub fn new(a: WorldPoint, b: WorldPoint) -> Self {
        Self {
            min: WorldPoint::new(a.x.min(b.x), a.y.min(b.y), a.plane.min(b.plane)),
            max: WorldPoint::new(a.x.max(b.x), a.y.max(b.y), a.plane.max(b.plane)),
        }
    }

    /// Check whether a point lies inside the zone
    pub fn contains(&self, point: &WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.plane >= self.min.plane
            && point.plane <= self.max.plane
    }
}

/// A stack of items in a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: u32,
    pub quantity: u32,
}

/// Which item container(s) a lookup should consider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemContainer {
    #[default]
    Inventory,
    Equipped,
    InventoryOrEquipped,
}

/// Text currently shown in an open widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetText {
    pub group: u32,
    pub child: u32,
    pub text: String,
}

/// An item lying on the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItem {
    pub id: u32,
    pub point: WorldPoint,
}

/// Variable that tracks a quest's progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestVar {
    Varbit(u32),
    VarPlayer(u32),
}

impl QuestVar {
    /// Read the variable's value from a snapshot
    pub fn read(&self, snapshot: &GameSnapshot) -> i32 {
        match self {
            QuestVar::Varbit(id) => snapshot.varbit(*id),
            QuestVar::VarPlayer(id) => snapshot.varp(*id),
        }
    }
}

/// A read of live game state at one instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    #[serde(default)]
    pub game_state: GameState,
    #[serde(default)]
    pub varbits: HashMap<u32, i32>,
    #[serde(default)]
    pub varps: HashMap<u32, i32>,
    #[serde(default)]
    pub inventory: Vec<ItemStack>,
    #[serde(default)]
    pub equipment: Vec<ItemStack>,
    #[serde(default)]
    pub skills: HashMap<Skill, SkillLevel>,
    #[serde(default)]
    pub quest_states: HashMap<QuestId, QuestState>,
    #[serde(default)]
    pub position: Option<WorldPoint>,
    #[serde(default)]
    pub widgets: Vec<WidgetText>,
    #[serde(default)]
    pub ground_items: Vec<GroundItem>,
    /// Keys of latched conditions that have held at some earlier point
    #[serde(default)]
    pub latches: BTreeSet<String>,
}

impl GameSnapshot {
    /// Create an empty snapshot (logged out, nothing set)
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_logged_in(&self) -> bool {
        self.game_state == GameState::LoggedIn
    }

    pub fn varbit(&self, id: u32) -> i32 {
        self.varbits.get(&id).copied().unwrap_or(0)
    }

    pub fn varp(&self, id: u32) -> i32 {
        self.varps.get(&id).copied().unwrap_or(0)
    }

    /// Total quantity of any of `ids` held in the given container(s)
    pub fn item_count(&self, ids: &[u32], container: ItemContainer) -> u32 {
        let sum = |stacks: &[ItemStack]| -> u32 {
            stacks
                .iter()
                .filter(|s| ids.contains(&s.id))
                .map(|s| s.quantity)
                .sum()
        };

        match container {
            ItemContainer::Inventory => sum(&self.inventory),
            ItemContainer::Equipped => sum(&self.equipment),
            ItemContainer::InventoryOrEquipped => sum(&self.inventory) + sum(&self.equipment),
        }
    }

    /// Check whether the given container(s) hold nothing at all
    pub fn is_container_empty(&self, container: ItemContainer) -> bool {
        let empty = |stacks: &[ItemStack]| stacks.iter().all(|s| s.quantity == 0);
        match container {
            ItemContainer::Inventory => empty(&self.inventory),
            ItemContainer::Equipped => empty(&self.equipment),
            ItemContainer::InventoryOrEquipped => empty(&self.inventory) && empty(&self.equipment),
        }
    }

    /// Number of unoccupied inventory slots
    pub fn free_inventory_slots(&self) -> u32 {
        let used = self.inventory.iter().filter(|s| s.quantity > 0).count() as u32;
        INVENTORY_SIZE.saturating_sub(used)
    }

    /// Level of a skill, 0 if unknown
    pub fn skill_level(&self, skill: Skill, boosted: bool) -> u32 {
        self.skills
            .get(&skill)
            .map(|l| if boosted { l.boosted } else { l.real })
            .unwrap_or(0)
    }

    pub fn quest_state(&self, quest: &QuestId) -> QuestState {
        self.quest_states.get(quest).copied().unwrap_or_default()
    }

    /// Check whether an open widget contains the given text
    pub fn widget_contains(&self, group: u32, child: u32, text: &str) -> bool {
        self.widgets
            .iter()
            .any(|w| w.group == group && w.child == child && w.text.contains(text))
    }

    pub fn has_ground_item(&self, id: u32, point: &WorldPoint) -> bool {
        self.ground_items
            .iter()
            .any(|g| g.id == id && g.point == *point)
    }

    pub fn is_latched(&self, key: &str) -> bool {
        self.latches.contains(key)
    }

    // Builder helpers, mostly for hosts assembling snapshots and for tests

    pub fn with_game_state(mut self, state: GameState) -> Self {
        self.game_state = state;
        self
    }

    pub fn with_varbit(mut self, id: u32, value: i32) -> Self {
        self.varbits.insert(id, value);
        self
    }

    pub fn with_varp(mut self, id: u32, value: i32) -> Self {
        self.varps.insert(id, value);
        self
    }

    pub fn with_item(mut self, id: u32, quantity: u32) -> Self {
        self.inventory.push(ItemStack { id, quantity });
        self
    }

    pub fn with_equipped(mut self, id: u32, quantity: u32) -> Self {
        self.equipment.push(ItemStack { id, quantity });
        self
    }

    pub fn with_skill(mut self, skill: Skill, real: u32, boosted: u32) -> Self {
        self.skills.insert(skill, SkillLevel { real, boosted });
        self
    }

    pub fn with_quest_state(mut self, quest: impl Into<QuestId>, state: QuestState) -> Self {
        self.quest_states.insert(quest.into(), state);
        self
    }

    pub fn with_position(mut self, point: WorldPoint) -> Self {
        self.position = Some(point);
        self
    }

    pub fn with_widget_text(mut self, group: u32, child: u32, text: impl Into<String>) -> Self {
        self.widgets.push(WidgetText {
            group,
            child,
            text: text.into(),
        });
        self
    }

    pub fn with_ground_item(mut self, id: u32, point: WorldPoint) -> Self {
        self.ground_items.push(GroundItem { id, point });
        self
    }

    pub fn with_latches<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.latches.extend(keys.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_state_defaults() {
        let snapshot = GameSnapshot::new();
        assert_eq!(snapshot.varbit(1234), 0);
        assert_eq!(snapshot.varp(12), 0);
        assert_eq!(snapshot.item_count(&[1265], ItemContainer::Inventory), 0);
        assert_eq!(snapshot.skill_level(Skill::Agility, false), 0);
        assert_eq!(snapshot.quest_state(&"cooks-assistant".into()), QuestState::NotStarted);
        assert!(!snapshot.is_logged_in());
        assert_eq!(snapshot.free_inventory_slots(), INVENTORY_SIZE);
    }

    #[test]
    fn test_item_count_sums_alternatives() {
        let snapshot = GameSnapshot::new()
            .with_item(590, 1)
            .with_item(594, 2)
            .with_equipped(594, 1);

        assert_eq!(snapshot.item_count(&[590, 594], ItemContainer::Inventory), 3);
        assert_eq!(snapshot.item_count(&[594], ItemContainer::Equipped), 1);
        assert_eq!(snapshot.item_count(&[594], ItemContainer::InventoryOrEquipped), 3);
        assert_eq!(snapshot.free_inventory_slots(), 26);
    }

    #[test]
    fn test_zone_corners_any_order() {
        let zone = Zone::new(WorldPoint::new(2469, 3492, 0), WorldPoint::new(2462, 3499, 0));
        assert!(zone.contains(&WorldPoint::new(2465, 3495, 0)));
        assert!(zone.contains(&WorldPoint::new(2469, 3499, 0)));
        assert!(!zone.contains(&WorldPoint::new(2465, 3495, 1)));
        assert!(!zone.contains(&WorldPoint::new(2470, 3495, 0)));
    }

    #[test]
    fn test_quest_state_ordering() {
        assert!(QuestState::NotStarted < QuestState::InProgress);
        assert!(QuestState::InProgress < QuestState::Finished);
    }

    #[test]
    fn test_json_fixture() {
        let json = r#"{
            "game_state": "logged_in",
            "varbits": { "116": 3 },
            "inventory": [{ "id": 1265, "quantity": 1 }],
            "quest_states": { "the-grand-tree": "FINISHED" },
            "skills": { "agility": { "real": 32, "boosted": 35 } }
        }"#;

        let snapshot = GameSnapshot::from_json(json).unwrap();
        assert!(snapshot.is_logged_in());
        assert_eq!(snapshot.varbit(116), 3);
        assert_eq!(snapshot.item_count(&[1265], ItemContainer::Inventory), 1);
        assert_eq!(snapshot.quest_state(&"the-grand-tree".into()), QuestState::Finished);
        assert_eq!(snapshot.skill_level(Skill::Agility, true), 35);

        let round = GameSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(round, snapshot);
    }

    #[test]
    fn test_quest_var_read() {
        let snapshot = GameSnapshot::new().with_varbit(116, 4).with_varp(29, 2);
        assert_eq!(QuestVar::Varbit(116).read(&snapshot), 4);
        assert_eq!(QuestVar::VarPlayer(29).read(&snapshot), 2);
    }
}
