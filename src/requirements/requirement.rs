//! Displayable requirements

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::color::{Color, ColorScheme};
use crate::conditions::Condition;
use crate::state::{GameSnapshot, ItemContainer, QuestId, QuestState, Skill};

/// Whether a requirement must be met or is only advised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequirementKind {
    #[default]
    Required,
    Recommended,
}

/// Evaluated state of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementStatus {
    /// The display gate is closed; the requirement must not be rendered
    Hidden,
    Satisfied,
    Unsatisfied,
}

/// A named, displayable condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Label key, defaults to the display name; not unique across lists
    pub id: String,
    /// Human-readable name
    pub name: String,
    #[serde(default)]
    pub tooltip: Option<String>,
    pub condition: Condition,
    /// Only shown while this holds
    #[serde(default)]
    pub shown_when: Option<Condition>,
    #[serde(default)]
    pub kind: RequirementKind,
    /// Quantity shown next to the name (1 hides it)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl Requirement {
    /// Create a requirement around an arbitrary condition
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            tooltip: None,
            condition,
            shown_when: None,
            kind: RequirementKind::Required,
            quantity: 1,
        }
    }

    /// Carry at least `quantity` of an item
    pub fn item(name: impl Into<String>, item_id: u32, quantity: u32) -> Self {
        Self::items(name, vec![item_id], quantity)
    }

    /// Carry at least `quantity` of any of the alternative items
    pub fn items(name: impl Into<String>, item_ids: Vec<u32>, quantity: u32) -> Self {
        let mut req = Self::new(
            name,
            Condition::Item {
                ids: item_ids,
                quantity,
                container: ItemContainer::Inventory,
            },
        );
        req.quantity = quantity;
        req
    }

    /// Have nothing in a container
    pub fn no_item(container: ItemContainer) -> Self {
        let slot = match container {
            ItemContainer::Inventory => "inventory",
            ItemContainer::Equipped => "equipment",
            ItemContainer::InventoryOrEquipped => "inventory or equipment",
        };
        Self::new(format!("Nothing in your {}", slot), Condition::NoItem { container })
    }

    /// Reach a skill level
    pub fn skill(skill: Skill, level: u32) -> Self {
        Self::new(format!("{} {:?}", level, skill), Condition::skill(skill, level))
    }

    /// Have another quest in at least `state`
    pub fn quest(name: impl Into<String>, quest: impl Into<QuestId>, state: QuestState) -> Self {
        Self::new(name, Condition::quest_progress(quest, state))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Hide the requirement unless `gate` holds
    pub fn shown_when(mut self, gate: Condition) -> Self {
        self.shown_when = Some(gate);
        self
    }

    /// Mark the requirement as recommended rather than required
    pub fn recommended(mut self) -> Self {
        self.kind = RequirementKind::Recommended;
        self
    }

    /// Check the wrapped condition
    pub fn evaluate(&self, snapshot: &GameSnapshot) -> bool {
        self.condition.evaluate(snapshot)
    }

    /// Whether the display gate is open
    pub fn is_shown(&self, snapshot: &GameSnapshot) -> bool {
        self.shown_when
            .as_ref()
            .map_or(true, |gate| gate.evaluate(snapshot))
    }

    pub fn status(&self, snapshot: &GameSnapshot) -> RequirementStatus {
        if !self.is_shown(snapshot) {
            RequirementStatus::Hidden
        } else if self.evaluate(snapshot) {
            RequirementStatus::Satisfied
        } else {
            RequirementStatus::Unsatisfied
        }
    }

    /// Color to render the requirement with, `None` when it is hidden
    pub fn color(&self, snapshot: &GameSnapshot, scheme: &ColorScheme) -> Option<Color> {
        self.color_for(self.status(snapshot), scheme)
    }

    /// Map an already computed status to a color
    pub fn color_for(&self, status: RequirementStatus, scheme: &ColorScheme) -> Option<Color> {
        match status {
            RequirementStatus::Hidden => None,
            RequirementStatus::Satisfied => Some(scheme.satisfied),
            RequirementStatus::Unsatisfied => Some(match self.kind {
                RequirementKind::Required => scheme.unsatisfied,
                RequirementKind::Recommended => scheme.recommended,
            }),
        }
    }

    /// Text shown to the player
    pub fn display_text(&self) -> String {
        if self.quantity > 1 {
            format!("{} x {}", self.quantity, self.name)
        } else {
            self.name.clone()
        }
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Key that only identical requirements share
    ///
    /// Two "Bones" entries asking for different quantities have the same
    /// `id` but different keys.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Record latched conditions of both the gate and the condition
    pub fn collect_latches(&self, snapshot: &GameSnapshot, out: &mut BTreeSet<String>) {
        self.condition.collect_latches(snapshot, out);
        if let Some(gate) = &self.shown_when {
            gate.collect_latches(snapshot, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ComparisonOp;

    const SPADE: u32 = 1265;

    #[test]
    fn test_item_requirement_colors() {
        let scheme = ColorScheme::default();
        let spade = Requirement::item("Spade", SPADE, 1);

        let without = GameSnapshot::new();
        assert!(!spade.evaluate(&without));
        assert_eq!(spade.status(&without), RequirementStatus::Unsatisfied);
        assert_eq!(spade.color(&without, &scheme), Some(Color::RED));

        let with = GameSnapshot::new().with_item(SPADE, 1);
        assert!(spade.evaluate(&with));
        assert_eq!(spade.color(&with, &scheme), Some(Color::GREEN));
    }

    #[test]
    fn test_recommended_uses_intermediate_color() {
        let scheme = ColorScheme::default();
        let teleport = Requirement::items("Necklace of passage", vec![21146, 21149], 1)
            .recommended()
            .with_tooltip("Teleports you just south of the Stronghold entrance.");

        assert_eq!(teleport.color(&GameSnapshot::new(), &scheme), Some(Color::ORANGE));
        assert_eq!(
            teleport.tooltip(),
            Some("Teleports you just south of the Stronghold entrance.")
        );
    }

    #[test]
    fn test_hidden_requirement_has_no_color() {
        let scheme = ColorScheme::default();
        let rope = Requirement::item("Rope", 954, 1)
            .shown_when(Condition::quest_state("shilo-village", QuestState::InProgress));

        let snapshot = GameSnapshot::new().with_item(954, 1);
        assert_eq!(rope.status(&snapshot), RequirementStatus::Hidden);
        assert_eq!(rope.color(&snapshot, &scheme), None);

        let started = snapshot.with_quest_state("shilo-village", QuestState::InProgress);
        assert_eq!(rope.color(&started, &scheme), Some(Color::GREEN));
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Requirement::item("Bones", 526, 3).display_text(), "3 x Bones");
        assert_eq!(Requirement::item("Spade", SPADE, 1).display_text(), "Spade");
        assert_eq!(Requirement::skill(Skill::Agility, 32).display_text(), "32 Agility");
        assert_eq!(
            Requirement::no_item(ItemContainer::Equipped).display_text(),
            "Nothing in your equipment"
        );
    }

    #[test]
    fn test_cache_key_tells_same_named_requirements_apart() {
        let three = Requirement::item("Bones", 526, 3);
        let one = Requirement::item("Bones", 526, 1);

        assert_eq!(three.id, one.id);
        assert_ne!(three.cache_key(), one.cache_key());
        assert_eq!(three.cache_key(), Requirement::item("Bones", 526, 3).cache_key());
    }

    #[test]
    fn test_collect_latches_from_gate_and_condition() {
        let req = Requirement::new(
            "Read the scroll",
            Condition::latched("read-scroll", Condition::widget_text(220, 1, "Bervirius")),
        )
        .shown_when(Condition::latched("met-trufitus", Condition::varbit(116, ComparisonOp::GreaterThan, 0)));

        let snapshot = GameSnapshot::new()
            .with_widget_text(220, 1, "the tomb of Bervirius")
            .with_varbit(116, 1);
        let mut latches = BTreeSet::new();
        req.collect_latches(&snapshot, &mut latches);

        assert!(latches.contains("read-scroll"));
        assert!(latches.contains("met-trufitus"));
    }

    #[test]
    fn test_quest_requirement() {
        let req = Requirement::quest("Gnome Glider Access", "the-grand-tree", QuestState::Finished);
        assert_eq!(req.id, "Gnome Glider Access");
        assert!(!req.evaluate(&GameSnapshot::new()));
        assert!(req.evaluate(
            &GameSnapshot::new().with_quest_state("the-grand-tree", QuestState::Finished)
        ));
    }
}
