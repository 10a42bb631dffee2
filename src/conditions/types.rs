//! Condition type definitions

use serde::{Deserialize, Serialize};

use crate::state::{ItemContainer, QuestId, QuestState, Skill, WorldPoint, Zone};

/// Comparison operators for variable conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOp {
    /// Compare two values using this operator
    pub fn compare<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            ComparisonOp::Equal => a == b,
            ComparisonOp::NotEqual => a != b,
            ComparisonOp::LessThan => a < b,
            ComparisonOp::LessThanOrEqual => a <= b,
            ComparisonOp::GreaterThan => a > b,
            ComparisonOp::GreaterThanOrEqual => a >= b,
        }
    }
}

/// Truth table used by a composite condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogicType {
    /// All children hold (vacuously true when empty)
    #[default]
    And,
    /// Any child holds (false when empty)
    Or,
    /// No child holds (true when empty)
    Nor,
    /// Not every child holds (false when empty)
    Nand,
}

impl LogicType {
    /// Combine child results, short-circuiting left to right
    pub fn apply<I>(&self, mut results: I) -> bool
    where
        I: Iterator<Item = bool>,
    {
        match self {
            LogicType::And => results.all(|r| r),
            LogicType::Or => results.any(|r| r),
            LogicType::Nor => !results.any(|r| r),
            LogicType::Nand => !results.all(|r| r),
        }
    }
}

/// A predicate over a game snapshot
///
/// Conditions are pure: the same condition evaluated twice against the same
/// snapshot gives the same answer. Missing state is never an error, it simply
/// does not satisfy the predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Fixed result
    Constant(bool),

    /// Varbit comparison
    Varbit { id: u32, op: ComparisonOp, value: i32 },

    /// Player variable comparison
    VarPlayer { id: u32, op: ComparisonOp, value: i32 },

    /// At least `quantity` of any of `ids` (quantities summed)
    ///
    /// A `quantity` of 0 is read as 1, so this always asks for the item to be
    /// present. Use `NoItem` to test for absence.
    Item {
        ids: Vec<u32>,
        quantity: u32,
        container: ItemContainer,
    },

    /// Container holds nothing
    NoItem { container: ItemContainer },

    /// At least `count` empty inventory slots
    FreeInventorySlots { count: u32 },

    /// Skill level at least `level`
    Skill { skill: Skill, level: u32, boosted: bool },

    /// Quest is exactly in `state`
    QuestState { quest: QuestId, state: QuestState },

    /// Quest has reached at least `state`
    QuestProgress { quest: QuestId, state: QuestState },

    /// Player stands inside any of the zones
    Zone(Vec<Zone>),

    /// An open widget contains the text
    WidgetText { group: u32, child: u32, text: String },

    /// An item lies on a specific tile
    ItemOnTile { item_id: u32, point: WorldPoint },

    /// Children combined by a truth table
    Composite {
        logic: LogicType,
        children: Vec<Condition>,
    },

    Not(Box<Condition>),

    /// At least `n` children hold
    AtLeast { n: usize, children: Vec<Condition> },

    /// Holds once `inner` has held at least once
    ///
    /// The engine remembers `key` after `inner` first holds and passes it back
    /// through [`GameSnapshot::latches`](crate::state::GameSnapshot::latches).
    Latched { key: String, inner: Box<Condition> },
}

impl Condition {
    pub fn and(children: Vec<Condition>) -> Self {
        Self::composite(LogicType::And, children)
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Self::composite(LogicType::Or, children)
    }

    pub fn nor(children: Vec<Condition>) -> Self {
        Self::composite(LogicType::Nor, children)
    }

    pub fn nand(children: Vec<Condition>) -> Self {
        Self::composite(LogicType::Nand, children)
    }

    pub fn composite(logic: LogicType, children: Vec<Condition>) -> Self {
        Condition::Composite { logic, children }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Condition) -> Self {
        Condition::Not(Box::new(inner))
    }

    pub fn at_least(n: usize, children: Vec<Condition>) -> Self {
        Condition::AtLeast { n, children }
    }

    pub fn latched(key: impl Into<String>, inner: Condition) -> Self {
        Condition::Latched {
            key: key.into(),
            inner: Box::new(inner),
        }
    }

    pub fn varbit(id: u32, op: ComparisonOp, value: i32) -> Self {
        Condition::Varbit { id, op, value }
    }

    pub fn varp(id: u32, op: ComparisonOp, value: i32) -> Self {
        Condition::VarPlayer { id, op, value }
    }

    /// At least `quantity` of `id` in the inventory, minimum one
    pub fn item(id: u32, quantity: u32) -> Self {
        Condition::Item {
            ids: vec![id],
            quantity: quantity.max(1),
            container: ItemContainer::Inventory,
        }
    }

    /// At least one of any of `ids`, carried or worn
    pub fn any_item(ids: Vec<u32>) -> Self {
        Condition::Item {
            ids,
            quantity: 1,
            container: ItemContainer::InventoryOrEquipped,
        }
    }

    pub fn equipped(id: u32) -> Self {
        Condition::Item {
            ids: vec![id],
            quantity: 1,
            container: ItemContainer::Equipped,
        }
    }

    pub fn skill(skill: Skill, level: u32) -> Self {
        Condition::Skill {
            skill,
            level,
            boosted: false,
        }
    }

    pub fn quest_state(quest: impl Into<QuestId>, state: QuestState) -> Self {
        Condition::QuestState {
            quest: quest.into(),
            state,
        }
    }

    pub fn quest_progress(quest: impl Into<QuestId>, state: QuestState) -> Self {
        Condition::QuestProgress {
            quest: quest.into(),
            state,
        }
    }

    pub fn in_zone(zone: Zone) -> Self {
        Condition::Zone(vec![zone])
    }

    pub fn widget_text(group: u32, child: u32, text: impl Into<String>) -> Self {
        Condition::WidgetText {
            group,
            child,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::GameSnapshot;

    #[test]
    fn test_comparison_ops() {
        assert!(ComparisonOp::Equal.compare(&5, &5));
        assert!(!ComparisonOp::Equal.compare(&5, &6));
        assert!(ComparisonOp::NotEqual.compare(&5, &6));
        assert!(ComparisonOp::LessThan.compare(&5, &6));
        assert!(ComparisonOp::LessThanOrEqual.compare(&6, &6));
        assert!(ComparisonOp::GreaterThan.compare(&7, &6));
        assert!(ComparisonOp::GreaterThanOrEqual.compare(&5, &5));
    }

    #[test]
    fn test_logic_type_truth_tables() {
        let cases: [(&[bool], [bool; 4]); 4] = [
            (&[], [true, false, true, false]),
            (&[true, true], [true, true, false, false]),
            (&[true, false], [false, true, false, true]),
            (&[false, false], [false, false, true, true]),
        ];

        for (inputs, [and, or, nor, nand]) in cases {
            assert_eq!(LogicType::And.apply(inputs.iter().copied()), and, "AND {:?}", inputs);
            assert_eq!(LogicType::Or.apply(inputs.iter().copied()), or, "OR {:?}", inputs);
            assert_eq!(LogicType::Nor.apply(inputs.iter().copied()), nor, "NOR {:?}", inputs);
            assert_eq!(LogicType::Nand.apply(inputs.iter().copied()), nand, "NAND {:?}", inputs);
        }
    }

    #[test]
    fn test_builders() {
        assert_eq!(
            Condition::nor(vec![Condition::Constant(true)]),
            Condition::Composite {
                logic: LogicType::Nor,
                children: vec![Condition::Constant(true)],
            }
        );

        match Condition::item(1265, 1) {
            Condition::Item { ids, quantity, container } => {
                assert_eq!(ids, vec![1265]);
                assert_eq!(quantity, 1);
                assert_eq!(container, ItemContainer::Inventory);
            }
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn test_zero_quantity_item_needs_one() {
        assert!(matches!(Condition::item(526, 0), Condition::Item { quantity: 1, .. }));

        // deserialized conditions keep the raw value but evaluate the same way
        let raw = Condition::Item {
            ids: vec![526],
            quantity: 0,
            container: ItemContainer::Inventory,
        };
        assert!(!raw.evaluate(&GameSnapshot::new()));
        assert!(raw.evaluate(&GameSnapshot::new().with_item(526, 1)));
    }
}
