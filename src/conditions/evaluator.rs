//! Condition evaluation engine

use std::collections::BTreeSet;

use super::Condition;
use crate::state::GameSnapshot;

/// Evaluates conditions against a game snapshot
pub struct ConditionEvaluator<'a> {
    snapshot: &'a GameSnapshot,
}

impl<'a> ConditionEvaluator<'a> {
    /// Create a new evaluator for the given snapshot
    pub fn new(snapshot: &'a GameSnapshot) -> Self {
        Self { snapshot }
    }

    /// Evaluate a single condition
    pub fn evaluate(&self, condition: &Condition) -> bool {
        let snapshot = self.snapshot;

        match condition {
            Condition::Constant(value) => *value,

            Condition::Varbit { id, op, value } => op.compare(&snapshot.varbit(*id), value),

            Condition::VarPlayer { id, op, value } => op.compare(&snapshot.varp(*id), value),

            Condition::Item { ids, quantity, container } => {
                snapshot.item_count(ids, *container) >= (*quantity).max(1)
            }

            Condition::NoItem { container } => snapshot.is_container_empty(*container),

            Condition::FreeInventorySlots { count } => snapshot.free_inventory_slots() >= *count,

            Condition::Skill { skill, level, boosted } => {
                snapshot.skill_level(*skill, *boosted) >= *level
            }

            Condition::QuestState { quest, state } => snapshot.quest_state(quest) == *state,

            Condition::QuestProgress { quest, state } => snapshot.quest_state(quest) >= *state,

            Condition::Zone(zones) => match &snapshot.position {
                Some(pos) => zones.iter().any(|z| z.contains(pos)),
                None => false,
            },

            Condition::WidgetText { group, child, text } => {
                snapshot.widget_contains(*group, *child, text)
            }

            Condition::ItemOnTile { item_id, point } => snapshot.has_ground_item(*item_id, point),

            Condition::Composite { logic, children } => {
                logic.apply(children.iter().map(|c| self.evaluate(c)))
            }

            Condition::Not(inner) => !self.evaluate(inner),

            Condition::AtLeast { n, children } => {
                if *n == 0 {
                    return true;
                }
                let mut matched = 0;
                for child in children {
                    if self.evaluate(child) {
                        matched += 1;
                        if matched >= *n {
                            return true;
                        }
                    }
                }
                false
            }

            Condition::Latched { key, inner } => {
                snapshot.is_latched(key) || self.evaluate(inner)
            }
        }
    }

    /// Collect keys of every latched condition whose inner condition holds now
    ///
    /// Walks the whole tree regardless of short-circuiting so a latch is
    /// recorded even when a sibling already decided the parent's result.
    pub fn collect_latches(&self, condition: &Condition, out: &mut BTreeSet<String>) {
        match condition {
            Condition::Composite { children, .. } | Condition::AtLeast { children, .. } => {
                for child in children {
                    self.collect_latches(child, out);
                }
            }
            Condition::Not(inner) => self.collect_latches(inner, out),
            Condition::Latched { key, inner } => {
                if self.evaluate(inner) {
                    out.insert(key.clone());
                }
                self.collect_latches(inner, out);
            }
            _ => {}
        }
    }
}

impl Condition {
    /// Evaluate this condition against a snapshot
    pub fn evaluate(&self, snapshot: &GameSnapshot) -> bool {
        ConditionEvaluator::new(snapshot).evaluate(self)
    }

    /// Add keys of latched sub-conditions that currently hold to `out`
    pub fn collect_latches(&self, snapshot: &GameSnapshot, out: &mut BTreeSet<String>) {
        ConditionEvaluator::new(snapshot).collect_latches(self, out);
    }
}
