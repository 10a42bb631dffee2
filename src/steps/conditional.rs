//! Conditional steps
//!
//! A [`ConditionalStep`] is an ordered decision table: entries are checked in
//! insertion order and the first whose condition holds wins, so authors list
//! the most specific situation first. When nothing matches the default step
//! is used. The table holds no state of its own; it is re-evaluated from
//! scratch on every game-state change.

use std::sync::Arc;

use super::step::{QuestStep, Step, StepId};
use super::template::TextTemplate;
use crate::conditions::Condition;
use crate::requirements::Requirement;
use crate::state::GameSnapshot;
use crate::{QuestEngineError, Result};

/// Default limit on nested conditional steps
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 16;

/// A (condition, step) row of a decision table
#[derive(Debug, Clone)]
pub struct StepEntry {
    pub condition: Condition,
    pub step: Arc<QuestStep>,
}

/// A step that picks one of several steps from live game state
#[derive(Debug, Clone)]
pub struct ConditionalStep {
    base: Step,
    entries: Vec<StepEntry>,
    default: Arc<QuestStep>,
}

impl ConditionalStep {
    /// Create a conditional step that falls back to `default`
    pub fn new(
        id: impl Into<StepId>,
        text: impl Into<TextTemplate>,
        default: impl Into<Arc<QuestStep>>,
    ) -> Self {
        Self {
            base: Step::new(id, text),
            entries: Vec::new(),
            default: default.into(),
        }
    }

    /// Append an entry; it only applies when every earlier entry fails
    pub fn with_step(mut self, condition: Condition, step: impl Into<Arc<QuestStep>>) -> Self {
        self.add_step(condition, step);
        self
    }

    pub fn add_step(&mut self, condition: Condition, step: impl Into<Arc<QuestStep>>) {
        self.entries.push(StepEntry {
            condition,
            step: step.into(),
        });
    }

    pub fn with_text_line(mut self, line: impl Into<String>) -> Self {
        self.base = self.base.with_text_line(line);
        self
    }

    pub fn with_lock(mut self, lock: Requirement) -> Self {
        self.base = self.base.with_lock(lock);
        self
    }

    pub fn id(&self) -> &StepId {
        self.base.id()
    }

    /// The step this conditional step is in its own right
    pub fn base(&self) -> &Step {
        &self.base
    }

    pub fn entries(&self) -> &[StepEntry] {
        &self.entries
    }

    pub fn default_step(&self) -> &Arc<QuestStep> {
        &self.default
    }

    /// Pick the entry for this level only, without descending
    pub fn select(&self, snapshot: &GameSnapshot) -> &Arc<QuestStep> {
        self.entries
            .iter()
            .find(|entry| entry.condition.evaluate(snapshot))
            .map(|entry| &entry.step)
            .unwrap_or(&self.default)
    }

    /// Resolve to a displayable step using the default depth limit
    ///
    /// Nesting beyond the limit is logged and resolves to this step's own
    /// text instead.
    pub fn resolve(&self, snapshot: &GameSnapshot) -> &Step {
        self.resolve_bounded(snapshot, DEFAULT_MAX_RESOLVE_DEPTH)
    }

    pub fn resolve_bounded(&self, snapshot: &GameSnapshot, max_depth: usize) -> &Step {
        match self.try_resolve(snapshot, max_depth) {
            Ok(step) => step,
            Err(e) => {
                log::error!("{}; showing '{}' instead", e, self.base.id());
                &self.base
            }
        }
    }

    /// Resolve to a displayable step, descending into nested conditional steps
    ///
    /// `max_depth` is the number of nested conditional steps allowed below
    /// this one.
    pub fn try_resolve(&self, snapshot: &GameSnapshot, max_depth: usize) -> Result<&Step> {
        let mut current = self;
        let mut depth = 0;

        loop {
            match current.select(snapshot).as_ref() {
                QuestStep::Detailed(step) => return Ok(step),
                QuestStep::Conditional(nested) => {
                    depth += 1;
                    if depth > max_depth {
                        return Err(QuestEngineError::ResolutionDepthExceeded {
                            step: self.base.id().to_string(),
                            depth: max_depth,
                        });
                    }
                    current = nested;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::ComparisonOp;

    fn flag(id: u32) -> Condition {
        Condition::varbit(id, ComparisonOp::Equal, 1)
    }

    #[test]
    fn test_first_match_wins() {
        let step = ConditionalStep::new("table", "Table", Step::new("default", "Default"))
            .with_step(flag(1), Step::new("first", "First"))
            .with_step(flag(2), Step::new("second", "Second"));

        let both = GameSnapshot::new().with_varbit(1, 1).with_varbit(2, 1);
        assert_eq!(step.resolve(&both).id().as_str(), "first");

        let second_only = GameSnapshot::new().with_varbit(2, 1);
        assert_eq!(step.resolve(&second_only).id().as_str(), "second");
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let step = ConditionalStep::new("table", "Table", Step::new("default", "Default"))
            .with_step(flag(1), Step::new("first", "First"));

        assert_eq!(step.resolve(&GameSnapshot::new()).id().as_str(), "default");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let step = ConditionalStep::new("table", "Table", Step::new("default", "Default"))
            .with_step(flag(1), Step::new("first", "First"))
            .with_step(flag(2), Step::new("second", "Second"));
        let snapshot = GameSnapshot::new().with_varbit(2, 1);

        let a = step.resolve(&snapshot);
        let b = step.resolve(&snapshot);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_nested_resolution() {
        let inner = ConditionalStep::new("inner", "Inner", Step::new("inner-default", "Inner default"))
            .with_step(flag(2), Step::new("inner-two", "Inner two"));
        let outer = ConditionalStep::new("outer", "Outer", Step::new("outer-default", "Outer default"))
            .with_step(flag(1), inner);

        let snapshot = GameSnapshot::new().with_varbit(1, 1).with_varbit(2, 1);
        assert_eq!(outer.resolve(&snapshot).id().as_str(), "inner-two");

        let snapshot = GameSnapshot::new().with_varbit(1, 1);
        assert_eq!(outer.resolve(&snapshot).id().as_str(), "inner-default");
    }

    fn nested_chain(levels: usize) -> ConditionalStep {
        let mut step = ConditionalStep::new("level-0", "Level 0", Step::new("leaf", "Leaf"));
        for i in 1..=levels {
            step = ConditionalStep::new(format!("level-{}", i), "Level", step);
        }
        step
    }

    #[test]
    fn test_depth_limit_strict() {
        let chain = nested_chain(4);
        let snapshot = GameSnapshot::new();

        assert_eq!(chain.try_resolve(&snapshot, 4).unwrap().id().as_str(), "leaf");

        let err = chain.try_resolve(&snapshot, 3).unwrap_err();
        assert!(matches!(
            err,
            QuestEngineError::ResolutionDepthExceeded { ref step, depth: 3 } if step == "level-4"
        ));
    }

    #[test]
    fn test_depth_limit_degrades_to_own_step() {
        let chain = nested_chain(4);
        let resolved = chain.resolve_bounded(&GameSnapshot::new(), 2);
        assert_eq!(resolved.id().as_str(), "level-4");
        assert_eq!(resolved.display_text(&GameSnapshot::new()), "Level");
    }
}
