//! Quest step types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::conditional::ConditionalStep;
use super::template::TextTemplate;
use crate::requirements::Requirement;
use crate::state::GameSnapshot;
use crate::Result;

/// Opaque identity of a step, used to detect step changes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One displayable instruction
#[derive(Debug, Clone)]
pub struct Step {
    id: StepId,
    text: TextTemplate,
    extra_text: Vec<String>,
    substeps: Vec<Arc<QuestStep>>,
    lock: Option<Requirement>,
}

impl Step {
    pub fn new(id: impl Into<StepId>, text: impl Into<TextTemplate>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            extra_text: Vec::new(),
            substeps: Vec::new(),
            lock: None,
        }
    }

    /// Append an extra line shown below the main text
    pub fn with_text_line(mut self, line: impl Into<String>) -> Self {
        self.extra_text.push(line.into());
        self
    }

    /// Add an alternate instruction belonging to this step
    pub fn with_substep(mut self, step: impl Into<Arc<QuestStep>>) -> Self {
        self.substeps.push(step.into());
        self
    }

    /// Require `lock` before the step can be entered
    pub fn with_lock(mut self, lock: Requirement) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn id(&self) -> &StepId {
        &self.id
    }

    pub fn text(&self) -> &TextTemplate {
        &self.text
    }

    pub fn substeps(&self) -> &[Arc<QuestStep>] {
        &self.substeps
    }

    pub fn lock(&self) -> Option<&Requirement> {
        self.lock.as_ref()
    }

    /// Main text rendered against the snapshot, followed by any extra lines
    pub fn display_text(&self, snapshot: &GameSnapshot) -> String {
        let mut text = self.text.render(snapshot);
        for line in &self.extra_text {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    /// A step without a lock is always enterable
    ///
    /// Step selection ignores the lock. It only tells the panel to show the
    /// step as locked until the player meets it.
    pub fn is_enterable(&self, snapshot: &GameSnapshot) -> bool {
        self.lock.as_ref().map_or(true, |lock| lock.evaluate(snapshot))
    }

    /// Whether `id` is this step or one of its substeps
    pub fn contains(&self, id: &StepId) -> bool {
        self.id == *id || self.substeps.iter().any(|s| s.contains(id))
    }

    fn collect_latches(&self, snapshot: &GameSnapshot, out: &mut BTreeSet<String>) {
        if let Some(lock) = &self.lock {
            lock.collect_latches(snapshot, out);
        }
        for sub in &self.substeps {
            sub.collect_latches(snapshot, out);
        }
    }
}

/// A node in a quest's step tree
#[derive(Debug, Clone)]
pub enum QuestStep {
    Detailed(Step),
    Conditional(ConditionalStep),
}

impl QuestStep {
    pub fn id(&self) -> &StepId {
        self.base().id()
    }

    /// The step's own id, text and lock
    pub fn base(&self) -> &Step {
        match self {
            QuestStep::Detailed(step) => step,
            QuestStep::Conditional(cond) => cond.base(),
        }
    }

    /// Resolve to the instruction to display, degrading on authoring errors
    pub fn resolve(&self, snapshot: &GameSnapshot) -> &Step {
        match self {
            QuestStep::Detailed(step) => step,
            QuestStep::Conditional(cond) => cond.resolve(snapshot),
        }
    }

    /// Resolve with a nesting limit, failing on authoring errors
    pub fn try_resolve(&self, snapshot: &GameSnapshot, max_depth: usize) -> Result<&Step> {
        match self {
            QuestStep::Detailed(step) => Ok(step),
            QuestStep::Conditional(cond) => cond.try_resolve(snapshot, max_depth),
        }
    }

    /// Resolve with a nesting limit, degrading on authoring errors
    pub fn resolve_bounded(&self, snapshot: &GameSnapshot, max_depth: usize) -> &Step {
        match self {
            QuestStep::Detailed(step) => step,
            QuestStep::Conditional(cond) => cond.resolve_bounded(snapshot, max_depth),
        }
    }

    pub fn contains(&self, id: &StepId) -> bool {
        self.base().contains(id)
    }

    /// Collect keys of latched conditions anywhere in this subtree that hold now
    pub fn collect_latches(&self, snapshot: &GameSnapshot, out: &mut BTreeSet<String>) {
        match self {
            QuestStep::Detailed(step) => step.collect_latches(snapshot, out),
            QuestStep::Conditional(cond) => {
                cond.base().collect_latches(snapshot, out);
                for entry in cond.entries() {
                    entry.condition.collect_latches(snapshot, out);
                    entry.step.collect_latches(snapshot, out);
                }
                cond.default_step().collect_latches(snapshot, out);
            }
        }
    }
}

impl From<Step> for QuestStep {
    fn from(step: Step) -> Self {
        QuestStep::Detailed(step)
    }
}

impl From<ConditionalStep> for QuestStep {
    fn from(step: ConditionalStep) -> Self {
        QuestStep::Conditional(step)
    }
}

impl From<Step> for Arc<QuestStep> {
    fn from(step: Step) -> Self {
        Arc::new(QuestStep::Detailed(step))
    }
}

impl From<ConditionalStep> for Arc<QuestStep> {
    fn from(step: ConditionalStep) -> Self {
        Arc::new(QuestStep::Conditional(step))
    }
}
