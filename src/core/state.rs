//! Engine state types

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::quest::{Quest, RequirementSection};
use crate::requirements::Color;
use crate::state::{GameSnapshot, QuestId};
use crate::steps::{Step, StepId};

/// Tracking state of the quest currently being helped with
#[derive(Debug, Clone)]
pub struct ActiveQuestState {
    pub quest: Arc<Quest>,
    /// Progress value seen on the last update
    pub progress: Option<i32>,
    /// Step currently displayed
    pub current_step: Option<Step>,
    /// Keys of latched conditions that have held at least once
    pub latches: BTreeSet<String>,
}

impl ActiveQuestState {
    pub fn new(quest: Arc<Quest>) -> Self {
        Self {
            quest,
            progress: None,
            current_step: None,
            latches: BTreeSet::new(),
        }
    }

    pub fn current_step_id(&self) -> Option<&StepId> {
        self.current_step.as_ref().map(Step::id)
    }

    /// The snapshot with this quest's latches folded in
    pub fn merge_latches<'a>(&self, snapshot: &'a GameSnapshot) -> Cow<'a, GameSnapshot> {
        if self.latches.is_subset(&snapshot.latches) {
            Cow::Borrowed(snapshot)
        } else {
            let mut merged = snapshot.clone();
            merged.latches.extend(self.latches.iter().cloned());
            Cow::Owned(merged)
        }
    }
}

/// Point-in-time view of the engine, for hosts and diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub active_quest: Option<QuestId>,
    pub progress: Option<i32>,
    pub current_step: Option<StepId>,
    pub latches: Vec<String>,
    pub registered_quests: usize,
}

/// A requirement ready to be drawn in the panel
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementView {
    pub id: String,
    pub section: RequirementSection,
    pub text: String,
    pub tooltip: Option<String>,
    pub color: Color,
    pub satisfied: bool,
}
