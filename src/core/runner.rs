//! Main quest engine

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use super::events::{
    EventHandler, QuestChangedCallback, QuestChangedEvent, StepChangedCallback, StepChangedEvent,
};
use super::quest::Quest;
use super::registry::QuestRegistry;
use super::state::{ActiveQuestState, EngineStatus, RequirementView};
use crate::config::EngineConfig;
use crate::requirements::RequirementStatus;
use crate::state::{GameSnapshot, GameState, QuestId, QuestState};
use crate::steps::StepId;
use crate::{QuestEngineError, Result};

/// Tracks the active quest and decides which step to show
///
/// The host calls the `on_*` hooks from the client thread with a fresh
/// snapshot; panel code reads the results from any thread.
pub struct QuestEngine {
    config: EngineConfig,
    registry: RwLock<QuestRegistry>,
    active: Mutex<Option<ActiveQuestState>>,
    events: Mutex<EventHandler>,
}

impl QuestEngine {
    pub fn new(config: EngineConfig) -> Self {
        log::info!(
            "Quest engine created (strict authoring: {}, max depth: {})",
            config.strict_authoring,
            config.max_resolve_depth
        );
        Self {
            config,
            registry: RwLock::new(QuestRegistry::new()),
            active: Mutex::new(None),
            events: Mutex::new(EventHandler::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn register_quest(&self, quest: Quest) -> Arc<Quest> {
        let quest = self.registry.write().register(quest);
        log::debug!("Registered quest '{}'", quest.id());
        quest
    }

    pub fn quest(&self, id: &QuestId) -> Option<Arc<Quest>> {
        self.registry.read().get(id)
    }

    /// All registered quests sorted by name
    pub fn quests(&self) -> Vec<Arc<Quest>> {
        self.registry.read().quests()
    }

    pub fn quest_ids(&self) -> Vec<QuestId> {
        self.registry.read().quest_ids()
    }

    /// Start helping with a quest; latches and step tracking start fresh
    pub fn set_active_quest(&self, id: &QuestId) -> Result<Arc<Quest>> {
        let quest = self
            .quest(id)
            .ok_or_else(|| QuestEngineError::UnknownQuest(id.to_string()))?;

        let previous = self
            .active
            .lock()
            .replace(ActiveQuestState::new(quest.clone()))
            .map(|a| a.quest.id().clone());
        log::info!("Active quest set to '{}'", quest.name());

        self.events
            .lock()
            .emit_quest_changed(QuestChangedEvent::new(previous, Some(quest.id().clone())));
        Ok(quest)
    }

    pub fn clear_active_quest(&self) {
        let previous = self.active.lock().take();
        if let Some(previous) = previous {
            log::info!("Stopped helping with '{}'", previous.quest.name());
            self.events
                .lock()
                .emit_quest_changed(QuestChangedEvent::new(Some(previous.quest.id().clone()), None));
        }
    }

    pub fn active_quest(&self) -> Option<Arc<Quest>> {
        self.active.lock().as_ref().map(|a| a.quest.clone())
    }

    /// Register a callback for step changes
    pub fn on_step_changed(&self, callback: StepChangedCallback) {
        self.events.lock().on_step_changed(callback);
    }

    /// Register a callback for the active quest being set or cleared
    pub fn on_quest_changed(&self, callback: QuestChangedCallback) {
        self.events.lock().on_quest_changed(callback);
    }

    pub fn on_game_tick(&self, snapshot: &GameSnapshot) -> Result<Option<StepChangedEvent>> {
        self.update(snapshot)
    }

    pub fn on_var_changed(&self, snapshot: &GameSnapshot) -> Result<Option<StepChangedEvent>> {
        self.update(snapshot)
    }

    pub fn on_item_container_changed(&self, snapshot: &GameSnapshot) -> Result<Option<StepChangedEvent>> {
        self.update(snapshot)
    }

    /// Re-evaluate the active quest against a snapshot
    ///
    /// Returns the change event when the displayed step changed. A progress
    /// value with no registered step keeps the current step.
    fn update(&self, snapshot: &GameSnapshot) -> Result<Option<StepChangedEvent>> {
        let event = {
            let mut guard = self.active.lock();
            let Some(active) = guard.as_mut() else {
                return Ok(None);
            };

            let snapshot = active.merge_latches(snapshot);
            let progress = active.quest.progress(&snapshot);
            active.progress = Some(progress);
            active
                .quest
                .collect_requirement_latches(&snapshot, &mut active.latches);

            let Some(step) = active.quest.step_for(progress).cloned() else {
                log::debug!(
                    "No step for progress {} of '{}'; keeping current step",
                    progress,
                    active.quest.id()
                );
                return Ok(None);
            };

            let max_depth = self.config.max_resolve_depth;
            let resolved = if self.config.strict_authoring {
                step.try_resolve(&snapshot, max_depth)?
            } else {
                step.resolve_bounded(&snapshot, max_depth)
            };

            step.collect_latches(&snapshot, &mut active.latches);

            if active.current_step_id() == Some(resolved.id()) {
                None
            } else {
                let previous = active
                    .current_step
                    .replace(resolved.clone())
                    .map(|s| s.id().clone());
                log::debug!(
                    "Step changed for '{}': {:?} -> {}",
                    active.quest.id(),
                    previous.as_ref().map(StepId::as_str),
                    resolved.id()
                );
                Some(StepChangedEvent::new(
                    active.quest.id().clone(),
                    previous,
                    resolved.id().clone(),
                    progress,
                    resolved.display_text(&snapshot),
                ))
            }
        };

        if let Some(event) = &event {
            self.events.lock().emit(event.clone());
        }
        Ok(event)
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.active
            .lock()
            .as_ref()
            .and_then(|a| a.current_step_id().cloned())
    }

    /// Text of the displayed step rendered against a snapshot
    pub fn current_display_text(&self, snapshot: &GameSnapshot) -> Option<String> {
        let guard = self.active.lock();
        let active = guard.as_ref()?;
        let step = active.current_step.as_ref()?;
        Some(step.display_text(&active.merge_latches(snapshot)))
    }

    /// Whether the displayed step has a lock the player does not meet yet
    pub fn is_current_step_locked(&self, snapshot: &GameSnapshot) -> bool {
        let guard = self.active.lock();
        let Some(active) = guard.as_ref() else {
            return false;
        };
        active
            .current_step
            .as_ref()
            .map_or(false, |step| !step.is_enterable(&active.merge_latches(snapshot)))
    }

    /// Visible requirements of the active quest with their colors
    ///
    /// Quest-level sections come first, then the highlighted panel's own list.
    pub fn requirement_view(&self, snapshot: &GameSnapshot) -> Vec<RequirementView> {
        let guard = self.active.lock();
        let Some(active) = guard.as_ref() else {
            return Vec::new();
        };
        let snapshot = active.merge_latches(snapshot);
        let scheme = &self.config.colors;

        active
            .quest
            .visible_requirements(panel_index(active))
            .filter_map(|(section, req)| {
                let status = req.status(&snapshot);
                let color = req.color_for(status, scheme)?;
                Some(RequirementView {
                    id: req.id.clone(),
                    section,
                    text: req.display_text(),
                    tooltip: req.tooltip.clone(),
                    color,
                    satisfied: status == RequirementStatus::Satisfied,
                })
            })
            .collect()
    }

    /// Index of the panel to highlight
    ///
    /// The panel listing the displayed step (or one of its substeps) wins;
    /// otherwise the first panel covering the current progress value.
    pub fn active_panel_index(&self) -> Option<usize> {
        self.active.lock().as_ref().and_then(panel_index)
    }

    /// Quests to list in the quest picker
    ///
    /// Empty while logged out. Finished quests are hidden unless
    /// `show_completed_quests` is set.
    pub fn filtered_quests(
        &self,
        states: &HashMap<QuestId, QuestState>,
        game_state: GameState,
    ) -> Vec<Arc<Quest>> {
        if game_state != GameState::LoggedIn {
            return Vec::new();
        }

        self.quests()
            .into_iter()
            .filter(|quest| {
                self.config.show_completed_quests
                    || states.get(quest.id()).copied().unwrap_or_default() != QuestState::Finished
            })
            .collect()
    }

    pub fn status(&self) -> EngineStatus {
        let registered_quests = self.registry.read().len();
        match self.active.lock().as_ref() {
            Some(active) => EngineStatus {
                active_quest: Some(active.quest.id().clone()),
                progress: active.progress,
                current_step: active.current_step_id().cloned(),
                latches: active.latches.iter().cloned().collect(),
                registered_quests,
            },
            None => EngineStatus {
                registered_quests,
                ..EngineStatus::default()
            },
        }
    }
}

fn panel_index(active: &ActiveQuestState) -> Option<usize> {
    let panels = active.quest.panels();

    active
        .current_step_id()
        .and_then(|id| panels.iter().position(|p| p.contains_step(id)))
        .or_else(|| {
            let progress = active.progress?;
            panels.iter().position(|p| p.covers_progress(progress))
        })
}

impl Default for QuestEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
