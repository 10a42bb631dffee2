//! Events emitted by the engine

use std::time::Instant;

use crate::state::QuestId;
use crate::steps::StepId;

/// Event emitted when the displayed step of the active quest changes
#[derive(Debug, Clone)]
pub struct StepChangedEvent {
    pub quest_id: QuestId,
    /// Step shown before the change, `None` right after activation
    pub previous: Option<StepId>,
    pub current: StepId,
    /// Value of the quest's progress variable that selected the step
    pub progress: i32,
    /// Rendered text of the new step
    pub text: String,
    pub timestamp: Instant,
}

impl StepChangedEvent {
    pub fn new(
        quest_id: QuestId,
        previous: Option<StepId>,
        current: StepId,
        progress: i32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            quest_id,
            previous,
            current,
            progress,
            text: text.into(),
            timestamp: Instant::now(),
        }
    }
}

/// Event emitted when the active quest is set, replaced or cleared
#[derive(Debug, Clone)]
pub struct QuestChangedEvent {
    pub previous: Option<QuestId>,
    pub current: Option<QuestId>,
    pub timestamp: Instant,
}

impl QuestChangedEvent {
    pub fn new(previous: Option<QuestId>, current: Option<QuestId>) -> Self {
        Self {
            previous,
            current,
            timestamp: Instant::now(),
        }
    }
}

/// Callback type for step change events
pub type StepChangedCallback = Box<dyn Fn(StepChangedEvent) + Send + Sync>;

/// Callback type for quest change events
pub type QuestChangedCallback = Box<dyn Fn(QuestChangedEvent) + Send + Sync>;

/// Event handler that can have multiple listeners
pub struct EventHandler {
    callbacks: Vec<StepChangedCallback>,
    quest_callbacks: Vec<QuestChangedCallback>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
            quest_callbacks: Vec::new(),
        }
    }

    pub fn on_step_changed(&mut self, callback: StepChangedCallback) {
        self.callbacks.push(callback);
    }

    pub fn on_quest_changed(&mut self, callback: QuestChangedCallback) {
        self.quest_callbacks.push(callback);
    }

    /// Emit an event to all listeners
    pub fn emit(&self, event: StepChangedEvent) {
        for callback in &self.callbacks {
            callback(event.clone());
        }
    }

    pub fn emit_quest_changed(&self, event: QuestChangedEvent) {
        for callback in &self.quest_callbacks {
            callback(event.clone());
        }
    }

    pub fn has_listeners(&self) -> bool {
        !self.callbacks.is_empty() || !self.quest_callbacks.is_empty()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_emit_to_all_listeners() {
        let mut handler = EventHandler::new();
        assert!(!handler.has_listeners());

        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let count = count.clone();
            handler.on_step_changed(Box::new(move |event| {
                assert_eq!(event.current.as_str(), "dig-mound");
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }

        handler.emit(StepChangedEvent::new(
            "shilo-village".into(),
            None,
            "dig-mound".into(),
            2,
            "Dig the mound.",
        ));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_quest_changed_listeners() {
        let mut handler = EventHandler::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let log = seen.clone();
        handler.on_quest_changed(Box::new(move |event| {
            log.lock().push((event.previous, event.current));
        }));
        assert!(handler.has_listeners());

        handler.emit_quest_changed(QuestChangedEvent::new(None, Some("shilo-village".into())));
        handler.emit_quest_changed(QuestChangedEvent::new(Some("shilo-village".into()), None));

        assert_eq!(
            *seen.lock(),
            vec![
                (None, Some(QuestId::from("shilo-village"))),
                (Some(QuestId::from("shilo-village")), None)
            ]
        );
    }
}
