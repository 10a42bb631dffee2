//! Core engine abstractions
//!
//! This module contains the main types for tracking a quest:
//! - `Quest` - progress variable, step map, requirements and panels
//! - `QuestEngine` - picks the step to display as game state changes
//! - `StepChangedEvent` - emitted when the displayed step changes
//! - `QuestChangedEvent` - emitted when the active quest is set or cleared

mod events;
mod quest;
mod registry;
mod runner;
mod state;

pub use events::{
    EventHandler, QuestChangedCallback, QuestChangedEvent, StepChangedCallback, StepChangedEvent,
};
pub use quest::{Panel, Quest, RequirementSection};
pub use registry::QuestRegistry;
pub use runner::QuestEngine;
pub use state::{ActiveQuestState, EngineStatus, RequirementView};
