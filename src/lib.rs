//! Quest Step Engine
//!
//! Decides which instruction a quest helper should show from live game state.
//! Quests map a progress variable to steps; conditional steps refine that
//! choice with ordered tables of conditions over items, skills, variables,
//! zones and widgets.
//!
//! Live state is only readable on the host's client thread. Other threads
//! reach it through [`bridge::ClientThread`], with short-lived caches in
//! [`cache`] to keep panel repaints cheap.

pub mod bridge;
pub mod cache;
pub mod conditions;
pub mod config;
pub mod core;
pub mod error;
pub mod requirements;
pub mod state;
pub mod steps;

// Re-export commonly used types
pub use bridge::ClientThread;
pub use cache::{QuestStateCache, QuestStateLoader, RequirementColorCache, SnapshotSource};
pub use conditions::{ComparisonOp, Condition, LogicType};
pub use config::EngineConfig;
pub use crate::core::{Panel, Quest, QuestChangedEvent, QuestEngine, RequirementSection, StepChangedEvent};
pub use error::{QuestEngineError, Result};
pub use requirements::{Color, ColorScheme, Requirement};
pub use state::{GameClient, GameSnapshot, GameState, QuestId, QuestState, QuestVar, SnapshotClient};
pub use steps::{ConditionalStep, QuestStep, Step, StepId};
