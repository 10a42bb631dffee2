//! Live game-state source
//!
//! The host's client object is only safe to read on the privileged client
//! thread. Implementations of [`GameClient`] are moved onto that thread by
//! [`ClientThread`](crate::bridge::ClientThread) and never touched elsewhere.

use super::snapshot::{GameSnapshot, GameState, QuestId, QuestState, QuestVar};

/// Trait that every live game-state source must satisfy
pub trait GameClient: Send + 'static {
    /// Current login state
    fn game_state(&self) -> GameState;

    /// Take a full snapshot of the state the engine evaluates against
    fn snapshot(&self) -> GameSnapshot;

    /// Completion state of a single quest
    /// Default implementation reads it from a full snapshot
    fn quest_state(&self, quest: &QuestId) -> QuestState {
        self.snapshot().quest_state(quest)
    }

    /// Value of a quest progress variable
    fn quest_var(&self, var: QuestVar) -> i32 {
        var.read(&self.snapshot())
    }
}

/// A client backed by a stored snapshot
///
/// Useful for hosts that push state into the engine rather than exposing a
/// live object, and for replaying recorded snapshots.
#[derive(Debug, Clone, Default)]
pub struct SnapshotClient {
    snapshot: GameSnapshot,
}

impl SnapshotClient {
    pub fn new(snapshot: GameSnapshot) -> Self {
        Self { snapshot }
    }

    /// Replace the stored snapshot
    pub fn set_snapshot(&mut self, snapshot: GameSnapshot) {
        self.snapshot = snapshot;
    }

    /// Mutate the stored snapshot in place
    pub fn update(&mut self, f: impl FnOnce(&mut GameSnapshot)) {
        f(&mut self.snapshot);
    }
}

impl GameClient for SnapshotClient {
    fn game_state(&self) -> GameState {
        self.snapshot.game_state
    }

    fn snapshot(&self) -> GameSnapshot {
        self.snapshot.clone()
    }

    fn quest_state(&self, quest: &QuestId) -> QuestState {
        self.snapshot.quest_state(quest)
    }

    fn quest_var(&self, var: QuestVar) -> i32 {
        var.read(&self.snapshot)
    }
}
