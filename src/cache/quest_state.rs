//! Cached quest completion states
//!
//! Quest list rendering asks for the state of every quest on each repaint.
//! Each of those reads would be a hop to the client thread, so states are
//! kept for a short TTL and refreshed in bulk when they go stale.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::ttl::TtlCache;
use crate::state::{QuestId, QuestState};
use crate::Result;

/// Source of live quest states
pub trait QuestStateLoader: Send + Sync {
    fn load_state(&self, quest: &QuestId) -> Result<QuestState>;

    /// Load several states at once
    ///
    /// Each quest carries its own result so one failure does not spoil the
    /// rest of the batch. Quests missing from the map count as failed.
    fn load_states(&self, quests: &[QuestId]) -> HashMap<QuestId, Result<QuestState>> {
        quests
            .iter()
            .map(|quest| (quest.clone(), self.load_state(quest)))
            .collect()
    }
}

impl<T: QuestStateLoader + ?Sized> QuestStateLoader for Arc<T> {
    fn load_state(&self, quest: &QuestId) -> Result<QuestState> {
        (**self).load_state(quest)
    }

    fn load_states(&self, quests: &[QuestId]) -> HashMap<QuestId, Result<QuestState>> {
        (**self).load_states(quests)
    }
}

/// TTL cache of quest states over a fixed set of known quests
pub struct QuestStateCache<L: QuestStateLoader> {
    loader: L,
    known: HashSet<QuestId>,
    cache: TtlCache<QuestId, QuestState>,
}

impl<L: QuestStateLoader> QuestStateCache<L> {
    pub fn new(loader: L, known_quests: impl IntoIterator<Item = QuestId>, ttl: Duration) -> Self {
        let known: HashSet<QuestId> = known_quests.into_iter().collect();
        let cache = TtlCache::with_capacity(ttl, known.len());
        Self { loader, known, cache }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn is_known(&self, quest: &QuestId) -> bool {
        self.known.contains(quest)
    }

    /// State of one quest; unknown quests and failed loads are `NotStarted`
    pub fn get(&self, quest: &QuestId) -> QuestState {
        if !self.is_known(quest) {
            log::debug!("State requested for unknown quest '{}'", quest);
            return QuestState::NotStarted;
        }

        if let Some(state) = self.cache.get_fresh(quest) {
            return state;
        }

        match self.loader.load_state(quest) {
            Ok(state) => {
                log::debug!("Refreshed state of '{}': {:?}", quest, state);
                self.cache.insert(quest.clone(), state);
                state
            }
            Err(e) => {
                log::error!("Failed to load state of '{}': {}", quest, e);
                QuestState::NotStarted
            }
        }
    }

    /// States of many quests, refreshing every stale entry in one load
    ///
    /// Never fails: unknown quests and failed loads are `NotStarted`. A failed
    /// load only affects its own quest and is retried on the next read.
    pub fn get_all(&self, quests: &[QuestId]) -> HashMap<QuestId, QuestState> {
        let mut states = HashMap::with_capacity(quests.len());
        let mut stale = Vec::new();

        for quest in quests {
            if !self.is_known(quest) {
                states.insert(quest.clone(), QuestState::NotStarted);
                continue;
            }
            match self.cache.get_fresh(quest) {
                Some(state) => {
                    states.insert(quest.clone(), state);
                }
                None => stale.push(quest.clone()),
            }
        }

        if !stale.is_empty() {
            states.extend(self.refresh(&stale));
        }

        states
    }

    /// Load every known quest into the cache
    pub fn prime(&self) {
        let quests: Vec<QuestId> = self.known.iter().cloned().collect();
        self.refresh(&quests);
        log::info!("Primed quest state cache with {} quests", self.cache.len());
    }

    pub fn invalidate(&self, quest: &QuestId) {
        self.cache.invalidate(quest);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    fn refresh(&self, quests: &[QuestId]) -> HashMap<QuestId, QuestState> {
        let mut loaded = self.loader.load_states(quests);
        let mut states = HashMap::with_capacity(quests.len());
        let mut failed = 0;

        for quest in quests {
            let state = match loaded.remove(quest) {
                Some(Ok(state)) => {
                    self.cache.insert(quest.clone(), state);
                    state
                }
                Some(Err(e)) => {
                    log::error!("Failed to load state of '{}': {}", quest, e);
                    failed += 1;
                    QuestState::NotStarted
                }
                None => {
                    log::error!("Loader returned no state for '{}'", quest);
                    failed += 1;
                    QuestState::NotStarted
                }
            };
            states.insert(quest.clone(), state);
        }

        log::debug!("Refreshed {} quest states ({} failed)", quests.len(), failed);
        states
    }
}
