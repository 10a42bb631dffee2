//! Quest registry

use std::collections::HashMap;
use std::sync::Arc;

use super::quest::Quest;
use crate::state::QuestId;

/// Registry of every quest the engine knows about
pub struct QuestRegistry {
    quests: HashMap<QuestId, Arc<Quest>>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self {
            quests: HashMap::new(),
        }
    }

    /// Register a quest, replacing any quest with the same id
    pub fn register(&mut self, quest: Quest) -> Arc<Quest> {
        let quest = Arc::new(quest);
        if self.quests.insert(quest.id().clone(), quest.clone()).is_some() {
            log::warn!("Quest '{}' registered twice; keeping the latest", quest.id());
        }
        quest
    }

    pub fn has_quest(&self, id: &QuestId) -> bool {
        self.quests.contains_key(id)
    }

    pub fn get(&self, id: &QuestId) -> Option<Arc<Quest>> {
        self.quests.get(id).cloned()
    }

    pub fn quest_ids(&self) -> Vec<QuestId> {
        self.quests.keys().cloned().collect()
    }

    /// All quests sorted by name
    pub fn quests(&self) -> Vec<Arc<Quest>> {
        let mut quests: Vec<_> = self.quests.values().cloned().collect();
        quests.sort_by(|a, b| a.name().cmp(b.name()));
        quests
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

impl Default for QuestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::QuestVar;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = QuestRegistry::new();
        registry.register(Quest::new("shilo-village", "Shilo Village", QuestVar::Varbit(116)));
        registry.register(Quest::new("jungle-potion", "Jungle Potion", QuestVar::VarPlayer(175)));

        assert_eq!(registry.len(), 2);
        assert!(registry.has_quest(&"shilo-village".into()));
        assert!(registry.get(&"the-grand-tree".into()).is_none());

        let names: Vec<_> = registry.quests().iter().map(|q| q.name().to_string()).collect();
        assert_eq!(names, vec!["Jungle Potion", "Shilo Village"]);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = QuestRegistry::new();
        registry.register(Quest::new("shilo-village", "Shilo", QuestVar::Varbit(116)));
        registry.register(Quest::new("shilo-village", "Shilo Village", QuestVar::Varbit(116)));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&"shilo-village".into()).unwrap().name(), "Shilo Village");
    }
}
