//! Cached requirement colors for the panel

use std::sync::Arc;
use std::time::Duration;

use super::ttl::TtlCache;
use crate::core::QuestEngine;
use crate::requirements::{Color, ColorScheme, Requirement};
use crate::state::GameSnapshot;
use crate::Result;

/// Source of full game snapshots
pub trait SnapshotSource: Send + Sync {
    fn load_snapshot(&self) -> Result<GameSnapshot>;
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for Arc<T> {
    fn load_snapshot(&self) -> Result<GameSnapshot> {
        (**self).load_snapshot()
    }
}

/// Requirement colors keyed by requirement content
///
/// Stale colors are recomputed together from a single snapshot. The whole
/// cache is dropped when the active quest changes; see
/// [`invalidate_on_quest_change`](Self::invalidate_on_quest_change).
pub struct RequirementColorCache<S: SnapshotSource> {
    source: S,
    scheme: ColorScheme,
    cache: TtlCache<String, Option<Color>>,
}

impl<S: SnapshotSource> RequirementColorCache<S> {
    pub fn new(source: S, scheme: ColorScheme, ttl: Duration) -> Self {
        Self {
            source,
            scheme,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Color of one requirement, `None` while it is hidden
    pub fn color(&self, requirement: &Requirement) -> Option<Color> {
        self.colors(std::slice::from_ref(requirement))
            .pop()
            .flatten()
    }

    /// Colors of several requirements, in the same order
    ///
    /// If the snapshot cannot be fetched, stale requirements show as
    /// unsatisfied until the next refresh.
    pub fn colors(&self, requirements: &[Requirement]) -> Vec<Option<Color>> {
        let mut colors: Vec<Option<Option<Color>>> = requirements
            .iter()
            .map(|req| self.cache.get_fresh(&req.cache_key()))
            .collect();

        if colors.iter().any(Option::is_none) {
            match self.source.load_snapshot() {
                Ok(snapshot) => {
                    for (slot, req) in colors.iter_mut().zip(requirements) {
                        if slot.is_none() {
                            let color = req.color(&snapshot, &self.scheme);
                            self.cache.insert(req.cache_key(), color);
                            *slot = Some(color);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Could not refresh requirement colors: {}", e);
                    for slot in colors.iter_mut().filter(|slot| slot.is_none()) {
                        *slot = Some(Some(self.scheme.unsatisfied));
                    }
                }
            }
        }

        colors.into_iter().map(Option::flatten).collect()
    }

    /// Compute and store colors from a snapshot already at hand
    pub fn prime(&self, requirements: &[Requirement], snapshot: &GameSnapshot) {
        for req in requirements {
            self.cache.insert(req.cache_key(), req.color(snapshot, &self.scheme));
        }
    }

    pub fn invalidate(&self, requirement: &Requirement) {
        self.cache.invalidate(&requirement.cache_key());
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: SnapshotSource + 'static> RequirementColorCache<S> {
    /// Drop every cached color whenever `engine` switches quests
    pub fn invalidate_on_quest_change(self: &Arc<Self>, engine: &QuestEngine) {
        let cache = Arc::downgrade(self);
        engine.on_quest_changed(Box::new(move |event| {
            if let Some(cache) = cache.upgrade() {
                log::debug!("Active quest now {:?}; clearing requirement colors", event.current);
                cache.invalidate_all();
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::{ComparisonOp, Condition};
    use crate::QuestEngineError;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SPADE: u32 = 1265;

    struct MockSource {
        snapshot: Mutex<Option<GameSnapshot>>,
        loads: AtomicUsize,
    }

    impl MockSource {
        fn new(snapshot: Option<GameSnapshot>) -> Self {
            Self {
                snapshot: Mutex::new(snapshot),
                loads: AtomicUsize::new(0),
            }
        }
    }

    impl SnapshotSource for MockSource {
        fn load_snapshot(&self) -> Result<GameSnapshot> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.snapshot.lock().clone().ok_or(QuestEngineError::BridgeTimeout(300))
        }
    }

    fn spade() -> Requirement {
        Requirement::item("Spade", SPADE, 1)
    }

    #[test]
    fn test_colors_from_one_snapshot() {
        let source = MockSource::new(Some(GameSnapshot::new().with_item(SPADE, 1)));
        let cache = RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60));
        let reqs = vec![spade(), Requirement::item("Rope", 954, 1)];

        assert_eq!(cache.colors(&reqs), vec![Some(Color::GREEN), Some(Color::RED)]);
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 1);

        // cached
        *cache.source().snapshot.lock() = Some(GameSnapshot::new());
        assert_eq!(cache.color(&reqs[0]), Some(Color::GREEN));
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 1);

        cache.invalidate_all();
        assert_eq!(cache.color(&reqs[0]), Some(Color::RED));
    }

    #[test]
    fn test_hidden_requirement_has_no_color() {
        let gated = spade().shown_when(Condition::varbit(116, ComparisonOp::GreaterThanOrEqual, 3));
        let source = MockSource::new(Some(GameSnapshot::new().with_item(SPADE, 1)));
        let cache = RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60));

        assert_eq!(cache.color(&gated), None);
    }

    #[test]
    fn test_failed_snapshot_shows_unsatisfied() {
        let source = MockSource::new(None);
        let cache = RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60));

        assert_eq!(cache.color(&spade()), Some(Color::RED));
        // failures are not cached
        cache.color(&spade());
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_prime_skips_source() {
        let source = MockSource::new(None);
        let cache = RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60));

        cache.prime(&[spade()], &GameSnapshot::new().with_item(SPADE, 1));
        assert_eq!(cache.color(&spade()), Some(Color::GREEN));
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 0);

        cache.invalidate(&spade());
        assert_eq!(cache.color(&spade()), Some(Color::RED));
    }

    #[test]
    fn test_same_name_different_quantity() {
        let source = MockSource::new(Some(GameSnapshot::new().with_item(526, 1)));
        let cache = RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60));
        let reqs = vec![Requirement::item("Bones", 526, 3), Requirement::item("Bones", 526, 1)];

        let fresh = cache.colors(&reqs);
        assert_eq!(fresh, vec![Some(Color::RED), Some(Color::GREEN)]);
        assert_eq!(cache.colors(&reqs), fresh);
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_quest_change_clears_colors() {
        use crate::core::Quest;
        use crate::state::QuestVar;

        let engine = QuestEngine::default();
        engine.register_quest(Quest::new("shilo-village", "Shilo Village", QuestVar::Varbit(116)));
        engine.register_quest(Quest::new("jungle-potion", "Jungle Potion", QuestVar::VarPlayer(175)));

        let source = MockSource::new(Some(GameSnapshot::new()));
        let cache = Arc::new(RequirementColorCache::new(source, ColorScheme::default(), Duration::from_secs(60)));
        cache.invalidate_on_quest_change(&engine);

        engine.set_active_quest(&"shilo-village".into()).unwrap();
        assert_eq!(cache.color(&spade()), Some(Color::RED));

        *cache.source().snapshot.lock() = Some(GameSnapshot::new().with_item(SPADE, 1));
        assert_eq!(cache.color(&spade()), Some(Color::RED));

        engine.set_active_quest(&"jungle-potion".into()).unwrap();
        assert_eq!(cache.color(&spade()), Some(Color::GREEN));
        assert_eq!(cache.source().loads.load(Ordering::SeqCst), 2);

        // a dropped cache leaves the engine callback inert
        drop(cache);
        engine.clear_active_quest();
    }
}
