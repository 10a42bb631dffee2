//! Short-lived caches in front of the client thread

mod color;
mod quest_state;
mod ttl;

pub use color::{RequirementColorCache, SnapshotSource};
pub use quest_state::{QuestStateCache, QuestStateLoader};
pub use ttl::TtlCache;
