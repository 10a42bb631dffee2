//! Quest steps
//!
//! - `Step` - a single instruction with optional substeps and lock
//! - `ConditionalStep` - an ordered decision table selecting a step
//! - `QuestStep` - either of the two, shared through `Arc`

mod conditional;
mod step;
mod template;

pub use conditional::{ConditionalStep, StepEntry, DEFAULT_MAX_RESOLVE_DEPTH};
pub use step::{QuestStep, Step, StepId};
pub use template::TextTemplate;
