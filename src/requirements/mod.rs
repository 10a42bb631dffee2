//! Requirements shown alongside quest steps
//!
//! A `Requirement` wraps a `Condition` with a label, tooltip and a color
//! derived from whether it is satisfied.

mod color;
mod requirement;

pub use color::{Color, ColorScheme};
pub use requirement::{Requirement, RequirementKind, RequirementStatus};
