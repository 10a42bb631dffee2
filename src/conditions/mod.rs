//! Boolean conditions over game state
//!
//! This module provides the closed set of predicates quest authors combine
//! to describe progress: variable comparisons, item possession, skills,
//! quest states, zones and the composites that join them.

mod evaluator;
mod types;

pub use evaluator::ConditionEvaluator;
pub use types::{ComparisonOp, Condition, LogicType};
