//! Load, cross-check and compare reachability benchmark results.
//!
//! The pipeline runs in three stages: the [`loader`] reads per-(dataset, configuration) result
//! tables into a [`DatasetRegistry`], the [`checker`] cross-validates state and node counts over
//! every loaded table and the [`compare`] engine joins strategy subsets on benchmark name and
//! derives the values a plotting layer consumes.

pub mod checker;
pub mod compare;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod overhead;
pub mod record;
pub mod reference;
pub mod speedup;
pub mod stats;
pub mod strategy;

pub use checker::{ConsistencyChecker, ConsistencyReport, Disagreement};
pub use compare::{Comparator, Comparison, ComparisonRequest, ComparisonResult, JoinMode, Outcome, Selection};
pub use error::{AnalysisError, MissingSelection};
pub use loader::{DatasetRegistry, LoadOutcome, TableSpec};
pub use record::{DatasetKey, DiagramType, ResultRecord, ResultTable, StrategyId};
pub use strategy::StrategyRegistry;

#[cfg(test)]
mod compare_test;
#[cfg(test)]
mod overhead_test;
#[cfg(test)]
mod record_test;
#[cfg(test)]
mod reference_test;
