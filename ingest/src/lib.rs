//! Turn raw tool logs (ITS-tools, pnml-encode, ddmc) into CSV tables next to the benchmark
//! results.

pub mod aggregate;
pub mod collect;
pub mod error;
pub mod its;
pub mod pnml;
pub mod scan;

pub use aggregate::{Aggregation, Table};
pub use error::IngestError;

#[cfg(test)]
mod pnml_test;
