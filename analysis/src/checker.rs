use crate::{loader::DatasetRegistry, record::DatasetKey};
use std::{collections::BTreeMap, fmt};
use tracing::{info, instrument, warn};

/// Ground truth field that has to agree between runs of the same benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FinalStates,
    FinalNodecount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FinalStates => write!(f, "final_states"),
            Self::FinalNodecount => write!(f, "final_nodecount"),
        }
    }
}

/// A record whose `field` differs from the first value seen for its benchmark
#[derive(Debug, Clone, PartialEq)]
pub struct Disagreement {
    pub benchmark: String,
    pub key: DatasetKey,
    pub field: Field,
    pub expected: f64,
    pub actual: f64,
}

impl fmt::Display for Disagreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not equal for {}: {} != {} ({})",
            self.field, self.benchmark, self.expected, self.actual, self.key
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub key: DatasetKey,
    pub wrong_states: usize,
    pub total: usize,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} \twrong statecount for {}",
            self.wrong_states, self.total, self.key
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyReport {
    pub disagreements: Vec<Disagreement>,
    pub summaries: Vec<TableSummary>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.disagreements.is_empty()
    }

    pub fn of_field(&self, field: Field) -> impl Iterator<Item = &Disagreement> {
        self.disagreements
            .iter()
            .filter(move |disagreement| disagreement.field == field)
    }

    /// emit the full listing followed by the per table summary
    pub fn log(&self) {
        for disagreement in self.disagreements.iter() {
            warn!(
                benchmark = %disagreement.benchmark,
                key = %disagreement.key,
                "{disagreement}"
            );
        }

        for summary in self.summaries.iter() {
            info!("{summary}");
        }
    }
}

/// Cross-checks state and node counts of all loaded tables.
///
/// State counts are compared against the first value seen for a benchmark in any table, node
/// counts against the first value seen within the same table (node counts legitimately differ
/// between diagram types and orderings).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyChecker {
    significant_digits: Option<u32>,
}

impl ConsistencyChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// round state counts to `digits` significant digits before comparing them
    pub fn with_rounding(digits: u32) -> Self {
        Self {
            significant_digits: Some(digits),
        }
    }

    #[instrument(skip_all, level = "info")]
    pub fn check(&self, registry: &DatasetRegistry) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();
        let mut states: BTreeMap<&str, f64> = BTreeMap::new();

        for table in registry.tables() {
            let mut nodes: BTreeMap<&str, u64> = BTreeMap::new();
            let mut wrong_states = 0;

            for record in table.iter() {
                if let Some(value) = record.final_states {
                    let value = self.normalize(value);

                    match states.get(record.benchmark.as_str()) {
                        None => {
                            states.insert(&record.benchmark, value);
                        }
                        Some(&expected) if expected != value => {
                            wrong_states += 1;
                            report.disagreements.push(Disagreement {
                                benchmark: record.benchmark.clone(),
                                key: table.key.clone(),
                                field: Field::FinalStates,
                                expected,
                                actual: value,
                            });
                        }
                        Some(_) => {}
                    }
                }

                if let Some(value) = record.final_nodecount {
                    match nodes.get(record.benchmark.as_str()) {
                        None => {
                            nodes.insert(&record.benchmark, value);
                        }
                        Some(&expected) if expected != value => {
                            report.disagreements.push(Disagreement {
                                benchmark: record.benchmark.clone(),
                                key: table.key.clone(),
                                field: Field::FinalNodecount,
                                expected: expected as f64,
                                actual: value as f64,
                            });
                        }
                        Some(_) => {}
                    }
                }
            }

            report.summaries.push(TableSummary {
                key: table.key.clone(),
                wrong_states,
                total: table.len(),
            });
        }

        report
    }

    fn normalize(&self, value: f64) -> f64 {
        match self.significant_digits {
            Some(digits) => round_significant(value, digits),
            None => value,
        }
    }
}

/// An `f64` never carries more significant digits than this
const MAX_SIGNIFICANT_DIGITS: u32 = 17;

/// Round `value` to `digits` significant digits, non-finite values and zero are kept as is.
///
/// Values too small to scale without overflowing (subnormals) are returned unrounded.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if !value.is_finite() || value == 0.0 || digits == 0 || digits >= MAX_SIGNIFICANT_DIGITS {
        return value;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let exponent = digits as i32 - 1 - magnitude;

    // scale by an exact power of ten in both directions to avoid 0.1-style factors
    let rounded = if exponent >= 0 {
        let scale = 10f64.powi(exponent);
        (value * scale).round() / scale
    } else {
        let scale = 10f64.powi(-exponent);
        (value / scale).round() * scale
    };

    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}
