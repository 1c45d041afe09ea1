//! ITS-tools logs, used as reference for state counts and reachability times.

use crate::{
    error::IngestError,
    scan::{Capture, LineScanner, Trigger},
};
use std::path::Path;

/// Header of the statistics table ITS-tools prints once the state space is built
pub const STATS_HEADER: &str = "Model ,|S| ,Time ,Mem(kb) ,fin. SDD ,fin. DDD ,peak SDD ,peak DDD ,SDD Hom ,SDD cache peak ,DDD Hom ,DDD cachepeak ,SHom cache";

/// Teamcity report line of a finished deadlock search, the duration is given in ms
pub const DEADLOCK_FINISHED: &str = "##teamcity[testFinished name='all' duration='";

/// Reachability type reported for deadlock searches
pub const DEADLOCK_TYPE: &str = "RD";

/// Values are kept as printed by ITS-tools after validating they are numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItsStats {
    pub benchmark: String,
    pub time: String,
    pub memory_kb: String,
    pub states: String,
}

impl ItsStats {
    pub const HEADER: [&'static str; 4] = ["benchmark", "time", "memory_kb", "states"];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.benchmark.clone(),
            self.time.clone(),
            self.memory_kb.clone(),
            self.states.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItsDeadlock {
    pub benchmark: String,
    pub reach_time: f64,
}

impl ItsDeadlock {
    pub const HEADER: [&'static str; 5] =
        ["benchmark", "type", "reach_time", "memory_kb", "final_states"];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.benchmark.clone(),
            DEADLOCK_TYPE.to_owned(),
            self.reach_time.to_string(),
            "0".to_owned(),
            "0".to_owned(),
        ]
    }
}

/// One row per statistics table in `text`
pub fn parse_stats(path: &Path, benchmark: &str, text: &str) -> Result<Vec<ItsStats>, IngestError> {
    LineScanner::new(Trigger::Exact(STATS_HEADER), Capture::Next)
        .scan(text)
        .into_iter()
        .map(|(line, captured)| {
            let malformed = |reason: String| IngestError::Malformed {
                path: path.to_path_buf(),
                line,
                reason,
            };
            let columns: Vec<&str> = captured.split(',').map(str::trim).collect();

            if columns.len() < 4 {
                return Err(malformed(format!(
                    "expected at least 4 columns, found {}",
                    columns.len()
                )));
            }

            for (index, name) in [(1, "states"), (2, "time"), (3, "memory")] {
                if columns[index].parse::<f64>().is_err() {
                    return Err(malformed(format!("invalid {name} '{}'", columns[index])));
                }
            }

            Ok(ItsStats {
                benchmark: benchmark.to_owned(),
                time: columns[2].to_owned(),
                memory_kb: columns[3].to_owned(),
                states: columns[1].to_owned(),
            })
        })
        .collect()
}

/// One row per finished deadlock search in `text`
pub fn parse_deadlocks(
    path: &Path,
    benchmark: &str,
    text: &str,
) -> Result<Vec<ItsDeadlock>, IngestError> {
    LineScanner::new(Trigger::Prefix(DEADLOCK_FINISHED), Capture::Trigger)
        .scan(text)
        .into_iter()
        .map(|(line, captured)| {
            let duration = captured[DEADLOCK_FINISHED.len()..].trim_end();
            let duration = duration.strip_suffix("']").unwrap_or(duration);

            let milliseconds: f64 = duration.parse().map_err(|_| IngestError::Malformed {
                path: path.to_path_buf(),
                line,
                reason: format!("invalid duration '{duration}'"),
            })?;

            Ok(ItsDeadlock {
                benchmark: benchmark.to_owned(),
                reach_time: milliseconds / 1000.0,
            })
        })
        .collect()
}
