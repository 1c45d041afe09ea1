//! Wall times of `pnml-encode` and of ddmc runs on the encoded (hmorph) LDDs, taken from the
//! `time` output at the end of each log.

use crate::{
    error::IngestError,
    scan::{Capture, LineScanner, Trigger},
};
use std::{collections::BTreeMap, fmt, path::Path};

pub const ENCODE_FINISHED: Trigger = Trigger::Prefix("pnml-encode: Result symbolic LTS written to");
pub const DDMC_FINISHED: Trigger = Trigger::Contains("Writing stats to");
pub const REAL_TIME: Trigger = Trigger::Prefix("real\t");

/// Characters following the benchmark name in ddmc log file names
pub const DDMC_SUFFIX_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    Seconds(f64),
    /// did not finish
    Dnf,
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seconds(seconds) => write!(f, "{seconds}"),
            Self::Dnf => write!(f, "DNF"),
        }
    }
}

/// Seconds of a `real\t<m>m<s>s` line, the seconds may use a decimal comma
pub fn parse_real_time(line: &str) -> Option<f64> {
    let value = line.split_whitespace().nth(1)?;
    let (minutes, seconds) = value.split_once('m')?;
    let seconds = seconds.strip_suffix('s')?.replace(',', ".");

    Some(minutes.parse::<f64>().ok()? * 60.0 + seconds.parse::<f64>().ok()?)
}

/// Timing of a log that counts as finished once a line matches `finished`.
///
/// The last `real` line is used; a finished log without one is malformed.
pub fn timing(path: &Path, text: &str, finished: Trigger) -> Result<Timing, IngestError> {
    if !finished.occurs_in(text) {
        return Ok(Timing::Dnf);
    }

    let malformed = |line: usize, reason: String| IngestError::Malformed {
        path: path.to_path_buf(),
        line,
        reason,
    };

    match LineScanner::new(REAL_TIME, Capture::Trigger).scan(text).into_iter().last() {
        Some((line, captured)) => parse_real_time(captured)
            .map(Timing::Seconds)
            .ok_or_else(|| malformed(line, format!("invalid time '{captured}'"))),
        None => Err(malformed(text.lines().count(), "no real time reported".to_owned())),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodeTime {
    pub benchmark: String,
    pub encode_time: Timing,
}

impl EncodeTime {
    pub const HEADER: [&'static str; 2] = ["benchmark", "encode_time"];

    pub fn record(&self) -> Vec<String> {
        vec![self.benchmark.clone(), self.encode_time.to_string()]
    }
}

/// Encode and ddmc time of a benchmark, `None` if there is no log for that side
#[derive(Debug, Clone, PartialEq)]
pub struct HmorphTime {
    pub benchmark: String,
    pub encode_time: Option<Timing>,
    pub ddmc_time: Option<Timing>,
}

impl HmorphTime {
    pub const HEADER: [&'static str; 3] = ["benchmark", "encode_time", "ddmc_time"];

    pub fn record(&self) -> Vec<String> {
        let side = |timing: Option<Timing>| {
            timing.map_or_else(|| "-".to_owned(), |timing| timing.to_string())
        };

        vec![
            self.benchmark.clone(),
            side(self.encode_time),
            side(self.ddmc_time),
        ]
    }
}

/// Union of both sides, encode benchmarks first, then the ones only ddmc ran
pub fn merge_hmorph(
    encode: Vec<(String, Timing)>,
    ddmc: Vec<(String, Timing)>,
) -> Vec<HmorphTime> {
    let mut rows: Vec<HmorphTime> = Vec::with_capacity(encode.len());
    let mut index: BTreeMap<String, usize> = BTreeMap::new();

    for (benchmark, timing) in encode {
        match index.get(&benchmark) {
            Some(&position) => rows[position].encode_time = Some(timing),
            None => {
                index.insert(benchmark.clone(), rows.len());
                rows.push(HmorphTime {
                    benchmark,
                    encode_time: Some(timing),
                    ddmc_time: None,
                });
            }
        }
    }

    for (benchmark, timing) in ddmc {
        match index.get(&benchmark) {
            Some(&position) => rows[position].ddmc_time = Some(timing),
            None => {
                index.insert(benchmark.clone(), rows.len());
                rows.push(HmorphTime {
                    benchmark,
                    encode_time: None,
                    ddmc_time: Some(timing),
                });
            }
        }
    }

    rows
}
