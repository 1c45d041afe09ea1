use crate::{
    collect::{benchmark_name, collect_logs, read_log},
    error::IngestError,
    its::{parse_deadlocks, parse_stats, ItsDeadlock, ItsStats},
    pnml::{
        merge_hmorph, timing, EncodeTime, HmorphTime, Timing, DDMC_FINISHED, DDMC_SUFFIX_LEN,
        ENCODE_FINISHED,
    },
    scan::Trigger,
};
use csv::Writer;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Characters of the `.log`/ `.out` extension stripped from log file names
pub const LOG_SUFFIX_LEN: usize = 4;

/// Header and rows of an aggregated CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(header: &[&'static str]) -> Self {
        Self {
            header: header.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = Writer::from_writer(writer);

        writer.write_record(&self.header)?;
        for row in self.rows.iter() {
            writer.write_record(row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<(), IngestError> {
        let file = File::create(path).map_err(|source| IngestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.write_to(file).map_err(|source| IngestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// All log aggregations, each turns a folder of tool logs into one CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    ItsStats { logs: PathBuf },
    ItsDeadlocks { logs: PathBuf },
    PnmlEncode { logs: PathBuf },
    Hmorph { encode_logs: PathBuf, ddmc_logs: PathBuf },
}

impl Aggregation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItsStats { .. } => "its",
            Self::ItsDeadlocks { .. } => "its-deadlocks",
            Self::PnmlEncode { .. } => "pnml-encode",
            Self::Hmorph { .. } => "hmorph",
        }
    }

    #[instrument(level = "info")]
    pub fn table(&self) -> Result<Table, IngestError> {
        match self {
            Self::ItsStats { logs } => {
                let mut table = Table::new(&ItsStats::HEADER);

                for path in collect_logs(logs, "*")? {
                    let benchmark = benchmark_name(&path, LOG_SUFFIX_LEN);
                    let text = read_log(&path)?;

                    table.rows.extend(
                        parse_stats(&path, &benchmark, &text)?
                            .iter()
                            .map(ItsStats::record),
                    );
                }

                Ok(table)
            }
            Self::ItsDeadlocks { logs } => {
                let mut table = Table::new(&ItsDeadlock::HEADER);

                for path in collect_logs(logs, "*")? {
                    let benchmark = benchmark_name(&path, LOG_SUFFIX_LEN);
                    let text = read_log(&path)?;

                    table.rows.extend(
                        parse_deadlocks(&path, &benchmark, &text)?
                            .iter()
                            .map(ItsDeadlock::record),
                    );
                }

                Ok(table)
            }
            Self::PnmlEncode { logs } => {
                let mut table = Table::new(&EncodeTime::HEADER);

                for (benchmark, encode_time) in timings(logs, ENCODE_FINISHED, LOG_SUFFIX_LEN)? {
                    table.rows.push(
                        EncodeTime {
                            benchmark,
                            encode_time,
                        }
                        .record(),
                    );
                }

                Ok(table)
            }
            Self::Hmorph {
                encode_logs,
                ddmc_logs,
            } => {
                let encode = timings(encode_logs, ENCODE_FINISHED, LOG_SUFFIX_LEN)?;
                let ddmc = timings(ddmc_logs, DDMC_FINISHED, DDMC_SUFFIX_LEN)?;

                let mut table = Table::new(&HmorphTime::HEADER);
                table.rows.extend(
                    merge_hmorph(encode, ddmc)
                        .iter()
                        .map(HmorphTime::record),
                );

                Ok(table)
            }
        }
    }

    /// Aggregate and write the CSV to `output`, returns the number of rows
    pub fn run(&self, output: &Path) -> Result<usize, IngestError> {
        let table = self.table()?;
        table.write(output)?;

        info!(
            aggregation = self.name(),
            rows = table.len(),
            "Wrote {}",
            output.display()
        );

        Ok(table.len())
    }
}

fn timings(
    logs: &Path,
    finished: Trigger,
    suffix_len: usize,
) -> Result<Vec<(String, Timing)>, IngestError> {
    collect_logs(logs, "*.log")?
        .into_iter()
        .map(|path| {
            let text = read_log(&path)?;

            Ok((benchmark_name(&path, suffix_len), timing(&path, &text, finished)?))
        })
        .collect()
}
