//! Running the structural diff over every pair and tracked path

use crate::config::DEFAULT_EXTENSIONS;
use crate::differ::StructuralDiff;
use crate::error::{Result, SnapdiffError};
use crate::hash::files_identical;
use crate::parser::{DiffRecord, DEFAULT_DETAIL_SEPARATOR};
use crate::progress::ProgressReporter;
use crate::sequencer::SnapshotPair;
use crate::sink::RecordSink;
use crate::universe::{ExtensionFilter, FileUniverse};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One (pair, path) comparison whose files exist on both sides
#[derive(Debug, Clone)]
pub struct DiffTask {
    pub file: String,
    pub older_snapshot: String,
    pub newer_snapshot: String,
    pub older_path: PathBuf,
    pub newer_path: PathBuf,
}

/// A diff invocation that did not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationFailure {
    pub file: String,
    pub older: String,
    pub newer: String,
    pub error: String,
}

/// Counters for the diff stage of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationReport {
    pub pairs: usize,
    pub invocations: usize,
    pub identical: usize,
    pub skipped_missing: usize,
    pub changed_files: usize,
    pub records_written: usize,
    pub failures: Vec<InvocationFailure>,
}

impl InvocationReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Turn collected failures into a single error
    pub fn into_result(self) -> Result<Self> {
        if self.has_failures() {
            Err(SnapdiffError::DiffFailures {
                count: self.failures.len(),
            })
        } else {
            Ok(self)
        }
    }
}

enum TaskOutcome {
    Identical,
    Records(Vec<DiffRecord>),
    Failed(InvocationFailure),
}

/// Drives a [`StructuralDiff`] over pairs × tracked paths
pub struct DiffInvoker<D: StructuralDiff> {
    differ: D,
    unpack_root: PathBuf,
    filter: ExtensionFilter,
    separator: String,
    skip_identical: bool,
    pool: ThreadPool,
}

impl<D: StructuralDiff> DiffInvoker<D> {
    pub fn new(differ: D, unpack_root: impl Into<PathBuf>, workers: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("snapdiff-worker-{}", i))
            .build()?;

        Ok(Self {
            differ,
            unpack_root: unpack_root.into(),
            filter: ExtensionFilter::new(DEFAULT_EXTENSIONS, false),
            separator: DEFAULT_DETAIL_SEPARATOR.to_string(),
            skip_identical: true,
            pool,
        })
    }

    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_skip_identical(mut self, skip_identical: bool) -> Self {
        self.skip_identical = skip_identical;
        self
    }

    fn snapshot_path(&self, snapshot: &str, file: &str) -> PathBuf {
        self.unpack_root.join(snapshot).join(file)
    }

    /// Tasks for one pair, plus the number of tracked paths missing on either side
    pub fn plan_tasks(&self, pair: &SnapshotPair, universe: &FileUniverse) -> (Vec<DiffTask>, usize) {
        let mut tasks = Vec::new();
        let mut skipped = 0;

        for file in universe.tracked(&self.filter) {
            let older_path = self.snapshot_path(&pair.older, file);
            let newer_path = self.snapshot_path(&pair.newer, file);

            if !older_path.is_file() || !newer_path.is_file() {
                skipped += 1;
                continue;
            }

            tasks.push(DiffTask {
                file: file.to_string(),
                older_snapshot: pair.older.clone(),
                newer_snapshot: pair.newer.clone(),
                older_path,
                newer_path,
            });
        }

        (tasks, skipped)
    }

    /// Diff every pair and append the resulting records to `sink`.
    ///
    /// Failed invocations are collected in the report; only sink errors abort.
    pub fn run(
        &self,
        pairs: &[SnapshotPair],
        universe: &FileUniverse,
        sink: &dyn RecordSink,
        progress: &mut ProgressReporter,
    ) -> Result<InvocationReport> {
        let mut report = InvocationReport {
            pairs: pairs.len(),
            ..Default::default()
        };

        for pair in pairs {
            let (tasks, skipped) = self.plan_tasks(pair, universe);
            report.skipped_missing += skipped;
            log::debug!("{}: {} file(s) to compare, {} skipped", pair, tasks.len(), skipped);

            progress.start_pair(&pair.to_string(), tasks.len() as u64);
            let outcomes: Vec<TaskOutcome> = self
                .pool
                .install(|| tasks.par_iter().map(|task| self.execute(task)).collect());

            for outcome in outcomes {
                match outcome {
                    TaskOutcome::Identical => report.identical += 1,
                    TaskOutcome::Records(records) => {
                        report.invocations += 1;
                        if !records.is_empty() {
                            report.changed_files += 1;
                        }
                        for record in &records {
                            sink.append(record)?;
                        }
                        report.records_written += records.len();
                    }
                    TaskOutcome::Failed(failure) => {
                        report.invocations += 1;
                        report.failures.push(failure);
                    }
                }
            }
            sink.flush()?;
            progress.finish_pair();
        }

        Ok(report)
    }

    fn execute(&self, task: &DiffTask) -> TaskOutcome {
        match self.compare(task) {
            Ok(Some(records)) => TaskOutcome::Records(records),
            Ok(None) => TaskOutcome::Identical,
            Err(e) => {
                log::warn!(
                    "Diff of {} between {} and {} failed: {}",
                    task.file, task.older_snapshot, task.newer_snapshot, e
                );
                TaskOutcome::Failed(InvocationFailure {
                    file: task.file.clone(),
                    older: task.older_snapshot.clone(),
                    newer: task.newer_snapshot.clone(),
                    error: e.to_string(),
                })
            }
        }
    }

    /// `None` when the files are byte-identical and the diff was skipped
    fn compare(&self, task: &DiffTask) -> Result<Option<Vec<DiffRecord>>> {
        if self.skip_identical && files_identical(&task.older_path, &task.newer_path)? {
            return Ok(None);
        }

        let stanzas = self.differ.diff(&task.older_path, &task.newer_path)?;
        let records = stanzas
            .iter()
            .map(|stanza| stanza.to_record(&task.file, &task.newer_snapshot, &self.separator))
            .collect();

        Ok(Some(records))
    }
}
