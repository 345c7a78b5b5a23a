//! End-to-end snapshot diff run

use crate::archive::ArchiveUnpacker;
use crate::config::PipelineConfig;
use crate::differ::{ExternalDiffTool, StructuralDiff};
use crate::error::Result;
use crate::invoker::{DiffInvoker, InvocationReport};
use crate::progress::ProgressReporter;
use crate::sequencer::{plan_pairs, PairingMode, SnapshotPair};
use crate::sink::{JsonLinesSink, RecordSink};
use crate::workspace::{prune_empty_dirs, RunDirs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Summary of a finished run, saved as `manifest.json` in the run directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub format_version: String,
    pub run_id: String,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub tool: String,
    pub pairing: PairingMode,
    pub snapshots: Vec<String>,
    pub member_paths: usize,
    pub tracked_paths: usize,
    pub pairs: Vec<SnapshotPair>,
    pub report: InvocationReport,
}

impl RunManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Unpack → pair → diff → record, for one directory of archives
pub struct Pipeline<D: StructuralDiff> {
    config: PipelineConfig,
    differ: D,
}

impl Pipeline<ExternalDiffTool> {
    /// Pipeline backed by the configured external diff program
    pub fn from_config(config: PipelineConfig) -> Self {
        let differ = config.diff_tool();
        Self { config, differ }
    }
}

impl<D: StructuralDiff> Pipeline<D> {
    pub fn with_differ(config: PipelineConfig, differ: D) -> Self {
        Self { config, differ }
    }

    /// Run over the archives in `input`, appending records to `output`.
    ///
    /// Diff failures are recorded in the returned manifest rather than
    /// aborting; archive and sink errors abort the run.
    pub fn run(self, input: &Path, run: &RunDirs, output: &Path) -> Result<RunManifest> {
        let started = Utc::now();
        let sink = JsonLinesSink::open(output)?;
        let tool = self.differ.name().to_string();

        log::info!("Run {}: unpacking archives from {}", run.id, input.display());
        let unpacked = ArchiveUnpacker::new(&run.snapshots_dir)
            .with_progress(self.config.show_progress)
            .unpack_all(input)?;

        let pairs = plan_pairs(unpacked.snapshots.iter().cloned(), self.config.pairing);
        let filter = self.config.extension_filter();
        let tracked_paths = unpacked.universe.tracked(&filter).count();
        log::info!(
            "Comparing {} pair(s) over {} tracked path(s) ({} pairing)",
            pairs.len(),
            tracked_paths,
            self.config.pairing
        );

        let invoker = DiffInvoker::new(self.differ, &run.snapshots_dir, self.config.worker_count())?
            .with_filter(filter)
            .with_separator(self.config.detail_separator.clone())
            .with_skip_identical(self.config.skip_identical);

        let mut progress = ProgressReporter::new(pairs.len() as u64, self.config.show_progress);
        let report = invoker.run(&pairs, &unpacked.universe, &sink, &mut progress)?;
        progress.finish_all("Snapshot pairs compared");
        sink.flush()?;

        prune_empty_dirs(&run.dir);

        for failure in &report.failures {
            log::error!(
                "{} ({} → {}): {}",
                failure.file, failure.older, failure.newer, failure.error
            );
        }
        log::info!(
            "Wrote {} record(s) for {} changed file(s) to {}",
            report.records_written,
            report.changed_files,
            output.display()
        );

        let manifest = RunManifest {
            format_version: crate::FORMAT_VERSION.to_string(),
            run_id: run.id.clone(),
            started,
            finished: Utc::now(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            tool,
            pairing: self.config.pairing,
            snapshots: unpacked.snapshots.into_iter().collect(),
            member_paths: unpacked.universe.len(),
            tracked_paths,
            pairs,
            report,
        };

        manifest.save(&run.manifest_path)?;

        Ok(manifest)
    }
}
