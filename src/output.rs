//! Output formatting utilities

use crate::error::Result;
use crate::pipeline::RunManifest;
use crate::sequencer::SnapshotPair;

/// Pretty printer for snapdiff output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the summary of a finished run
    pub fn print_run_summary(manifest: &RunManifest) {
        let report = &manifest.report;
        let elapsed = manifest.finished - manifest.started;

        println!("🔍 Run {} ({} pairing)", manifest.run_id, manifest.pairing);
        println!("├─ Snapshots: {}", manifest.snapshots.len());
        println!("├─ Tracked paths: {} of {} members", manifest.tracked_paths, manifest.member_paths);
        println!("├─ Pairs compared: {}", report.pairs);
        println!("├─ Diff invocations: {}", report.invocations);
        println!("├─ Identical files: {}", report.identical);
        println!("├─ Skipped (missing on one side): {}", report.skipped_missing);
        println!("├─ Changed files: {}", report.changed_files);
        println!("├─ Records written: {}", report.records_written);
        println!("├─ Elapsed: {}", format_millis(elapsed.num_milliseconds()));

        if report.failures.is_empty() {
            println!("└─ ✅ Failures: none");
        } else {
            println!("└─ ❌ Failures: {}", report.failures.len());
            for (i, failure) in report.failures.iter().enumerate() {
                let prefix = if i == report.failures.len() - 1 { "   └─" } else { "   ├─" };
                println!("{} {} ({} → {}): {}", prefix, failure.file, failure.older, failure.newer, failure.error);
            }
        }

        println!();
        println!("💾 Records: {}", manifest.output.display());
    }

    /// Print the archives found and the comparison plan
    pub fn print_pair_plan(archives: &[String], pairs: &[SnapshotPair]) {
        if archives.is_empty() {
            println!("No archives found.");
            return;
        }

        println!("📦 Archives:");
        for (i, archive) in archives.iter().enumerate() {
            let prefix = if i == archives.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, archive);
        }

        if pairs.is_empty() {
            println!("No pairs to compare.");
            return;
        }

        println!("🔗 Pairs:");
        for (i, pair) in pairs.iter().enumerate() {
            let prefix = if i == pairs.len() - 1 { "└─" } else { "├─" };
            println!("{} {}", prefix, pair);
        }
    }

    /// Print previous runs
    pub fn print_run_list(runs: &[RunManifest]) {
        if runs.is_empty() {
            println!("No runs found.");
            return;
        }

        println!("📜 Runs:");
        for (i, run) in runs.iter().enumerate() {
            let prefix = if i == runs.len() - 1 { "└─" } else { "├─" };
            let status = if run.report.failures.is_empty() { "✅" } else { "❌" };
            println!(
                "{} {} {} {} snapshots, {} records",
                prefix,
                status,
                run.run_id,
                run.snapshots.len(),
                run.report.records_written
            );
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Format the comparison plan as JSON
    pub fn format_pair_plan(archives: &[String], pairs: &[SnapshotPair]) -> Result<String> {
        let json = serde_json::json!({
            "archives": archives,
            "pairs": pairs,
        });
        Ok(serde_json::to_string_pretty(&json)?)
    }
}

/// Format a duration in milliseconds for humans
fn format_millis(millis: i64) -> String {
    if millis < 1000 {
        format!("{} ms", millis.max(0))
    } else {
        format!("{:.1} s", millis as f64 / 1000.0)
    }
}
