//! # snapdiff
//!
//! Reconstructs what changed between consecutive archived snapshots of
//! structured configuration files and emits the changes as newline-delimited
//! JSON records for a log pipeline.

pub mod cli;
pub mod error;
pub mod config;
pub mod workspace;
pub mod archive;
pub mod universe;
pub mod sequencer;
pub mod parser;
pub mod differ;
pub mod hash;
pub mod invoker;
pub mod sink;
pub mod pipeline;
pub mod commands;
pub mod output;
pub mod progress;

pub use config::PipelineConfig;
pub use differ::{ExternalDiffTool, StructuralDiff};
pub use error::{Result, SnapdiffError};
pub use parser::{DiffRecord, Stanza};
pub use pipeline::{Pipeline, RunManifest};
pub use sequencer::{PairingMode, SnapshotPair};
pub use workspace::SnapdiffWorkspace;

/// Current format version for run manifests
pub const FORMAT_VERSION: &str = "1.0.0";
