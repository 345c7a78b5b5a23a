//! Pipeline configuration

use crate::differ::{ExternalDiffTool, DEFAULT_TOOL, DEFAULT_TOOL_ARGS};
use crate::error::{Result, SnapdiffError};
use crate::parser::DEFAULT_DETAIL_SEPARATOR;
use crate::sequencer::PairingMode;
use crate::universe::ExtensionFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default per-invocation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Extensions diffed when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &[".json", ".yaml"];

/// Settings for one pipeline run, stored as `.snapdiff/config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tool: String,
    pub tool_args: Vec<String>,
    pub extensions: Vec<String>,
    pub case_insensitive_extensions: bool,
    pub pairing: PairingMode,
    /// 0 means one worker per CPU
    pub jobs: usize,
    pub timeout_secs: u64,
    pub detail_separator: String,
    pub skip_identical: bool,
    pub differences_exit_code: Option<i32>,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tool: DEFAULT_TOOL.to_string(),
            tool_args: DEFAULT_TOOL_ARGS.iter().map(|a| a.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            case_insensitive_extensions: false,
            pairing: PairingMode::default(),
            jobs: 0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            detail_separator: DEFAULT_DETAIL_SEPARATOR.to_string(),
            skip_identical: true,
            differences_exit_code: None,
            show_progress: true,
        }
    }
}

/// Values given on the command line; `None` keeps the configured value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub tool: Option<String>,
    pub tool_args: Vec<String>,
    pub extensions: Vec<String>,
    pub case_insensitive: bool,
    pub pairing: Option<PairingMode>,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub no_skip_identical: bool,
    pub no_progress: bool,
}

impl PipelineConfig {
    /// Load from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            SnapdiffError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(tool) = overrides.tool {
            self.tool = tool;
        }
        if !overrides.tool_args.is_empty() {
            self.tool_args = overrides.tool_args;
        }
        if !overrides.extensions.is_empty() {
            self.extensions = overrides.extensions;
        }
        if overrides.case_insensitive {
            self.case_insensitive_extensions = true;
        }
        if let Some(pairing) = overrides.pairing {
            self.pairing = pairing;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if overrides.no_skip_identical {
            self.skip_identical = false;
        }
        if overrides.no_progress {
            self.show_progress = false;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(SnapdiffError::config("Diff tool must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(SnapdiffError::config("Timeout must be greater than 0"));
        }
        if self.extensions.iter().all(|e| e.trim().trim_start_matches('.').is_empty()) {
            return Err(SnapdiffError::config("At least one file extension is required"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(
            self.extensions.iter().filter(|e| !e.trim().trim_start_matches('.').is_empty()),
            self.case_insensitive_extensions,
        )
    }

    pub fn diff_tool(&self) -> ExternalDiffTool {
        ExternalDiffTool::new(self.tool.clone(), self.tool_args.clone(), self.timeout())
            .with_differences_exit_code(self.differences_exit_code)
    }

    /// Worker count with 0 resolved to the CPU count
    pub fn worker_count(&self) -> usize {
        if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }
}
