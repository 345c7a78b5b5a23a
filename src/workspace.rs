//! Workspace management for snapdiff runs

use crate::config::PipelineConfig;
use crate::error::{Result, SnapdiffError};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the workspace directory
pub const WORKSPACE_DIR: &str = ".snapdiff";

/// Name of the change record stream inside the workspace
pub const OUTPUT_FILE: &str = "diffs.jsonl";

/// Manages the .snapdiff workspace directory
#[derive(Debug, Clone)]
pub struct SnapdiffWorkspace {
    /// Project root directory (where .snapdiff/ lives)
    pub root: PathBuf,
    /// .snapdiff/ directory path
    pub snapdiff_dir: PathBuf,
    /// .snapdiff/runs/ directory path
    pub runs_dir: PathBuf,
}

/// Directories belonging to a single run
#[derive(Debug, Clone)]
pub struct RunDirs {
    pub id: String,
    pub dir: PathBuf,
    pub snapshots_dir: PathBuf,
    pub manifest_path: PathBuf,
}

impl SnapdiffWorkspace {
    /// Find existing workspace or create a new one
    pub fn find_or_create(start_dir: Option<&Path>) -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        let start = start_dir.unwrap_or(&current_dir);

        if let Some(workspace) = Self::find_existing(start)? {
            return Ok(workspace);
        }

        Self::create_new(start.to_path_buf())
    }

    /// Find existing .snapdiff workspace by walking up directory tree
    fn find_existing(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir;

        loop {
            let snapdiff_dir = current.join(WORKSPACE_DIR);
            if snapdiff_dir.is_dir() {
                return Ok(Some(Self::from_root(current.to_path_buf())));
            }

            // A git repository root bounds the search
            if current.join(".git").exists() {
                break;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Create a new workspace in the specified root directory
    pub fn create_new(root: PathBuf) -> Result<Self> {
        let workspace = Self::from_root(root);

        if workspace.snapdiff_dir.exists() && !workspace.snapdiff_dir.is_dir() {
            return Err(SnapdiffError::workspace(format!(
                "{} exists and is not a directory",
                workspace.snapdiff_dir.display()
            )));
        }

        fs::create_dir_all(&workspace.snapdiff_dir)?;
        fs::create_dir_all(&workspace.runs_dir)?;
        workspace.create_config_with_force(false)?;
        workspace.ensure_gitignore()?;

        log::info!("Created snapdiff workspace at: {}", workspace.root.display());

        Ok(workspace)
    }

    /// Create workspace from root directory path
    pub fn from_root(root: PathBuf) -> Self {
        let snapdiff_dir = root.join(WORKSPACE_DIR);
        let runs_dir = snapdiff_dir.join("runs");

        Self {
            root,
            snapdiff_dir,
            runs_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.snapdiff_dir.join("config.json")
    }

    /// Stable location of the change record stream
    pub fn output_path(&self) -> PathBuf {
        self.snapdiff_dir.join(OUTPUT_FILE)
    }

    /// Resolve a user-supplied path relative to the workspace root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Load the workspace config, or defaults when there is none
    pub fn load_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load_or_default(&self.config_path())
    }

    /// Write config.json, keeping an existing one unless forced
    pub fn create_config_with_force(&self, force: bool) -> Result<()> {
        let config_path = self.config_path();

        if config_path.exists() && !force {
            return Ok(());
        }

        fs::create_dir_all(&self.snapdiff_dir)?;
        PipelineConfig::default().save(&config_path)
    }

    /// Ensure .gitignore excludes unpacked snapshots
    pub fn ensure_gitignore(&self) -> Result<()> {
        let gitignore_path = self.root.join(".gitignore");
        let entry = format!("{}/runs/", WORKSPACE_DIR);
        let snapdiff_ignore = format!("# Ignore unpacked snapshots\n{}\n", entry);

        if gitignore_path.exists() {
            let content = fs::read_to_string(&gitignore_path)?;
            if !content.contains(&entry) {
                let new_content = if content.ends_with('\n') {
                    format!("{}\n{}", content, snapdiff_ignore)
                } else {
                    format!("{}\n\n{}", content, snapdiff_ignore)
                };
                fs::write(gitignore_path, new_content)?;
                log::info!("Updated .gitignore with snapdiff entries");
            }
        } else {
            fs::write(gitignore_path, snapdiff_ignore)?;
            log::info!("Created .gitignore with snapdiff entries");
        }

        Ok(())
    }

    /// Allocate a fresh run directory named after the current UTC time
    pub fn new_run(&self) -> Result<RunDirs> {
        let base = Utc::now().format("%Y%m%dT%H%M%S%3fZ").to_string();
        let mut id = base.clone();
        let mut attempt = 1;

        while self.runs_dir.join(&id).exists() {
            id = format!("{}-{}", base, attempt);
            attempt += 1;
        }

        let dir = self.runs_dir.join(&id);
        let snapshots_dir = dir.join("snapshots");
        fs::create_dir_all(&snapshots_dir)?;

        Ok(RunDirs {
            manifest_path: dir.join("manifest.json"),
            id,
            dir,
            snapshots_dir,
        })
    }

    /// Run ids, oldest first
    pub fn list_runs(&self) -> Result<Vec<String>> {
        let mut runs = Vec::new();

        if !self.runs_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.runs_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    runs.push(name.to_string());
                }
            }
        }

        runs.sort();
        Ok(runs)
    }

    pub fn manifest_path(&self, run_id: &str) -> PathBuf {
        self.runs_dir.join(run_id).join("manifest.json")
    }
}

/// Remove empty directories under `root`, deepest first.
///
/// `root` itself is kept. Failures are logged and skipped.
pub fn prune_empty_dirs(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot inspect {} while pruning: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let is_empty = match fs::read_dir(entry.path()) {
            Ok(mut children) => children.next().is_none(),
            Err(e) => {
                log::warn!("Cannot read {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if is_empty {
            match fs::remove_dir(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Failed to remove empty directory {}: {}", entry.path().display(), e),
            }
        }
    }

    if removed > 0 {
        log::debug!("Pruned {} empty director(ies) under {}", removed, root.display());
    }

    removed
}
