//! Error types for snapdiff operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapdiffError>;

#[derive(Error, Debug)]
pub enum SnapdiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error in '{name}': {message}")]
    Archive { name: String, message: String },

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Diff tool '{tool}' is unavailable: {message}")]
    ToolUnavailable { tool: String, message: String },

    #[error("Diff tool '{tool}' failed: {message}")]
    DiffTool { tool: String, message: String },

    #[error("Diff tool '{tool}' timed out after {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("{count} diff invocation(s) failed")]
    DiffFailures { count: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl SnapdiffError {
    pub fn archive(name: impl Into<String>, msg: impl ToString) -> Self {
        Self::Archive {
            name: name.into(),
            message: msg.to_string(),
        }
    }

    pub fn workspace(msg: impl Into<String>) -> Self {
        Self::Workspace(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn diff_tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::DiffTool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}
