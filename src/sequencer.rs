//! Ordering of snapshots and planning of comparison pairs

use serde::{Deserialize, Serialize};
use std::fmt;

/// How consecutive snapshots are paired for comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingMode {
    /// Each snapshot against its successor, N-1 pairs
    #[default]
    Linear,
    /// Like linear, plus the last snapshot against the first
    Cyclic,
}

impl PairingMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cyclic" => Ok(Self::Cyclic),
            _ => Err(format!("Invalid pairing mode: {}. Use 'linear' or 'cyclic'", s)),
        }
    }
}

impl fmt::Display for PairingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Cyclic => write!(f, "cyclic"),
        }
    }
}

/// An ordered (older, newer) pair of snapshot identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPair {
    pub older: String,
    pub newer: String,
}

impl SnapshotPair {
    pub fn new(older: impl Into<String>, newer: impl Into<String>) -> Self {
        Self {
            older: older.into(),
            newer: newer.into(),
        }
    }
}

impl fmt::Display for SnapshotPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.older, self.newer)
    }
}

/// Sort snapshot names lexicographically and pair them up.
///
/// Archive names are the only ordering signal, so no timestamps are parsed.
/// A lone snapshot is never paired with itself.
pub fn plan_pairs<I, S>(snapshots: I, mode: PairingMode) -> Vec<SnapshotPair>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = snapshots.into_iter().map(Into::into).collect();
    names.sort();
    names.dedup();

    if names.len() < 2 {
        return Vec::new();
    }

    let mut pairs: Vec<SnapshotPair> = names
        .windows(2)
        .map(|w| SnapshotPair::new(w[0].clone(), w[1].clone()))
        .collect();

    if mode == PairingMode::Cyclic {
        pairs.push(SnapshotPair::new(names[names.len() - 1].clone(), names[0].clone()));
    }

    pairs
}
