//! Parsing of structural diff output into change records
//!
//! The diff tool prints one stanza per structural change, stanzas separated
//! by a blank line. A stanza's first line names the changed field, the second
//! line names the operation and any further lines carry the before/after
//! detail. Stanzas that do not follow this shape are kept as free text.

use serde::{Deserialize, Serialize};

/// Default separator for joining a stanza's detail lines
pub const DEFAULT_DETAIL_SEPARATOR: &str = "\n";

/// One block of diff output describing a single change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    lines: Vec<String>,
}

impl Stanza {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Normalize this stanza into a record for `file` in `snapshot`
    pub fn to_record(&self, file: &str, snapshot: &str, separator: &str) -> DiffRecord {
        match self.lines.as_slice() {
            [only] => DiffRecord::free_text(file, snapshot, only.as_str()),
            [header, operation, detail @ ..] => {
                let field = header.trim();
                let operation = operation.trim();
                if field.is_empty() || operation.is_empty() {
                    log::debug!("Malformed stanza for {} in {}, keeping it as free text", file, snapshot);
                    return DiffRecord::free_text(file, snapshot, self.lines.join(separator));
                }
                DiffRecord::structured(file, snapshot, field, operation, detail.join(separator))
            }
            [] => DiffRecord::free_text(file, snapshot, ""),
        }
    }
}

/// A normalized change, one per output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub file: String,
    pub snapshot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub diff: String,
}

impl DiffRecord {
    pub fn free_text(file: impl Into<String>, snapshot: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            snapshot: snapshot.into(),
            field: None,
            operation: None,
            diff: diff.into(),
        }
    }

    pub fn structured(
        file: impl Into<String>,
        snapshot: impl Into<String>,
        field: impl Into<String>,
        operation: impl Into<String>,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            snapshot: snapshot.into(),
            field: Some(field.into()),
            operation: Some(operation.into()),
            diff: diff.into(),
        }
    }

    pub fn is_structured(&self) -> bool {
        self.field.is_some()
    }
}

/// Split raw diff output on blank lines. Empty output yields no stanzas.
pub fn split_stanzas(output: &str) -> Vec<Stanza> {
    let mut stanzas = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                stanzas.push(Stanza { lines: std::mem::take(&mut current) });
            }
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() {
        stanzas.push(Stanza { lines: current });
    }

    stanzas
}

/// Parse raw diff output for one (pair, path) into records
pub fn parse_diff_output(output: &str, file: &str, snapshot: &str, separator: &str) -> Vec<DiffRecord> {
    split_stanzas(output)
        .iter()
        .map(|stanza| stanza.to_record(file, snapshot, separator))
        .collect()
}
