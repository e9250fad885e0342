use serde::Serialize;

use crate::record::FieldValue;

/// A single diff outcome for a record path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DiffEntry {
    /// Value is the same in both records.
    Identical { path: String },
    /// Value present in both but different.
    Modified {
        path: String,
        prior: String,
        planned: String,
    },
    /// Only in the planned record.
    Added { path: String, value: FieldValue },
    /// Only in the prior record.
    Removed { path: String, value: FieldValue },
}

impl DiffEntry {
    pub fn path(&self) -> &str {
        match self {
            DiffEntry::Identical { path }
            | DiffEntry::Modified { path, .. }
            | DiffEntry::Added { path, .. }
            | DiffEntry::Removed { path, .. } => path,
        }
    }

    /// True for every variant except [`DiffEntry::Identical`].
    pub fn is_change(&self) -> bool {
        !matches!(self, DiffEntry::Identical { .. })
    }
}
