use serde::Serialize;
use serde_json::Value;

use crate::diff::result::DiffEntry;

/// Change counts per diff entry kind.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffCounts {
    pub modified: usize,
    pub added: usize,
    pub removed: usize,
}

#[derive(Serialize)]
struct DiffDocument<'a> {
    entries: Vec<&'a DiffEntry>,
    counts: DiffCounts,
}

/// Machine-readable diff: the changed entries followed by their counts.
/// Identical entries are left out.
pub fn format_json(entries: &[DiffEntry]) -> Result<Value, serde_json::Error> {
    let mut counts = DiffCounts::default();
    let changes: Vec<&DiffEntry> = entries.iter().filter(|entry| entry.is_change()).collect();
    for entry in &changes {
        match entry {
            DiffEntry::Modified { .. } => counts.modified += 1,
            DiffEntry::Added { .. } => counts.added += 1,
            DiffEntry::Removed { .. } => counts.removed += 1,
            DiffEntry::Identical { .. } => {}
        }
    }
    serde_json::to_value(DiffDocument {
        entries: changes,
        counts,
    })
}
