use crate::diff::result::DiffEntry;

/// Format diff entries as plain text.
pub fn format_text(entries: &[DiffEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    for entry in entries {
        match entry {
            DiffEntry::Identical { path } => lines.push(format!("= {path}")),
            DiffEntry::Modified {
                path,
                prior,
                planned,
            } => {
                lines.push(format!("~ {path}"));
                lines.push(format!("  prior:   {prior}"));
                lines.push(format!("  planned: {planned}"));
            }
            DiffEntry::Added { path, value } => lines.push(format!("+ {path} = {value}")),
            DiffEntry::Removed { path, value } => lines.push(format!("- {path} = {value}")),
        }
    }
    lines.join("\n")
}

/// Format a simple summary of diff counts.
pub fn format_summary(entries: &[DiffEntry]) -> String {
    let mut identical = 0;
    let mut modified = 0;
    let mut added = 0;
    let mut removed = 0;

    for entry in entries {
        match entry {
            DiffEntry::Identical { .. } => identical += 1,
            DiffEntry::Modified { .. } => modified += 1,
            DiffEntry::Added { .. } => added += 1,
            DiffEntry::Removed { .. } => removed += 1,
        }
    }

    format!("identical={identical} modified={modified} added={added} removed={removed}")
}
