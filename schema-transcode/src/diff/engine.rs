use std::collections::HashSet;

use crate::descriptor::{FieldDescriptor, RecordSchema};
use crate::diff::result::DiffEntry;
use crate::record::{FieldValue, Record};

const MASK: &str = "(sensitive)";

/// Configures record diff behavior.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Include [`DiffEntry::Identical`] rows.
    pub include_identical: bool,
    /// Field names or dotted paths to skip.
    pub ignore_paths: Vec<String>,
}

/// Diff a prior and a planned record with default options.
pub fn diff(prior: &Record, planned: &Record, schema: &RecordSchema) -> Vec<DiffEntry> {
    diff_with_options(prior, planned, schema, &DiffOptions::default())
}

/// Diff a prior and a planned record with custom options.
///
/// Rows of nested tables are matched by the descriptor's `sort_key` when one
/// is declared, positionally otherwise.
pub fn diff_with_options(
    prior: &Record,
    planned: &Record,
    schema: &RecordSchema,
    opts: &DiffOptions,
) -> Vec<DiffEntry> {
    let mut out = Vec::new();
    diff_record(prior, planned, &schema.fields, "", opts, &mut out);
    out
}

fn diff_record(
    prior: &Record,
    planned: &Record,
    fields: &[FieldDescriptor],
    parent: &str,
    opts: &DiffOptions,
    out: &mut Vec<DiffEntry>,
) {
    for field in fields {
        let path = join(parent, &field.name);
        if should_ignore(&path, opts) {
            continue;
        }

        match (prior.get(&field.name), planned.get(&field.name)) {
            (None, None) => {}
            (Some(value), None) => out.push(DiffEntry::Removed {
                path,
                value: masked(value, field),
            }),
            (None, Some(value)) => out.push(DiffEntry::Added {
                path,
                value: masked(value, field),
            }),
            (Some(FieldValue::List(left)), Some(FieldValue::List(right)))
                if field.field_type.is_nested() =>
            {
                let mut ctx = MatchContext {
                    field,
                    parent_path: &path,
                    opts,
                    out: &mut *out,
                };
                match &field.sort_key {
                    Some(key) => match_by_key(key, left, right, &mut ctx),
                    None => match_by_index(left, right, &mut ctx),
                }
            }
            (Some(left), Some(right)) if left != right => out.push(DiffEntry::Modified {
                path,
                prior: render(left, field),
                planned: render(right, field),
            }),
            (Some(_), Some(_)) => {
                if opts.include_identical {
                    out.push(DiffEntry::Identical { path });
                }
            }
        }
    }
}

struct MatchContext<'a, 'b> {
    field: &'a FieldDescriptor,
    parent_path: &'a str,
    opts: &'a DiffOptions,
    out: &'b mut Vec<DiffEntry>,
}

fn match_by_index(left: &[Record], right: &[Record], ctx: &mut MatchContext<'_, '_>) {
    let max = left.len().max(right.len());
    for i in 0..max {
        let row_path = format!("{}.{i}", ctx.parent_path);
        diff_rows(left.get(i), right.get(i), row_path, ctx);
    }
}

fn match_by_key(key: &str, left: &[Record], right: &[Record], ctx: &mut MatchContext<'_, '_>) {
    let right_keys: Vec<Option<&FieldValue>> = right.iter().map(|row| row.get(key)).collect();
    let mut used_right = HashSet::new();

    for (left_idx, left_row) in left.iter().enumerate() {
        let left_key = left_row.get(key);
        let matched = left_key.and_then(|wanted| {
            right_keys
                .iter()
                .enumerate()
                .find(|(idx, candidate)| !used_right.contains(idx) && **candidate == Some(wanted))
                .map(|(idx, _)| idx)
        });

        let row_path = keyed_path(ctx.parent_path, left_key, left_idx);
        match matched {
            Some(right_idx) => {
                used_right.insert(right_idx);
                diff_rows(Some(left_row), Some(&right[right_idx]), row_path, ctx);
            }
            None => diff_rows(Some(left_row), None, row_path, ctx),
        }
    }

    for (right_idx, right_row) in right.iter().enumerate() {
        if used_right.contains(&right_idx) {
            continue;
        }
        let row_path = keyed_path(ctx.parent_path, right_row.get(key), right_idx);
        diff_rows(None, Some(right_row), row_path, ctx);
    }
}

fn diff_rows(
    left: Option<&Record>,
    right: Option<&Record>,
    row_path: String,
    ctx: &mut MatchContext<'_, '_>,
) {
    match (left, right) {
        (Some(l), Some(r)) => {
            let start = ctx.out.len();
            diff_record(l, r, &ctx.field.fields, &row_path, ctx.opts, ctx.out);
            if ctx.opts.include_identical && ctx.out.len() == start {
                ctx.out.push(DiffEntry::Identical { path: row_path });
            }
        }
        (Some(l), None) => ctx.out.push(DiffEntry::Removed {
            path: row_path,
            value: FieldValue::List(vec![l.clone()]),
        }),
        (None, Some(r)) => ctx.out.push(DiffEntry::Added {
            path: row_path,
            value: FieldValue::List(vec![r.clone()]),
        }),
        (None, None) => {}
    }
}

fn keyed_path(parent: &str, key: Option<&FieldValue>, idx: usize) -> String {
    match key {
        Some(FieldValue::String(text)) => format!("{parent}[{text}]"),
        Some(FieldValue::Integer(number)) => format!("{parent}[{number}]"),
        _ => format!("{parent}.{idx}"),
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn should_ignore(path: &str, opts: &DiffOptions) -> bool {
    opts.ignore_paths
        .iter()
        .any(|ignore| path == ignore || path.ends_with(&format!(".{ignore}")))
}

fn masked(value: &FieldValue, field: &FieldDescriptor) -> FieldValue {
    if field.sensitive {
        FieldValue::String(MASK.to_string())
    } else {
        value.clone()
    }
}

fn render(value: &FieldValue, field: &FieldDescriptor) -> String {
    if field.sensitive {
        MASK.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{diff, diff_with_options, DiffOptions};
    use crate::descriptor::{FieldDescriptor, RecordSchema};
    use crate::diff::result::DiffEntry;
    use crate::record::Record;

    fn schema() -> RecordSchema {
        RecordSchema::new(vec![
            FieldDescriptor::string("name"),
            FieldDescriptor::string("passwd").sensitive(),
            FieldDescriptor::list(
                "offending_ssid",
                vec![
                    FieldDescriptor::integer("id"),
                    FieldDescriptor::string("ssid_pattern"),
                ],
            )
            .sort_key("id"),
        ])
    }

    fn ssid(id: i64, pattern: &str) -> Record {
        Record::new().with("id", id).with("ssid_pattern", pattern)
    }

    #[test]
    fn identical_records_have_no_entries_by_default() {
        let record = Record::new().with("name", "a");
        assert!(diff(&record, &record, &schema()).is_empty());
    }

    #[test]
    fn keyed_rows_match_regardless_of_order() {
        let prior = Record::new().with("offending_ssid", vec![ssid(1, "a*"), ssid(2, "b*")]);
        let planned = Record::new().with("offending_ssid", vec![ssid(2, "c*"), ssid(1, "a*")]);

        let entries = diff(&prior, &planned, &schema());
        assert_eq!(entries.len(), 1);
        assert!(matches!(
            &entries[0],
            DiffEntry::Modified { path, .. } if path == "offending_ssid[2].ssid_pattern"
        ));
    }

    #[test]
    fn sensitive_values_are_masked() {
        let prior = Record::new().with("passwd", "one");
        let planned = Record::new().with("passwd", "two");
        let entries = diff(&prior, &planned, &schema());
        assert_eq!(
            entries,
            vec![DiffEntry::Modified {
                path: "passwd".to_string(),
                prior: "(sensitive)".to_string(),
                planned: "(sensitive)".to_string(),
            }]
        );
    }

    #[test]
    fn added_sensitive_values_are_masked() {
        let planned = Record::new().with("passwd", "secret");
        let entries = diff(&Record::new(), &planned, &schema());
        assert_eq!(
            entries,
            vec![DiffEntry::Added {
                path: "passwd".to_string(),
                value: "(sensitive)".into(),
            }]
        );
    }

    #[test]
    fn ignore_paths_skip_fields() {
        let prior = Record::new().with("name", "a");
        let planned = Record::new().with("name", "b");
        let opts = DiffOptions {
            ignore_paths: vec!["name".to_string()],
            ..DiffOptions::default()
        };
        assert!(diff_with_options(&prior, &planned, &schema(), &opts).is_empty());
    }

    #[test]
    fn added_and_removed_rows_are_reported() {
        let prior = Record::new().with("offending_ssid", vec![ssid(1, "a*")]);
        let planned = Record::new().with("offending_ssid", vec![ssid(3, "z*")]);
        let entries = diff(&prior, &planned, &schema());
        let paths: Vec<_> = entries.iter().map(DiffEntry::path).collect();
        assert_eq!(paths, vec!["offending_ssid[1]", "offending_ssid[3]"]);
    }
}
