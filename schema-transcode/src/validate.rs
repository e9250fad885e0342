//! Declarative checks run on a record before it is assembled and sent.

use serde::Serialize;

use crate::descriptor::{FieldDescriptor, FieldType, RecordSchema};
use crate::path::FieldPath;
use crate::record::{FieldValue, Record};

/// One validation problem at a record path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    pub path: String,
    pub code: String,
    pub message: String,
}

/// Check `record` against `schema`, returning every problem found.
pub fn validate(record: &Record, schema: &RecordSchema) -> Vec<ValidationFinding> {
    let mut out = Vec::new();
    validate_record(record, &schema.fields, &FieldPath::root(), true, &mut out);
    out
}

fn validate_record(
    record: &Record,
    fields: &[FieldDescriptor],
    parent: &FieldPath,
    top_level: bool,
    out: &mut Vec<ValidationFinding>,
) {
    for (name, _) in record.iter() {
        if !fields.iter().any(|field| &field.name == name) {
            out.push(finding(
                &parent.child(name.as_str()),
                "unknown_field",
                format!("'{name}' is not a known field"),
            ));
        }
    }

    for field in fields {
        let path = parent.child(&field.name);
        match record.get(&field.name) {
            Some(value) => validate_value(value, field, &path, top_level, out),
            None if field.required && !field.computed => out.push(finding(
                &path,
                "missing_required_field",
                format!("required field '{}' is not set", field.name),
            )),
            None => {}
        }
    }
}

fn validate_value(
    value: &FieldValue,
    field: &FieldDescriptor,
    path: &FieldPath,
    top_level: bool,
    out: &mut Vec<ValidationFinding>,
) {
    if field.computed && top_level {
        out.push(finding(
            path,
            "computed_field_set",
            format!("'{}' is assigned by the device and cannot be set", field.name),
        ));
        return;
    }

    match (field.field_type, value) {
        (FieldType::String, FieldValue::String(text)) => {
            if let Some(size) = field.size {
                if text.chars().count() > size {
                    out.push(finding(
                        path,
                        "string_too_long",
                        format!("length {} exceeds maximum {size}", text.chars().count()),
                    ));
                }
            }
            if !field.options.is_empty() && !field.options.iter().any(|opt| opt == text) {
                out.push(finding(
                    path,
                    "invalid_option",
                    format!("{text:?} is not one of [{}]", field.options.join(", ")),
                ));
            }
        }
        (FieldType::Integer, FieldValue::Integer(number)) => {
            let below = field.min.is_some_and(|min| *number < min);
            let above = field.max.is_some_and(|max| *number > max);
            if below || above {
                out.push(finding(
                    path,
                    "integer_out_of_range",
                    format!(
                        "{number} is outside [{}, {}]",
                        field.min.map_or("-".to_string(), |v| v.to_string()),
                        field.max.map_or("-".to_string(), |v| v.to_string())
                    ),
                ));
            }
        }
        (FieldType::Bool, FieldValue::Bool(_)) => {}
        (FieldType::List | FieldType::Set, FieldValue::List(rows)) => {
            for (idx, row) in rows.iter().enumerate() {
                validate_record(row, &field.fields, &path.index(idx), false, out);
            }
        }
        (FieldType::Block, FieldValue::List(rows)) => {
            if rows.len() > 1 {
                out.push(finding(
                    path,
                    "block_too_many_items",
                    format!("block accepts one item, found {}", rows.len()),
                ));
            }
            if let Some(row) = rows.first() {
                validate_record(row, &field.fields, &path.index(0), false, out);
            }
        }
        (expected, found) => out.push(finding(
            path,
            "type_mismatch",
            format!("expected {}, found {}", expected.name(), found.kind()),
        )),
    }
}

fn finding(path: &FieldPath, code: &str, message: String) -> ValidationFinding {
    ValidationFinding {
        path: path.to_string(),
        code: code.to_string(),
        message,
    }
}
