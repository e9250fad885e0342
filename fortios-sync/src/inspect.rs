use schema_transcode::FieldDescriptor;

use crate::catalog::ResourceType;

/// Render a resource's descriptor table as an indented tree, stopping at
/// `max_depth` levels of nesting.
pub fn render_schema(resource: &ResourceType, max_depth: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", resource.name, resource.path));
    for field in resource.schema.iter() {
        render_field(field, 1, max_depth, &mut out);
    }
    out
}

fn render_field(field: &FieldDescriptor, depth: usize, max_depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{}: {}", indent, field.name, field.field_type.name()));

    let attrs = attributes(field);
    if !attrs.is_empty() {
        out.push_str(&format!(" [{}]", attrs.join(", ")));
    }
    out.push('\n');

    if depth >= max_depth {
        return;
    }

    for child in &field.fields {
        render_field(child, depth + 1, max_depth, out);
    }
}

fn attributes(field: &FieldDescriptor) -> Vec<String> {
    let mut attrs = Vec::new();
    if field.required {
        attrs.push("required".to_string());
    }
    if field.computed {
        attrs.push("computed".to_string());
    }
    if field.sensitive {
        attrs.push("sensitive".to_string());
    }
    if let Some(size) = field.size {
        attrs.push(format!("size={size}"));
    }
    if field.min.is_some() || field.max.is_some() {
        attrs.push(format!(
            "range={}..{}",
            field.min.map_or(String::new(), |v| v.to_string()),
            field.max.map_or(String::new(), |v| v.to_string())
        ));
    }
    if !field.options.is_empty() {
        attrs.push(format!("options={}", field.options.join("|")));
    }
    if let Some(key) = &field.sort_key {
        attrs.push(format!("sort_key={key}"));
    }
    if let Some(default) = &field.default {
        attrs.push(format!("default={default}"));
    }
    let range = field.version_range();
    if !range.is_unbounded() {
        attrs.push(format!("firmware {range}"));
    }
    attrs
}
