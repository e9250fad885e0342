use colored::Colorize;
use schema_transcode::{format_summary, format_text, DiffEntry, ValidationFinding};

use crate::catalog::Catalog;

/// Render diff entries for terminal output.
pub fn render_text(entries: &[DiffEntry]) -> String {
    let raw = format_text(entries);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_summary(entries: &[DiffEntry]) -> String {
    format_summary(entries).cyan().to_string()
}

/// Render validation findings, one per line.
pub fn render_findings(findings: &[ValidationFinding]) -> String {
    if findings.is_empty() {
        return "valid".green().to_string();
    }
    let mut out = Vec::new();
    for finding in findings {
        out.push(format!(
            "{} {} [{}] {}",
            "ERROR".red(),
            finding.path,
            finding.code,
            finding.message
        ));
    }
    out.push(format!("{} problem(s)", findings.len()).red().to_string());
    out.join("\n")
}

/// Render the resource types of a catalog.
pub fn render_catalog(catalog: &Catalog, verbose: bool) -> String {
    let mut out = Vec::new();
    for resource in catalog.iter() {
        let kind = if resource.singleton { "settings" } else { "table" };
        let mut line = format!(
            "{} {} kind={kind} fields={}",
            resource.name.bold(),
            resource.path,
            resource.schema.len()
        );
        if let Some(mkey) = &resource.mkey {
            line.push_str(&format!(" mkey={mkey}"));
        }
        if verbose {
            let source = catalog.source(&resource.name).unwrap_or("unknown");
            line.push_str(&format!(" source={source}"));
        }
        out.push(line);
    }
    out.join("\n")
}
