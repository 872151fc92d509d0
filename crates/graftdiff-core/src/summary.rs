//! Human-readable summary renderer for reconciliation results.

use crate::diff::model::CollectionDiff;
use crate::identity::identity_of;
use serde_json::Value;

/// Render a human-readable Markdown summary of a [`CollectionDiff`].
///
/// Intended for review output (e.g. the CLI's default mode). Informational
/// only; it does not affect the structured diff.
pub fn render_summary(diff: &CollectionDiff) -> String {
    let mut out = String::new();

    out.push_str("## Reconciliation Summary\n\n");
    out.push_str(&format!(
        "**Added**: {}  \n**Modified**: {}  \n**Deleted**: {}\n\n",
        diff.added.len(),
        diff.modified.len(),
        diff.deleted.len()
    ));

    if diff.is_empty() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    render_section(&mut out, "Added", &diff.added);
    render_section(&mut out, "Modified", &diff.modified);
    render_section(&mut out, "Deleted", &diff.deleted);

    out
}

fn render_section(out: &mut String, title: &str, records: &[Value]) {
    if records.is_empty() {
        return;
    }
    out.push_str(&format!("### {}\n\n", title));
    for record in records {
        out.push_str(&format!("- {}\n", label(record)));
    }
    out.push('\n');
}

/// A short label for one record: its identity when it has one, else a
/// compact rendering of the value itself.
fn label(record: &Value) -> String {
    if let Some(id) = identity_of(record) {
        return format!("`{}`", id);
    }
    let rendered = record.to_string();
    if rendered.chars().count() > 60 {
        let truncated: String = rendered.chars().take(60).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}
