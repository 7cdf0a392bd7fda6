//! Response composition.
//!
//! Turns an adapter result into the markdown answer both front-ends return:
//! the answer text, the query in a code block, and a bounded results table.

use dataq_core::ExecutionOutput;
use serde_json::Value;

/// Rows shown before the table is cut off with an overflow note.
pub const MAX_TABLE_ROWS: usize = 20;

/// Compose the final markdown answer for one request.
pub fn compose_response(agent: &str, output: &ExecutionOutput) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(rows) = output.rows.as_ref() {
        match render_table(rows) {
            Some(table) => parts.push(table),
            None => parts.push("The query returned no results.".to_string()),
        }
    } else if output.sql.is_some() {
        parts.push(format!(
            "Generated a query for the `{agent}` datasource. \
             Execution is delegated to the datasource backend."
        ));
    }

    if let Some(sql) = output.sql.as_deref() {
        parts.push(format!("**SQL Query:**\n```sql\n{sql}\n```"));
    }

    if parts.is_empty() {
        "No results returned.".to_string()
    } else {
        parts.join("\n\n")
    }
}

/// Deterministic answer when no datasource matched the question.
pub fn compose_no_match(candidates: &[String]) -> String {
    if candidates.is_empty() {
        return "I couldn't match your question to any configured datasource.".to_string();
    }
    let listing = candidates
        .iter()
        .map(|name| format!("- {name}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "I couldn't match your question to any configured datasource. \
         I can answer questions about:\n\n{listing}"
    )
}

/// Render a JSON array of objects as a markdown table, capped at
/// [`MAX_TABLE_ROWS`] rows. Returns None for empty or non-tabular data.
fn render_table(rows: &Value) -> Option<String> {
    let rows = rows.as_array()?;
    if rows.is_empty() {
        return None;
    }

    // column order comes from the first row
    let first = rows.first()?.as_object()?;
    let columns: Vec<&String> = first.keys().collect();
    if columns.is_empty() {
        return None;
    }

    let mut lines = Vec::with_capacity(rows.len().min(MAX_TABLE_ROWS) + 2);
    lines.push(format!(
        "| {} |",
        columns
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    ));
    lines.push(format!(
        "|{}|",
        columns.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));

    for row in rows.iter().take(MAX_TABLE_ROWS) {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| {
                row.get(col.as_str())
                    .map(render_cell)
                    .unwrap_or_default()
            })
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    if rows.len() > MAX_TABLE_ROWS {
        lines.push(format!("... and {} more rows", rows.len() - MAX_TABLE_ROWS));
    }

    Some(lines.join("\n"))
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
