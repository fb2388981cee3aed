//! Plain-text rendering of the key table

use std::fmt::Write;

use crate::domain::ApiKeyRecord;
use crate::infrastructure::api_key::{display_key, KeyLifecycleManager};

/// Render the manager's current collection
///
/// `reveal_all` shows every key in full; otherwise each key follows the
/// manager's visibility set.
pub async fn render_table(manager: &KeyLifecycleManager, reveal_all: bool) -> String {
    let keys = manager.keys().await;
    let visible = manager.visible_ids().await;

    let rows: Vec<[String; 6]> = keys
        .iter()
        .map(|record| {
            let revealed = reveal_all || visible.contains(record.id());
            row(record, display_key(record.key(), revealed))
        })
        .collect();

    format_rows(&rows)
}

fn row(record: &ApiKeyRecord, key: String) -> [String; 6] {
    let mut usage = match record.limits() {
        Some(limit) => format!("{}/{}", record.usage(), limit),
        None => record.usage().to_string(),
    };
    if record.is_over_limit() {
        usage.push_str(" (over)");
    }

    [
        record.id().to_string(),
        record.name().to_string(),
        record.key_type().label().to_string(),
        usage,
        key,
        record.created_at().format("%Y-%m-%d %H:%M").to_string(),
    ]
}

fn format_rows(rows: &[[String; 6]]) -> String {
    const HEADER: [&str; 6] = ["ID", "NAME", "TYPE", "USAGE", "KEY", "CREATED"];

    if rows.is_empty() {
        return "No API keys yet\n".to_string();
    }

    let mut widths = HEADER.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = HEADER.map(str::to_string);
    for cells in std::iter::once(&header).chain(rows) {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}
