// Rust guideline compliant 2026-10-19

//! Audit export of a [`RotationResult`] as comma-separated text.

use chrono::SecondsFormat;
use domain::{RotationEntry, RotationResult};

/// Column order of [`export_csv`].
pub const CSV_HEADER: &str = "Rank,Name,Member ID,Weight Score,Timestamp";

/// Render one row per entry, rank ascending, preceded by [`CSV_HEADER`].
///
/// Weight scores use four decimals, or `N/A` for non-weighted draws.
/// Timestamps are RFC 3339 in UTC.
#[must_use]
pub fn export_csv(result: &RotationResult) -> String {
    let mut rows: Vec<&RotationEntry> = result.entries.iter().collect();
    rows.sort_by_key(|e| e.rank);

    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + rows.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for entry in rows {
        let weight = entry
            .weight_score
            .map_or_else(|| "N/A".to_owned(), |w| format!("{w:.4}"));
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            entry.rank,
            escape_field(&entry.member_name),
            entry.member_id,
            weight,
            entry.draw_timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
    }
    out
}

/// Quote a field containing a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
