// JSON export of analyzed rows.
//
// One flat object per row, in input order, with every column present:
// post metadata, `{category}_flag` / `{category}_score` for all seven
// categories, the aggressiveness pair and the weighted total. Failed rows
// carry neutral values and a null aggressiveness pair.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::models::AnalyzedRow;
use crate::scoring::weights::WeightTable;

/// Flatten one analyzed row into its export columns.
pub fn row_to_json(row: &AnalyzedRow) -> Value {
    let mut columns = Map::new();
    columns.insert("index".into(), json!(row.post.index));
    columns.insert("timestamp".into(), json!(row.post.timestamp));
    columns.insert("url".into(), json!(row.post.url));
    columns.insert("author".into(), json!(row.post.author));
    columns.insert("content".into(), json!(row.post.content));

    for (category, verdict) in row.moderation.iter() {
        let name = category.wire_name();
        columns.insert(format!("{name}_flag"), json!(verdict.flagged));
        columns.insert(format!("{name}_score"), json!(verdict.score));
    }

    columns.insert(
        "aggressiveness_score".into(),
        json!(row.aggressiveness.score),
    );
    columns.insert(
        "aggressiveness_reason".into(),
        json!(row.aggressiveness.reason),
    );
    columns.insert("total_aggression".into(), json!(row.total_aggression));
    columns.insert("failed".into(), json!(row.failed));

    Value::Object(columns)
}

/// Build the full export document.
pub fn results_document(rows: &[AnalyzedRow], weights: &WeightTable) -> Value {
    json!({
        "generated_at": Utc::now().to_rfc3339(),
        "weights": weights.resolve(),
        "rows": rows.iter().map(row_to_json).collect::<Vec<_>>(),
    })
}

/// Write analyzed rows to `path` as pretty-printed JSON.
pub fn write_results(path: &Path, rows: &[AnalyzedRow], weights: &WeightTable) -> Result<()> {
    let document = results_document(rows, weights);
    let json = serde_json::to_string_pretty(&document).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))
}
