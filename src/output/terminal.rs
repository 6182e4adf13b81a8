// Colored terminal output for analyzed rows.
//
// Rows at or above the review threshold are highlighted; rows whose
// processing failed are dimmed with empty cells so they stand out as
// "not analyzed" rather than "harmless".

use colored::Colorize;

use crate::models::AnalyzedRow;
use crate::moderation::Category;
use crate::scoring::weights::WeightTable;

/// Default total-aggression threshold for highlighting.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// Display the analyzed rows as a table, followed by a summary.
pub fn display_results(rows: &[AnalyzedRow], threshold: f64) {
    if rows.is_empty() {
        println!("No posts to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Aggression Report ({} posts) ===", rows.len()).bold()
    );
    println!();

    println!(
        "  {:>4}  {:>6}  {:>5}  {:<28}  {}",
        "#".dimmed(),
        "Total".dimmed(),
        "Aggr".dimmed(),
        "Flags".dimmed(),
        "Content".dimmed(),
    );
    println!("  {}", "-".repeat(96).dimmed());

    for row in rows {
        let preview = super::truncate_chars(&single_line(&row.post.content), 48);

        if row.failed {
            let line = format!(
                "  {:>4}  {:>6}  {:>5}  {:<28}  {}",
                row.post.index, "—", "—", "(analysis failed)", preview
            );
            println!("{}", line.dimmed());
            continue;
        }

        let aggr = row
            .aggressiveness
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "—".to_string());
        let flags = flag_list(row);
        let line = format!(
            "  {:>4}  {:>6.2}  {:>5}  {:<28}  {}",
            row.post.index, row.total_aggression, aggr, flags, preview
        );

        if row.is_above(threshold) {
            println!("{}", line.red().bold());
        } else {
            println!("{line}");
        }
    }

    println!();
    display_summary(rows, threshold);
}

/// Counts of rows above threshold, failed, and missing an aggressiveness score.
pub fn display_summary(rows: &[AnalyzedRow], threshold: f64) {
    let above = rows
        .iter()
        .filter(|r| !r.failed && r.is_above(threshold))
        .count();
    let failed = rows.iter().filter(|r| r.failed).count();
    let unscored = rows
        .iter()
        .filter(|r| !r.failed && r.aggressiveness.is_absent())
        .count();

    if above > 0 {
        println!(
            "  {} {} posts at or above {:.1}",
            "!!".red().bold(),
            above,
            threshold
        );
    } else {
        println!("  {} no posts at or above {:.1}", "ok".green(), threshold);
    }
    if unscored > 0 {
        println!(
            "  {} {} posts without an aggressiveness score",
            "~".yellow(),
            unscored
        );
    }
    if failed > 0 {
        println!("  {} {} posts failed analysis", "x".dimmed(), failed);
    }
}

/// Show the effective weight table, marking overridden values.
pub fn display_weights(weights: &WeightTable) {
    let resolved = weights.resolve();
    let entries = [
        ("hate_score", resolved.hate_score, weights.hate_score.is_some()),
        (
            "hate/threatening_score",
            resolved.hate_threatening_score,
            weights.hate_threatening_score.is_some(),
        ),
        ("violence_score", resolved.violence_score, weights.violence_score.is_some()),
        ("sexual_score", resolved.sexual_score, weights.sexual_score.is_some()),
        (
            "sexual/minors_score",
            resolved.sexual_minors_score,
            weights.sexual_minors_score.is_some(),
        ),
        (
            "aggressiveness_score",
            resolved.aggressiveness_score,
            weights.aggressiveness_score.is_some(),
        ),
        ("hate_flag", resolved.hate_flag, weights.hate_flag.is_some()),
        (
            "hate/threatening_flag",
            resolved.hate_threatening_flag,
            weights.hate_threatening_flag.is_some(),
        ),
        ("violence_flag", resolved.violence_flag, weights.violence_flag.is_some()),
        ("sexual_flag", resolved.sexual_flag, weights.sexual_flag.is_some()),
    ];

    println!("\n{}", "=== Weights ===".bold());
    for (name, value, overridden) in entries {
        let source = if overridden {
            "configured".yellow()
        } else {
            "default".dimmed()
        };
        println!("  {:<24} {:>6.2}  {}", name, value, source);
    }
}

fn flag_list(row: &AnalyzedRow) -> String {
    let flagged: Vec<Category> = row.moderation.flagged_categories();
    if flagged.is_empty() {
        "-".to_string()
    } else {
        flagged
            .iter()
            .map(|c| c.wire_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
