// Colored terminal output for subject suggestions and model summaries.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use super::Suggestion;
use crate::model::ModelInfo;

/// Display ranked subject suggestions with a score bar.
pub fn display_suggestions(suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        println!("No subjects matched. The text shares no labels with the vocabulary.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Suggested subjects ({}) ===", suggestions.len()).bold()
    );
    println!();

    println!(
        "  {:>4}  {:<40} {:>6}  {}",
        "Rank".dimmed(),
        "Label".dimmed(),
        "Score".dimmed(),
        "URI".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    let bar_width: usize = 10;
    for (i, s) in suggestions.iter().enumerate() {
        let filled = (f64::from(s.score) * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.min(bar_width)),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        println!(
            "  {:>4}. {:<40} {:>6.3}  {} {}",
            i + 1,
            super::truncate_chars(&s.label, 40),
            s.score,
            colorize_score(s.score, &bar),
            s.uri.dimmed(),
        );
    }
    println!();
}

/// Display the metadata of a trained model.
pub fn display_model_info(info: &ModelInfo, path: &str) {
    println!("\n{}", format!("=== Model {} ===", path).bold());
    println!("  Language:         {}", info.language);
    println!(
        "  Trained:          {}",
        info.trained_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Documents:        {}", info.documents);
    println!(
        "  Training rows:    {} ({} positive)",
        info.training_rows, info.positive_rows
    );
    println!(
        "  Active subjects:  {} (of {} in vocabulary)",
        info.active_subjects, info.vocabulary_subjects
    );
    println!("  Indexed labels:   {}", info.indexed_labels);
    println!("  Min token length: {}", info.token_min_length);
    println!();
}

fn colorize_score(score: f32, text: &str) -> colored::ColoredString {
    if score >= 0.5 {
        text.bright_green()
    } else if score >= 0.2 {
        text.bright_yellow()
    } else {
        text.dimmed()
    }
}
