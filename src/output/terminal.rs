// Colored terminal output for predictions, categories, and training runs.
//
// main.rs delegates all display formatting here.

use colored::Colorize;

use super::truncate_chars;
use crate::data::TrainingSet;
use crate::error::ModelError;
use crate::model::prediction::Prediction;

const BAR_WIDTH: usize = 20;

/// Display a single prediction with its top `k` ranked categories.
pub fn display_prediction(description: &str, prediction: &Prediction, k: usize) {
    println!(
        "\n{} {} {}",
        truncate_chars(description, 60).bold(),
        "->".dimmed(),
        prediction.category.bright_green().bold()
    );
    println!(
        "  confidence: {}",
        colorize_confidence(prediction.confidence)
    );

    for (i, ranked) in prediction.top(k).iter().enumerate() {
        let filled = (ranked.probability * BAR_WIDTH as f64).round() as usize;
        let empty = BAR_WIDTH.saturating_sub(filled);
        println!(
            "  {:>2}. {:<24} [{}{}] {:.3}",
            i + 1,
            ranked.category,
            "=".repeat(filled),
            " ".repeat(empty),
            ranked.probability
        );
    }
}

/// Display a per-item failure from a batch.
pub fn display_prediction_error(description: &str, error: &ModelError) {
    println!(
        "\n{} {} {}",
        truncate_chars(description, 60).bold(),
        "->".dimmed(),
        error.to_string().red()
    );
}

/// Display the known categories in canonical order.
pub fn display_categories(categories: &[String]) {
    println!(
        "\n{}",
        format!("=== Categories ({}) ===", categories.len()).bold()
    );
    for (i, category) in categories.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, category);
    }
}

/// Summarize loaded training data before fitting.
pub fn display_training_summary(set: &TrainingSet) {
    println!(
        "\n{}",
        format!("=== Training data ({} rows) ===", set.len()).bold()
    );
    if set.skipped > 0 {
        println!(
            "  {} {} rows skipped (missing description or category)",
            "!".yellow(),
            set.skipped
        );
    }

    println!("\n  Sample rows:");
    for (description, category) in set.rows.iter().take(5) {
        println!(
            "    {:<40} {}",
            truncate_chars(description, 37),
            category.dimmed()
        );
    }

    println!("\n  Categories found:");
    for (category, count) in set.category_counts() {
        println!("    {:<24} {:>6}", category, count);
    }
}

fn colorize_confidence(confidence: f64) -> colored::ColoredString {
    let text = format!("{confidence:.3}");
    if confidence >= 0.75 {
        text.bright_green()
    } else if confidence >= 0.40 {
        text.bright_yellow()
    } else {
        text.bright_red()
    }
}
