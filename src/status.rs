// System status display — shows model artifact location, age, and shape.

use anyhow::Result;

use crate::config::Config;
use crate::store;

/// Display system status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Training data: {}", config.data_path.display());

    let model_path = &config.model_path;
    if !model_path.exists() {
        println!("Model: not trained ({})", model_path.display());
        println!("\nRun `tally train` to build one.");
        return Ok(());
    }

    let file_size = std::fs::metadata(model_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Model: {} ({})", model_path.display(), file_size);

    let artifact = store::load(model_path)?;
    let pipeline = &artifact.pipeline;
    println!(
        "Trained: {} on {} rows",
        artifact.trained_at.to_rfc3339(),
        artifact.training_rows
    );
    println!(
        "Vocabulary: {} features ({} stop words)",
        pipeline.vectorizer().dim(),
        pipeline.vectorizer().stop_words().len()
    );
    println!(
        "Categories: {} ({})",
        pipeline.categories().len(),
        pipeline.categories().join(", ")
    );
    println!("Smoothing alpha: {}", pipeline.classifier().alpha());

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
