// Training data ingestion from CSV.
//
// The file needs a header row with `description` and `category` columns
// (any case, any position; other columns are ignored). Rows where either
// field is missing or blank are skipped and counted rather than failing the
// whole load.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

const DESCRIPTION_COLUMN: &str = "description";
const CATEGORY_COLUMN: &str = "category";

/// Cleaned (description, category) rows ready for training.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub rows: Vec<(String, String)>,
    /// Rows dropped for a missing or blank field
    pub skipped: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count per category, largest first, ties by name.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (_, category) in &self.rows {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(c, n)| (c.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

/// Load a training CSV from disk.
pub fn load_csv(path: &Path) -> Result<TrainingSet> {
    let file = File::open(path)
        .with_context(|| format!("Training data not found at {}", path.display()))?;
    let set = from_reader(file)
        .with_context(|| format!("Failed to read training data from {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = set.len(),
        skipped = set.skipped,
        "Loaded training data"
    );
    Ok(set)
}

/// Parse training rows from any CSV source.
pub fn from_reader<R: Read>(reader: R) -> Result<TrainingSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("CSV has no header row")?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| format!("CSV header is missing a `{name}` column"))
    };
    let description_idx = column(DESCRIPTION_COLUMN)?;
    let category_idx = column(CATEGORY_COLUMN)?;

    let mut set = TrainingSet::default();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        let description = record.get(description_idx).unwrap_or("");
        let category = record.get(category_idx).unwrap_or("");
        if description.is_empty() || category.is_empty() {
            set.skipped += 1;
            continue;
        }
        set.rows.push((description.to_string(), category.to_string()));
    }

    if set.skipped > 0 {
        warn!(skipped = set.skipped, "Dropped rows with a missing description or category");
    }
    Ok(set)
}
