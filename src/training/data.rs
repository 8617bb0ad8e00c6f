use crate::error::{AppError, Result};
use crate::models::{LabeledExample, Sentiment};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// One row of the labeled CSV: `text,label`
#[derive(Debug, Deserialize)]
struct CsvRow {
    text: String,
    label: String,
}

/// Load labeled examples from a CSV file with `text` and `label` columns
///
/// Row numbers in errors are 1-based file lines, counting the header, so
/// they match what an editor shows.
pub fn load_labeled_csv(path: &Path) -> Result<Vec<LabeledExample>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::DataQuality(format!("cannot read {}: {e}", path.display())))?;

    let mut examples = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        let line = idx + 2;
        let row = row.map_err(|e| AppError::DataQuality(format!("line {line}: {e}")))?;

        let label = Sentiment::from_str(&row.label.to_lowercase()).map_err(|_| {
            AppError::DataQuality(format!(
                "line {line}: unknown label '{}' (expected negative, neutral or positive)",
                row.label
            ))
        })?;

        examples.push(LabeledExample::from_text(&row.text, label));
    }

    if examples.is_empty() {
        return Err(AppError::DataQuality(format!(
            "{} contains no labeled examples",
            path.display()
        )));
    }

    tracing::info!(
        path = %path.display(),
        n_examples = examples.len(),
        "Loaded labeled dataset"
    );

    Ok(examples)
}
