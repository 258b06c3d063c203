use std::path::PathBuf;

use anyhow::{Context, Result};
use rfd::FileDialog;

/// Asks where to save and writes the file. `Ok(None)` when the dialog is cancelled.
pub fn save_csv(file_name: &str, contents: &str) -> Result<Option<PathBuf>> {
    let Some(path) = FileDialog::new()
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(None);
    };

    std::fs::write(&path, contents)
        .with_context(|| format!("failed to write csv: {}", path.display()))?;
    Ok(Some(path))
}
