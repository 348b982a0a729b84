use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let template = format!(
        "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
        label
    );
    pb.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Delete a directory with everything in it, then create it again empty
pub fn recreate_directory(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        log::warn!("Deleting {} and everything in it.", path.display());
        fs::remove_dir_all(path)?;
    }
    fs::create_dir_all(path)
}

/// Check that a dataset name can be used as a single directory name
pub fn validate_output_name(name: &str) -> Result<()> {
    let sanitized = sanitize_filename::sanitize(name);
    if name.trim().is_empty() || sanitized != name {
        return Err(ConvertError::InvalidOption(format!(
            "output name '{}' is not a valid directory name",
            name
        )));
    }
    Ok(())
}
