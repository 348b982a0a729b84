use glob::glob;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::{
    ClassList, DatasetManifest, OutputDirs, Sample, IMAGE_EXTENSIONS, LABEL_EXTENSION,
    MANIFEST_FILE,
};
use crate::utils::recreate_directory;

/// First existing `<dir>/<name>.<ext>` following the extension preference order.
pub fn resolve_image(dir: &Path, name: &str) -> Result<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|path| path.is_file())
        .ok_or_else(|| ConvertError::MissingInput {
            path: dir.join(format!("{}.{}", name, IMAGE_EXTENSIONS[0])),
        })
}

/// Collect the samples of a flat source directory, sorted by name.
///
/// An image without a matching label file is not a sample; it is logged and
/// left out.
pub fn discover_samples(dirname: &Path) -> Result<Vec<Sample>> {
    if !dirname.is_dir() {
        return Err(ConvertError::MissingInput {
            path: dirname.to_path_buf(),
        });
    }

    let mut names = BTreeSet::new();
    for ext in IMAGE_EXTENSIONS {
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&dirname.to_string_lossy()),
            ext
        );
        let entries = glob(&pattern).map_err(|e| {
            ConvertError::InvalidOption(format!("invalid source directory pattern: {}", e))
        })?;
        for path in entries.filter_map(|entry| entry.ok()) {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.insert(stem.to_string());
            }
        }
    }

    let mut samples = Vec::with_capacity(names.len());
    for name in names {
        let label_path = dirname.join(format!("{}.{}", name, LABEL_EXTENSION));
        if !label_path.is_file() {
            warn!("No label file for image '{}', leaving it out.", name);
            continue;
        }
        let image_path = resolve_image(dirname, &name)?;
        debug!("Found sample {} ({})", name, image_path.display());
        samples.push(Sample {
            name,
            image_path,
            label_path,
        });
    }
    Ok(samples)
}

/// Set up the directory structure for YOLO dataset output.
///
/// The dataset directory must not exist yet; an existing one is never
/// overwritten.
pub fn setup_output_directories(root: &Path) -> Result<OutputDirs> {
    if root.exists() {
        return Err(ConvertError::OutputConflict {
            path: root.to_path_buf(),
        });
    }
    let output_dirs = OutputDirs::under(root);
    for dir in output_dirs.all() {
        fs::create_dir_all(dir)?;
    }
    Ok(output_dirs)
}

/// Create the data.yaml file for YOLO training
pub fn create_dataset_yaml(root: &Path, classes: &ClassList) -> Result<PathBuf> {
    let dataset_yaml_path = root.join(MANIFEST_FILE);
    let mut dataset_yaml = BufWriter::new(File::create(&dataset_yaml_path)?);
    let yaml_content = serde_yaml::to_string(&DatasetManifest::new(classes))?;
    dataset_yaml.write_all(yaml_content.as_bytes())?;
    dataset_yaml.flush()?;
    Ok(dataset_yaml_path)
}

/// Read back a data.yaml written by [`create_dataset_yaml`].
pub fn read_dataset_yaml(path: &Path) -> Result<DatasetManifest> {
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Empty the upload area: remove it with all its files and recreate it.
pub fn purge_upload_area(dirname: &Path) -> Result<()> {
    recreate_directory(dirname)?;
    Ok(())
}
