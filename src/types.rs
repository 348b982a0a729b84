use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Recognised image extensions, in lookup preference order
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

// Extension of per-image label files
pub const LABEL_EXTENSION: &str = "txt";

// Name of the class list inside the source directory
pub const CLASSES_FILE: &str = "classes.txt";

// Name of the dataset descriptor inside the output directory
pub const MANIFEST_FILE: &str = "data.yaml";

/// One logical training example: an image and its label file sharing a base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

impl Sample {
    /// Extension of the source image, used when copying it verbatim.
    pub fn image_extension(&self) -> &str {
        self.image_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("jpg")
    }
}

/// A box in YOLO form: centre and size, normalized to the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x_center: f64, y_center: f64, width: f64, height: f64) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Corners as (x_min, y_min, x_max, y_max), still normalized.
    pub fn to_xyxy(&self) -> (f64, f64, f64, f64) {
        (
            self.x_center - self.width / 2.0,
            self.y_center - self.height / 2.0,
            self.x_center + self.width / 2.0,
            self.y_center + self.height / 2.0,
        )
    }

    pub fn from_xyxy(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_center: (x_min + x_max) / 2.0,
            y_center: (y_min + y_max) / 2.0,
            width: x_max - x_min,
            height: y_max - y_min,
        }
    }

    /// Clip to the unit frame. Returns `None` when nothing of the box is left inside.
    pub fn clip_to_frame(&self) -> Option<Self> {
        let (x_min, y_min, x_max, y_max) = self.to_xyxy();
        let (x_min, y_min) = (x_min.max(0.0), y_min.max(0.0));
        let (x_max, y_max) = (x_max.min(1.0), y_max.min(1.0));
        if x_max <= x_min || y_max <= y_min {
            return None;
        }
        Some(Self::from_xyxy(x_min, y_min, x_max, y_max))
    }
}

/// A class id paired with its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    pub class_id: usize,
    pub bbox: BoundingBox,
}

impl Annotation {
    pub fn new(class_id: usize, bbox: BoundingBox) -> Self {
        Self { class_id, bbox }
    }
}

/// Ordered class names; the index is the class id used in label files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassList {
    names: Vec<String>,
}

impl ClassList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains_id(&self, class_id: usize) -> bool {
        class_id < self.names.len()
    }
}

// Struct to hold the paths to the output directories for the train/val splits
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: PathBuf,
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

impl OutputDirs {
    /// Directory layout under `root`, without touching the filesystem.
    pub fn under(root: &Path) -> Self {
        let images_dir = root.join("images");
        let labels_dir = root.join("labels");
        Self {
            root: root.to_path_buf(),
            train_labels_dir: labels_dir.join("train"),
            val_labels_dir: labels_dir.join("val"),
            train_images_dir: images_dir.join("train"),
            val_images_dir: images_dir.join("val"),
        }
    }

    pub fn all(&self) -> [&Path; 4] {
        [
            self.train_images_dir.as_path(),
            self.val_images_dir.as_path(),
            self.train_labels_dir.as_path(),
            self.val_labels_dir.as_path(),
        ]
    }
}

// Struct to hold the samples assigned to each split
#[derive(Debug, Clone, Default)]
pub struct SplitData {
    pub train: Vec<Sample>,
    pub val: Vec<Sample>,
}

/// Contents of `data.yaml`, read by the training step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub train: String,
    pub val: String,
    pub nc: usize,
    pub names: Vec<String>,
}

impl DatasetManifest {
    pub fn new(classes: &ClassList) -> Self {
        Self {
            train: "images/train".to_string(),
            val: "images/val".to_string(),
            nc: classes.len(),
            names: classes.names().to_vec(),
        }
    }
}

// Outcome of a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub output_dir: PathBuf,
    pub train_count: usize,
    pub val_count: usize,
    pub augmented: bool,
    pub augment_times: usize,
    pub skipped_variants: usize,
}

impl ConversionSummary {
    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Dataset directory: {}", self.output_dir.display());
        if self.augmented {
            log::info!(
                "Train samples: {} (augmented x{})",
                self.train_count,
                self.augment_times
            );
        } else {
            log::info!("Train samples: {} (no augmentation)", self.train_count);
        }
        log::info!("Val samples: {} (never augmented)", self.val_count);

        if self.skipped_variants > 0 {
            log::warn!(
                "Skipped {} augmented variants that lost every bounding box",
                self.skipped_variants
            );
        }
    }
}
