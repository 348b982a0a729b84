//! YOLO dataset builder
//!
//! This library turns a flat folder of YOLO-labelled images into a training
//! dataset: a seeded or hand-picked train/val split, optional augmentation of
//! the training images, and the `data.yaml` descriptor read by the trainer.

pub mod augment;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod labels;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use augment::{AugmentPipeline, AugmentedVariant};
pub use config::{Cli, Commands, ConvertArgs, EmptyLabelPolicy, SourceArgs, SplitMode, ValMode};
pub use dataset::{process_dataset, split_samples};
pub use error::{ConvertError, Result};
pub use io::{discover_samples, purge_upload_area, resolve_image, setup_output_directories};
pub use labels::{load_class_list, load_labels};
pub use types::{
    Annotation, BoundingBox, ClassList, ConversionSummary, DatasetManifest, OutputDirs, Sample,
    SplitData,
};
