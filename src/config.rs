use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::augment::DEFAULT_AUGMENT_TIMES;
use crate::error::{ConvertError, Result};

/// Build a YOLO training dataset from a flat folder of labelled images.
#[derive(Parser, Debug, Clone)]
#[command(name = "yolo-dataset-builder", version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Split, augment and write a YOLO dataset
    Convert(ConvertArgs),
    /// List the samples that have both an image and a label file
    Samples(SourceArgs),
    /// Delete everything in the upload directory and recreate it empty
    Purge(SourceArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Directory holding the uploaded images, label files and classes.txt
    #[arg(short = 's', long = "source_dir", default_value = "temp_data")]
    pub source_dir: PathBuf,
}

/// Arguments of the `convert` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Directory holding the uploaded images, label files and classes.txt
    #[arg(short = 's', long = "source_dir", default_value = "temp_data")]
    pub source_dir: PathBuf,

    /// Directory under which the dataset directory is created
    #[arg(long = "dataset_root", default_value = "datasets")]
    pub dataset_root: PathBuf,

    /// Name of the dataset directory to create; it must not exist yet
    #[arg(short = 'o', long = "output_name", default_value = "yolo_train_data")]
    pub output_name: String,

    /// How validation samples are chosen
    #[arg(long = "val_mode", value_enum, default_value = "random")]
    pub val_mode: ValMode,

    /// Proportion of the samples used for validation in random mode
    #[arg(long = "val_size", default_value_t = 0.2, value_parser = validate_val_size)]
    pub val_size: f64,

    /// Sample names used for validation in manual mode
    #[arg(long = "val_names", use_value_delimiter = true)]
    pub val_names: Vec<String>,

    /// Copy training samples without augmentation
    #[arg(long = "no_augment")]
    pub no_augment: bool,

    /// Number of augmented variants written per training sample
    #[arg(
        long = "augment_times",
        default_value_t = DEFAULT_AUGMENT_TIMES,
        value_parser = clap::value_parser!(u32).range(1..=20)
    )]
    pub augment_times: u32,

    /// Seed for the shuffle and the augmentation draws
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// What to do with augmented variants whose boxes all fell out of frame
    #[arg(long = "empty_labels", value_enum, default_value = "keep")]
    pub empty_labels: EmptyLabelPolicy,

    /// Print the run summary as JSON on stdout
    #[arg(long = "json")]
    pub json: bool,
}

impl ConvertArgs {
    /// Arguments with every option at its default, reading from `source_dir`
    /// and writing `<dataset_root>/<output_name>`.
    pub fn new(source_dir: PathBuf, dataset_root: PathBuf, output_name: &str) -> Self {
        Self {
            source_dir,
            dataset_root,
            output_name: output_name.to_string(),
            val_mode: ValMode::Random,
            val_size: 0.2,
            val_names: Vec::new(),
            no_augment: false,
            augment_times: DEFAULT_AUGMENT_TIMES,
            seed: 42,
            empty_labels: EmptyLabelPolicy::Keep,
            json: false,
        }
    }

    pub fn augment(&self) -> bool {
        !self.no_augment
    }

    /// Number of outputs written per training sample.
    pub fn augment_factor(&self) -> usize {
        if self.augment() {
            self.augment_times as usize
        } else {
            1
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dataset_root.join(&self.output_name)
    }

    /// Resolve the validation options into a split mode, rejecting
    /// combinations clap cannot express.
    pub fn split_mode(&self) -> Result<SplitMode> {
        match self.val_mode {
            ValMode::Random => {
                if !self.val_names.is_empty() {
                    return Err(ConvertError::InvalidOption(
                        "--val_names requires --val_mode manual".to_string(),
                    ));
                }
                if !(self.val_size > 0.0 && self.val_size < 1.0) {
                    return Err(ConvertError::InvalidOption(format!(
                        "val_size must be greater than 0.0 and less than 1.0, got {}",
                        self.val_size
                    )));
                }
                Ok(SplitMode::Random {
                    val_size: self.val_size,
                })
            }
            ValMode::Manual => {
                let names: Vec<String> = self
                    .val_names
                    .iter()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
                if names.is_empty() {
                    return Err(ConvertError::EmptySelection);
                }
                Ok(SplitMode::Manual { names })
            }
        }
    }

    /// Checks for values that can be set without going through the parser.
    pub fn validate(&self) -> Result<()> {
        if !(1..=20).contains(&self.augment_times) {
            return Err(ConvertError::InvalidOption(format!(
                "augment_times must be between 1 and 20, got {}",
                self.augment_times
            )));
        }
        Ok(())
    }
}

// How validation samples are picked
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum ValMode {
    Random,
    Manual,
}

// Handling of augmented variants left without any box
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum EmptyLabelPolicy {
    /// Write the variant with an empty label file (a negative sample)
    #[default]
    Keep,
    /// Do not write the variant
    Skip,
}

/// Resolved validation selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitMode {
    Random { val_size: f64 },
    Manual { names: Vec<String> },
}

// Validate that the validation size lies strictly between 0.0 and 1.0
pub fn validate_val_size(s: &str) -> std::result::Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("SIZE must be greater than 0.0 and less than 1.0".to_string()),
    }
}
