use log::{debug, warn};
use rand::Rng;
use std::fs::copy;
use std::path::Path;

use crate::augment::AugmentPipeline;
use crate::config::EmptyLabelPolicy;
use crate::error::{ConvertError, Result};
use crate::labels::write_labels;
use crate::types::{Annotation, OutputDirs, Sample, LABEL_EXTENSION};

// Train outputs are always re-encoded to this format
const TRAIN_IMAGE_EXTENSION: &str = "jpg";

/// Files written for one training sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrainOutcome {
    pub written: usize,
    pub skipped: usize,
}

/// Decode a training sample, run it through the augmentation engine and
/// write every resulting image and label file.
///
/// `times == None` writes the sample once under its own name. A decode
/// failure is returned to the caller rather than skipped.
pub fn process_train_sample<R: Rng + ?Sized>(
    sample: &Sample,
    annotations: &[Annotation],
    output_dirs: &OutputDirs,
    pipeline: &AugmentPipeline,
    times: Option<usize>,
    empty_labels: EmptyLabelPolicy,
    rng: &mut R,
) -> Result<TrainOutcome> {
    let image = image::open(&sample.image_path)
        .map_err(|source| ConvertError::Decode {
            path: sample.image_path.clone(),
            source,
        })?
        .to_rgb8();

    let mut outcome = TrainOutcome::default();
    for variant in pipeline.augment_sample(&sample.name, &image, annotations, times, rng) {
        let lost_every_box = variant.index.is_some()
            && !annotations.is_empty()
            && variant.annotations.is_empty();
        if lost_every_box && empty_labels == EmptyLabelPolicy::Skip {
            warn!(
                "Variant {} lost every bounding box, not writing it.",
                variant.name
            );
            outcome.skipped += 1;
            continue;
        }

        let image_output_path = output_dirs
            .train_images_dir
            .join(format!("{}.{}", variant.name, TRAIN_IMAGE_EXTENSION));
        variant
            .image
            .save(&image_output_path)
            .map_err(|source| ConvertError::Encode {
                path: image_output_path.clone(),
                source,
            })?;

        let label_output_path = output_dirs
            .train_labels_dir
            .join(format!("{}.{}", variant.name, LABEL_EXTENSION));
        write_labels(&label_output_path, &variant.annotations)?;

        debug!(
            "Wrote {} with {} box(es)",
            image_output_path.display(),
            variant.annotations.len()
        );
        outcome.written += 1;
    }

    Ok(outcome)
}

/// Copy a validation sample's image and label file unchanged.
pub fn copy_val_sample(sample: &Sample, output_dirs: &OutputDirs) -> Result<()> {
    let image_output_path = output_dirs
        .val_images_dir
        .join(format!("{}.{}", sample.name, sample.image_extension()));
    copy_existing(&sample.image_path, &image_output_path)?;

    let label_output_path = output_dirs
        .val_labels_dir
        .join(format!("{}.{}", sample.name, LABEL_EXTENSION));
    copy_existing(&sample.label_path, &label_output_path)?;
    Ok(())
}

fn copy_existing(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(ConvertError::MissingInput {
            path: from.to_path_buf(),
        });
    }
    copy(from, to)?;
    Ok(())
}
