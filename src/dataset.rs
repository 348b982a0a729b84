use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

use crate::augment::AugmentPipeline;
use crate::config::{ConvertArgs, SplitMode};
use crate::conversion::{copy_val_sample, process_train_sample};
use crate::error::{ConvertError, Result};
use crate::io::{create_dataset_yaml, discover_samples, setup_output_directories};
use crate::labels::{load_checked_labels, load_class_list};
use crate::types::{Annotation, ConversionSummary, Sample, SplitData, CLASSES_FILE};
use crate::utils::{create_progress_bar, validate_output_name};

/// Split the samples into training and validation sets.
///
/// Random mode shuffles with `rng` and cuts at `floor(len * (1 - val_size))`:
/// the head is train, the tail is val. Manual mode takes exactly the named
/// samples for val, in the order given, and leaves the rest for train.
pub fn split_samples<R: Rng + ?Sized>(
    mut samples: Vec<Sample>,
    mode: &SplitMode,
    rng: &mut R,
) -> Result<SplitData> {
    match mode {
        SplitMode::Random { val_size } => {
            samples.shuffle(rng);
            let split_idx = (samples.len() as f64 * (1.0 - val_size)).floor() as usize;
            let val = samples.split_off(split_idx.min(samples.len()));
            Ok(SplitData {
                train: samples,
                val,
            })
        }
        SplitMode::Manual { names } => {
            if names.is_empty() {
                return Err(ConvertError::EmptySelection);
            }

            let by_name: HashMap<&str, &Sample> = samples
                .iter()
                .map(|sample| (sample.name.as_str(), sample))
                .collect();
            let mut selected = HashSet::new();
            let mut val = Vec::with_capacity(names.len());
            for name in names {
                let sample = by_name
                    .get(name.as_str())
                    .ok_or_else(|| ConvertError::UnknownSample { name: name.clone() })?;
                if selected.insert(name.as_str()) {
                    val.push((*sample).clone());
                } else {
                    warn!("Validation sample '{}' selected more than once.", name);
                }
            }

            let train = samples
                .iter()
                .filter(|sample| !selected.contains(sample.name.as_str()))
                .cloned()
                .collect();
            Ok(SplitData { train, val })
        }
    }
}

/// Main dataset conversion pipeline.
///
/// Everything that can be checked up front is checked before the output
/// directory is created. Once writing starts, the first error aborts the run
/// and leaves the files written so far in place.
pub fn process_dataset(args: &ConvertArgs) -> Result<ConversionSummary> {
    args.validate()?;
    validate_output_name(&args.output_name)?;

    let dirname = &args.source_dir;
    if !dirname.is_dir() {
        return Err(ConvertError::MissingInput {
            path: dirname.clone(),
        });
    }
    let classes = load_class_list(&dirname.join(CLASSES_FILE))?;
    if classes.is_empty() {
        warn!("{} lists no classes.", CLASSES_FILE);
    }

    let mode = args.split_mode()?;
    let output_root = args.output_dir();
    if output_root.exists() {
        return Err(ConvertError::OutputConflict { path: output_root });
    }

    let samples = discover_samples(dirname)?;
    info!("Found {} samples in {}.", samples.len(), dirname.display());

    let mut rng = StdRng::seed_from_u64(args.seed);
    let split_data = split_samples(samples, &mode, &mut rng)?;
    info!(
        "Split into {} train and {} val samples.",
        split_data.train.len(),
        split_data.val.len()
    );

    let train_annotations: Vec<Vec<Annotation>> = split_data
        .train
        .iter()
        .map(|sample| load_checked_labels(&sample.label_path, &classes))
        .collect::<Result<_>>()?;
    for sample in &split_data.val {
        load_checked_labels(&sample.label_path, &classes)?;
    }

    let output_dirs = setup_output_directories(&output_root)?;
    let pipeline = AugmentPipeline::default();
    let times = args.augment().then_some(args.augment_times as usize);

    let mut train_count = 0;
    let mut skipped_variants = 0;
    let train_pb = create_progress_bar(split_data.train.len() as u64, "Train");
    for (sample, annotations) in split_data.train.iter().zip(&train_annotations) {
        let outcome = process_train_sample(
            sample,
            annotations,
            &output_dirs,
            &pipeline,
            times,
            args.empty_labels,
            &mut rng,
        )?;
        train_count += outcome.written;
        skipped_variants += outcome.skipped;
        train_pb.inc(1);
    }
    train_pb.finish_with_message("Train processing complete");

    let val_pb = create_progress_bar(split_data.val.len() as u64, "Val");
    for sample in &split_data.val {
        copy_val_sample(sample, &output_dirs)?;
        val_pb.inc(1);
    }
    val_pb.finish_with_message("Val processing complete");

    info!("Creating data.yaml file...");
    create_dataset_yaml(&output_dirs.root, &classes)?;
    info!("Conversion process completed successfully.");

    Ok(ConversionSummary {
        output_dir: output_root,
        train_count,
        val_count: split_data.val.len(),
        augmented: args.augment(),
        augment_times: args.augment_factor(),
        skipped_variants,
    })
}
