//! Augmentation of training samples.
//!
//! Every variant runs the same five transforms, each switched on by its own
//! draw from the caller's random generator. Boxes follow the geometric
//! transforms (flip, rotation) and are clipped to the frame afterwards; a box
//! with nothing left inside the frame is dropped together with its class id.

use image::{imageops, Rgb, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::noise::gaussian_noise_mut;
use log::trace;
use rand::Rng;

use crate::types::{Annotation, BoundingBox};

pub const DEFAULT_AUGMENT_TIMES: u32 = 4;

// Candidate Gaussian kernel sizes; the sigma is derived from the size
const BLUR_KERNEL_SIZES: [u32; 3] = [3, 5, 7];

/// Probabilities and ranges of the transforms applied to each variant.
///
/// Probabilities must lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentPipeline {
    pub flip_p: f64,
    pub brightness_contrast_p: f64,
    pub blur_p: f64,
    pub noise_p: f64,
    pub rotate_p: f64,
    /// Brightness shift drawn from `[-limit, limit]`, as a fraction of 255.
    pub brightness_limit: f64,
    /// Contrast gain drawn from `1 + [-limit, limit]`.
    pub contrast_limit: f64,
    /// Noise variance range, in squared pixel levels.
    pub noise_var_limit: (f64, f64),
    /// Rotation angle drawn from `[-limit, limit]` degrees.
    pub rotate_limit: f64,
}

impl Default for AugmentPipeline {
    fn default() -> Self {
        Self {
            flip_p: 0.5,
            brightness_contrast_p: 0.3,
            blur_p: 0.2,
            noise_p: 0.2,
            rotate_p: 0.3,
            brightness_limit: 0.2,
            contrast_limit: 0.2,
            noise_var_limit: (10.0, 50.0),
            rotate_limit: 10.0,
        }
    }
}

/// One output pair of the engine.
#[derive(Debug, Clone)]
pub struct AugmentedVariant {
    /// Output base name: the source name, or `<name>_aug<i>`.
    pub name: String,
    /// `None` when augmentation is disabled.
    pub index: Option<usize>,
    pub image: RgbImage,
    pub annotations: Vec<Annotation>,
}

pub fn variant_name(name: &str, index: usize) -> String {
    format!("{}_aug{}", name, index)
}

impl AugmentPipeline {
    /// Produce the output pairs for one sample.
    ///
    /// With `times == None` the sample is passed through once under its own
    /// name. Otherwise `times` variants are drawn one after the other from `rng`.
    pub fn augment_sample<R: Rng + ?Sized>(
        &self,
        name: &str,
        image: &RgbImage,
        annotations: &[Annotation],
        times: Option<usize>,
        rng: &mut R,
    ) -> Vec<AugmentedVariant> {
        match times {
            None => vec![AugmentedVariant {
                name: name.to_string(),
                index: None,
                image: image.clone(),
                annotations: annotations.to_vec(),
            }],
            Some(times) => (0..times)
                .map(|index| {
                    let (image, annotations) = self.apply(image, annotations, rng);
                    AugmentedVariant {
                        name: variant_name(name, index),
                        index: Some(index),
                        image,
                        annotations,
                    }
                })
                .collect(),
        }
    }

    /// Run the transform pipeline once.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        image: &RgbImage,
        annotations: &[Annotation],
        rng: &mut R,
    ) -> (RgbImage, Vec<Annotation>) {
        let mut image = image.clone();
        let mut annotations = annotations.to_vec();

        if rng.gen_bool(self.flip_p) {
            trace!("horizontal flip");
            imageops::flip_horizontal_in_place(&mut image);
            annotations = flip_annotations(&annotations);
        }

        if rng.gen_bool(self.brightness_contrast_p) {
            let alpha = 1.0 + rng.gen_range(-self.contrast_limit..=self.contrast_limit);
            let beta = rng.gen_range(-self.brightness_limit..=self.brightness_limit);
            trace!("brightness/contrast alpha={:.3} beta={:.3}", alpha, beta);
            adjust_brightness_contrast(&mut image, alpha, beta);
        }

        if rng.gen_bool(self.blur_p) {
            let kernel = BLUR_KERNEL_SIZES[rng.gen_range(0..BLUR_KERNEL_SIZES.len())];
            trace!("gaussian blur kernel={}", kernel);
            image = gaussian_blur_f32(&image, kernel_sigma(kernel));
        }

        if rng.gen_bool(self.noise_p) {
            let variance = rng.gen_range(self.noise_var_limit.0..=self.noise_var_limit.1);
            trace!("gaussian noise variance={:.1}", variance);
            gaussian_noise_mut(&mut image, 0.0, variance.sqrt(), rng.gen());
        }

        if rng.gen_bool(self.rotate_p) {
            let angle = rng.gen_range(-self.rotate_limit..=self.rotate_limit);
            trace!("rotation {:.2} degrees", angle);
            let (width, height) = image.dimensions();
            image = rotate_about_center(
                &image,
                angle.to_radians() as f32,
                Interpolation::Bilinear,
                Rgb([0, 0, 0]),
            );
            annotations = rotate_annotations(&annotations, angle, width, height);
        }

        (image, clip_annotations(&annotations))
    }
}

// Gaussian sigma matching a kernel size, as OpenCV derives it for sigma = 0
fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// `out = alpha * px + beta * 255`, saturated to the channel range.
pub fn adjust_brightness_contrast(image: &mut RgbImage, alpha: f64, beta: f64) {
    let shift = beta * 255.0;
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (alpha * f64::from(*channel) + shift).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Clip boxes to the frame, dropping those with nothing left inside.
pub fn clip_annotations(annotations: &[Annotation]) -> Vec<Annotation> {
    annotations
        .iter()
        .filter_map(|annotation| {
            annotation
                .bbox
                .clip_to_frame()
                .map(|bbox| Annotation::new(annotation.class_id, bbox))
        })
        .collect()
}

/// Mirror boxes around the vertical centre line, dropping any left outside the frame.
pub fn flip_annotations(annotations: &[Annotation]) -> Vec<Annotation> {
    annotations
        .iter()
        .filter_map(|annotation| {
            let bbox = BoundingBox {
                x_center: 1.0 - annotation.bbox.x_center,
                ..annotation.bbox
            };
            bbox.clip_to_frame()
                .map(|bbox| Annotation::new(annotation.class_id, bbox))
        })
        .collect()
}

/// Rotate boxes by `angle_deg` (clockwise on screen) about the image centre,
/// dropping any left outside the frame.
pub fn rotate_annotations(
    annotations: &[Annotation],
    angle_deg: f64,
    width: u32,
    height: u32,
) -> Vec<Annotation> {
    annotations
        .iter()
        .filter_map(|annotation| {
            rotate_bbox(&annotation.bbox, angle_deg, width, height)
                .clip_to_frame()
                .map(|bbox| Annotation::new(annotation.class_id, bbox))
        })
        .collect()
}

/// Enclosing box of the rotated corners, unclipped.
///
/// Corners are rotated in pixel space so the result matches the pixels moved
/// by `rotate_about_center` on non-square images.
pub fn rotate_bbox(bbox: &BoundingBox, angle_deg: f64, width: u32, height: u32) -> BoundingBox {
    let (w, h) = (f64::from(width), f64::from(height));
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (sin, cos) = angle_deg.to_radians().sin_cos();

    let (x_min, y_min, x_max, y_max) = bbox.to_xyxy();
    let corners = [(x_min, y_min), (x_max, y_min), (x_max, y_max), (x_min, y_max)];

    let (min_x, min_y, max_x, max_y) = corners.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(min_x, min_y, max_x, max_y), &(x, y)| {
            let (dx, dy) = (x * w - cx, y * h - cy);
            let (rx, ry) = (cx + cos * dx - sin * dy, cy + sin * dx + cos * dy);
            (min_x.min(rx), min_y.min(ry), max_x.max(rx), max_y.max(ry))
        },
    );

    BoundingBox::from_xyxy(min_x / w, min_y / h, max_x / w, max_y / h)
}
