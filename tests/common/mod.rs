#![allow(dead_code)]

use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

pub const CLASSES: [&str; 3] = ["cat", "dog", "bird"];

// Two boxes per sample, written in the same 6-decimal form the converter uses
pub const LABEL: &str = "0 0.500000 0.500000 0.250000 0.250000\n2 0.200000 0.300000 0.100000 0.150000\n";

pub fn sample_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("img{:03}", i)).collect()
}

pub fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
    })
}

pub fn write_classes(dir: &Path) {
    fs::write(dir.join("classes.txt"), CLASSES.join("\n") + "\n").unwrap();
}

pub fn write_sample(dir: &Path, name: &str, ext: &str, label: &str) {
    test_image(32, 24)
        .save(dir.join(format!("{}.{}", name, ext)))
        .unwrap();
    fs::write(dir.join(format!("{}.txt", name)), label).unwrap();
}

/// A flat upload directory with `count` png samples and classes.txt.
pub fn write_source(dir: &Path, count: usize) -> Vec<String> {
    write_classes(dir);
    let names = sample_names(count);
    for name in &names {
        write_sample(dir, name, "png", LABEL);
    }
    names
}

/// Base names of the files in `dir` with the given extension, sorted.
pub fn stems(dir: &Path, ext: &str) -> Vec<String> {
    let mut stems: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == ext))
        .map(|path| path.file_stem().unwrap().to_string_lossy().into_owned())
        .collect();
    stems.sort();
    stems
}
