//! Reading and writing YOLO label files and the class list.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::{Annotation, BoundingBox, ClassList};

/// Parse a YOLO label file, one annotation per non-empty line, in file order.
pub fn load_labels(path: &Path) -> Result<Vec<Annotation>> {
    parse_label_file(path, None)
}

/// Like [`load_labels`], but also rejects class ids missing from `classes`.
pub fn load_checked_labels(path: &Path, classes: &ClassList) -> Result<Vec<Annotation>> {
    parse_label_file(path, Some(classes))
}

fn parse_label_file(path: &Path, classes: Option<&ClassList>) -> Result<Vec<Annotation>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConvertError::MissingInput {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let mut annotations = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let annotation = parse_label_line(line, path, line_idx + 1)?;
        if let Some(classes) = classes {
            if !classes.contains_id(annotation.class_id) {
                return Err(ConvertError::MalformedLabel {
                    path: path.to_path_buf(),
                    line: line_idx + 1,
                    message: format!(
                        "class id {} is out of range for {} class(es)",
                        annotation.class_id,
                        classes.len()
                    ),
                });
            }
        }
        annotations.push(annotation);
    }
    Ok(annotations)
}

fn parse_label_line(line: &str, path: &Path, line_num: usize) -> Result<Annotation> {
    let malformed = |message: String| ConvertError::MalformedLabel {
        path: path.to_path_buf(),
        line: line_num,
        message,
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(malformed(format!(
            "expected 5 fields, found {}",
            fields.len()
        )));
    }

    let class_id = fields[0]
        .parse::<usize>()
        .map_err(|_| malformed(format!("invalid class id '{}'", fields[0])))?;

    let mut values = [0.0f64; 4];
    for (value, field) in values.iter_mut().zip(&fields[1..]) {
        *value = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(format!("invalid coordinate '{}'", field)))?;
    }

    Ok(Annotation::new(
        class_id,
        BoundingBox::new(values[0], values[1], values[2], values[3]),
    ))
}

/// Render annotations in label-file form with 6 decimals per coordinate.
pub fn format_labels(annotations: &[Annotation]) -> String {
    let mut yolo_data = String::with_capacity(annotations.len() * 48);
    for annotation in annotations {
        let bbox = &annotation.bbox;
        yolo_data.push_str(&format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            annotation.class_id, bbox.x_center, bbox.y_center, bbox.width, bbox.height
        ));
    }
    yolo_data
}

pub fn write_labels(path: &Path, annotations: &[Annotation]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(format_labels(annotations).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read `classes.txt`: one class name per non-empty line, index = class id.
pub fn load_class_list(path: &Path) -> Result<ClassList> {
    if !path.is_file() {
        return Err(ConvertError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let names = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    Ok(ClassList::new(names))
}
