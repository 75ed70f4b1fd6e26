//! Parser for YOLT/YOLO bounding-box label files.
//!
//! One row per object: `class_id x_center y_center width height`, all four
//! coordinates expressed as fractions of the image dimensions.

use std::fs;
use std::path::Path;

use crate::error::ConvertError;

/// A single parsed label row, still in normalized center/size form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelRow {
    /// 1-based line number in the label file, kept for error context.
    pub line: usize,
    pub class_id: i64,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

/// Reads and parses a whole label file. Blank lines are skipped.
pub fn read_label_file(path: &Path) -> Result<Vec<LabelRow>, ConvertError> {
    let content = fs::read_to_string(path).map_err(ConvertError::Io)?;
    let mut rows = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        if let Some(row) = parse_label_line(line, path, line_idx + 1)? {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Parses one label line. Returns `Ok(None)` for blank lines.
pub fn parse_label_line(
    line: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<Option<LabelRow>, ConvertError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();

    if tokens.len() < 5 {
        return Err(ConvertError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("expected 5 tokens, found {}", tokens.len()),
        });
    }

    if tokens.len() > 5 {
        return Err(ConvertError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: "expected 5 tokens; segmentation/pose rows are not supported".to_string(),
        });
    }

    let class_id = tokens[0]
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| ConvertError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!(
                "invalid class_id '{}'; expected non-negative integer",
                tokens[0]
            ),
        })?;

    let cx = parse_fraction(tokens[1], "x_center", file_path, line_num)?;
    let cy = parse_fraction(tokens[2], "y_center", file_path, line_num)?;
    let w = parse_fraction(tokens[3], "width", file_path, line_num)?;
    let h = parse_fraction(tokens[4], "height", file_path, line_num)?;

    Ok(Some(LabelRow {
        line: line_num,
        class_id,
        cx,
        cy,
        w,
        h,
    }))
}

fn parse_fraction(
    raw: &str,
    field_name: &str,
    file_path: &Path,
    line_num: usize,
) -> Result<f64, ConvertError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ConvertError::LabelParse {
            path: file_path.to_path_buf(),
            line: line_num,
            message: format!("invalid {field_name} '{raw}'; expected finite number"),
        })
}
