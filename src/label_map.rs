//! Label maps and class-id remap tables.
//!
//! A label map is a `.pbtxt`-style text file associating integer class ids
//! with human-readable names:
//!
//! ```text
//! item {
//!   id: 1
//!   name: 'airplane'
//! }
//! ```
//!
//! Ids must start at 1; detection pipelines reserve 0 for background.
//! Label files on the other hand are usually 0-based, so a [`ClassRemap`]
//! bridges the two id spaces before the label-map lookup.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::ConvertError;

/// Mapping from integer class id to class name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelMap {
    entries: BTreeMap<i64, String>,
}

impl LabelMap {
    /// Reads and parses a `.pbtxt` label map from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConvertError> {
        let data = fs::read_to_string(path).map_err(ConvertError::Io)?;
        Self::parse(&data, path)
    }

    /// Parses label map text.
    ///
    /// Only `id:` / `name:` lines matter; an entry is recorded when a
    /// `name:` line follows a pending `id:` line. Everything else
    /// (braces, `item`, comments) is ignored.
    pub fn parse(data: &str, path: &Path) -> Result<Self, ConvertError> {
        let mut entries = BTreeMap::new();
        let mut pending_id: Option<i64> = None;

        for (line_idx, raw) in data.lines().enumerate() {
            let line_num = line_idx + 1;
            let line = raw.trim();

            if let Some(rest) = line.strip_prefix("id:") {
                let value = rest.trim();
                let id = value
                    .parse::<i64>()
                    .map_err(|_| ConvertError::LabelMapParse {
                        path: path.to_path_buf(),
                        line: line_num,
                        message: format!("invalid id '{value}'; expected integer"),
                    })?;
                pending_id = Some(id);
            } else if let Some(rest) = line.strip_prefix("name:") {
                let Some(id) = pending_id.take() else {
                    return Err(ConvertError::LabelMapParse {
                        path: path.to_path_buf(),
                        line: line_num,
                        message: "name: line without a preceding id: line".to_string(),
                    });
                };

                let name = unquote(rest.trim());
                if name.is_empty() {
                    return Err(ConvertError::LabelMapParse {
                        path: path.to_path_buf(),
                        line: line_num,
                        message: "empty class name".to_string(),
                    });
                }

                if entries.insert(id, name.to_string()).is_some() {
                    return Err(ConvertError::LabelMapParse {
                        path: path.to_path_buf(),
                        line: line_num,
                        message: format!("duplicate id {id}"),
                    });
                }
            }
        }

        let map = Self { entries };
        map.validate(path)?;
        Ok(map)
    }

    fn validate(&self, path: &Path) -> Result<(), ConvertError> {
        let Some(min_id) = self.entries.keys().next() else {
            return Err(ConvertError::LabelMapInvalid {
                path: path.to_path_buf(),
                message: "no id/name entries found".to_string(),
            });
        };

        if *min_id != 1 {
            return Err(ConvertError::LabelMapInvalid {
                path: path.to_path_buf(),
                message: format!("class ids must start with 1, found {min_id}"),
            });
        }

        Ok(())
    }

    /// Looks up the name for a class id.
    pub fn name(&self, id: i64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, name)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

fn unquote(raw: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    raw
}

/// Substitution table applied to raw label-file class ids before the
/// label-map lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ClassRemap {
    /// Pass class ids through unchanged.
    #[default]
    Identity,
    /// Add a uniform delta to every class id (typically +1 to bridge
    /// 0-based label files to a 1-based label map).
    Shift(i64),
    /// Explicit per-id substitution; ids absent from the table are errors.
    Table(BTreeMap<i64, i64>),
}

impl ClassRemap {
    pub fn shift(delta: i64) -> Self {
        Self::Shift(delta)
    }

    /// Loads a remap table from a JSON object file, e.g. `{"0": 1, "1": 2}`.
    /// JSON object keys are strings, so raw ids are parsed out of the keys.
    pub fn from_json_file(path: &Path) -> Result<Self, ConvertError> {
        let data = fs::read_to_string(path).map_err(ConvertError::Io)?;
        let raw: BTreeMap<String, i64> =
            serde_json::from_str(&data).map_err(|source| ConvertError::RemapParse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut table = BTreeMap::new();
        for (key, value) in raw {
            let from = key
                .trim()
                .parse::<i64>()
                .map_err(|_| ConvertError::RemapInvalid {
                    path: path.to_path_buf(),
                    message: format!("key '{key}' is not an integer class id"),
                })?;
            if table.insert(from, value).is_some() {
                return Err(ConvertError::RemapInvalid {
                    path: path.to_path_buf(),
                    message: format!("duplicate class id {from}"),
                });
            }
        }

        Ok(Self::Table(table))
    }

    /// Applies the remap to one raw class id. `None` means the table has
    /// no entry for the id.
    pub fn apply(&self, class_id: i64) -> Option<i64> {
        match self {
            Self::Identity => Some(class_id),
            Self::Shift(delta) => Some(class_id + delta),
            Self::Table(table) => table.get(&class_id).copied(),
        }
    }
}
