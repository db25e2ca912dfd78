//! Global data sets loaded from `data/*.{json,yaml,yml}`.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }
}

/// Data sets keyed by file stem, shared read-only by every render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalData {
    sets: BTreeMap<String, Value>,
}

impl GlobalData {
    /// Load every data file directly inside `dir`.
    ///
    /// A missing directory means no data. Files are read in name order, so
    /// `site.yaml` wins over `site.json` when both exist.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let mut data = Self::default();
        if !dir.is_dir() {
            tracing::debug!("Data directory {:?} not found", dir);
            return Ok(data);
        }

        let read_err = |source| DataError::Read {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_file() && DataFormat::from_path(&path).is_some() {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = name.to_string();
            let value = load_file(&path)?;
            tracing::debug!("Loaded data set '{}' from {:?}", name, path);
            data.sets.insert(name, value);
        }

        Ok(data)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.sets.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.sets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<'a> IntoIterator for &'a GlobalData {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.iter()
    }
}

fn load_file(path: &Path) -> Result<Value, DataError> {
    let text = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match DataFormat::from_path(path) {
        Some(DataFormat::Json) => serde_json::from_str(&text).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        }),
        _ => serde_yaml::from_str(&text).map_err(|source| DataError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}
