use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Static classification label table: label name to numeric class
/// identifier. Loaded once from a JSON resource at startup and shared by
/// reference afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct LabelTable {
    classes: HashMap<String, u32>,
}

impl LabelTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read label table {}: {}", path.display(), e))
        })?;
        let table: LabelTable = serde_json::from_str(&raw)?;

        if table.classes.is_empty() {
            return Err(Error::config(format!(
                "label table {} contains no classes",
                path.display()
            )));
        }

        Ok(table)
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            classes: entries
                .into_iter()
                .map(|(name, id)| (name.into(), id))
                .collect(),
        }
    }

    /// Resolves a label name to its class identifier. A miss is a hard
    /// error, never a silent zero.
    pub fn id(&self, label: &str) -> Result<u32> {
        self.classes
            .get(label)
            .copied()
            .ok_or_else(|| Error::metric_format(format!("label {label:?} is not in the table")))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
