use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{DataError, DataResult};
use crate::frame::Frame;

#[derive(Debug, Deserialize)]
struct MappingFile {
    columns: BTreeMap<String, Vec<String>>,
}

/// Canonical feature name → known aliases across source datasets.
///
/// Every canonical name is implicitly an alias of itself. No alias may
/// resolve to two canonical names.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    canonical: BTreeMap<String, Vec<String>>,
    lookup: HashMap<String, String>,
}

impl AliasTable {
    /// Load the table from a YAML file with a top-level `columns:` mapping.
    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let table = Self::from_yaml_str(&content)?;
        debug!(
            path = %path.display(),
            canonical = table.canonical.len(),
            aliases = table.lookup.len(),
            "column alias table loaded"
        );
        Ok(table)
    }

    pub fn from_yaml_str(content: &str) -> DataResult<Self> {
        let file: MappingFile = serde_yaml::from_str(content)
            .map_err(|e| DataError::Config(format!("malformed column mapping: {}", e)))?;
        Self::from_entries(file.columns)
    }

    pub fn from_entries<I, S>(entries: I) -> DataResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        let mut table = AliasTable::default();
        for (canonical, aliases) in entries {
            let canonical = canonical.into();
            let aliases: Vec<String> = aliases.into_iter().map(Into::into).collect();
            table.claim(&canonical, &canonical)?;
            for alias in &aliases {
                table.claim(alias, &canonical)?;
            }
            table.canonical.insert(canonical, aliases);
        }
        Ok(table)
    }

    fn claim(&mut self, alias: &str, canonical: &str) -> DataResult<()> {
        match self.lookup.get(alias) {
            Some(owner) if owner != canonical => Err(DataError::DuplicateAlias {
                alias: alias.to_string(),
                first: owner.clone(),
                second: canonical.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.lookup.insert(alias.to_string(), canonical.to_string());
                Ok(())
            }
        }
    }

    pub fn canonical_for(&self, name: &str) -> Option<&str> {
        self.lookup.get(name).map(String::as_str)
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.canonical.keys().map(String::as_str)
    }

    pub fn aliases_of(&self, canonical: &str) -> Option<&[String]> {
        self.canonical.get(canonical).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}

/// Rename every column whose name is a known alias to its canonical name.
///
/// Unknown columns pass through. When two source columns resolve to the same
/// canonical name the first keeps the canonical name and the later one keeps
/// its original name.
pub fn standardize(frame: &Frame, table: &AliasTable) -> Frame {
    let mut out = frame.clone();
    for name in frame.column_names() {
        let Some(canonical) = table.canonical_for(name) else {
            continue;
        };
        if canonical == name {
            continue;
        }
        if out.rename(name, canonical).is_err() {
            warn!(column = name, canonical, "canonical column already present, keeping original name");
        }
    }
    out
}
