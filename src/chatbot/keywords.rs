//! Keyword -> canned answer table.

use crate::error::{Result, WaterError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_KEYWORDS: &str = include_str!("../../data/keywords.toml");

#[derive(Debug, Deserialize)]
struct KeywordFile {
    keywords: BTreeMap<String, String>,
}

/// Static mapping from a lowercase trigger token to its answer
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: BTreeMap<String, String>,
}

impl KeywordTable {
    /// Parse a `[keywords]` TOML table. Keys must be single lowercase tokens.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: KeywordFile = toml::from_str(content).map_err(|e| WaterError::Keywords {
            message: format!("invalid keyword file: {}", e),
        })?;
        if file.keywords.is_empty() {
            return Err(WaterError::Keywords {
                message: "keyword table is empty".into(),
            });
        }
        if let Some(bad) = file
            .keywords
            .keys()
            .find(|k| k.is_empty() || k.chars().any(char::is_whitespace) || **k != k.to_lowercase())
        {
            return Err(WaterError::Keywords {
                message: format!("trigger '{}' must be a single lowercase token", bad),
            });
        }
        Ok(Self {
            entries: file.keywords,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| WaterError::Keywords {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_KEYWORDS)
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
