//! YAML configuration for the import command.
//!
//! ```yaml
//! report_skips: true
//! contact_field_kinds:
//!   Signal: phone
//!   Mastodon: website
//! skip_tables:
//!   - calls
//! ```

use crate::source::SourceTable;
use crate::translate::{ContactMethodKind, Lookups};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Add one warning per entity summarising rows that were skipped
    pub report_skips: bool,
    /// Extra contact field type names, merged over the built-in dictionary
    pub contact_field_kinds: HashMap<String, ContactMethodKind>,
    /// Source tables to ignore entirely
    pub skip_tables: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            report_skips: true,
            contact_field_kinds: HashMap::new(),
            skip_tables: Vec::new(),
        }
    }
}

impl ImportConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ImportConfig = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Translation dictionaries with this config's overrides applied
    pub fn lookups(&self) -> Lookups {
        Lookups::default().with_contact_field_kinds(
            self.contact_field_kinds
                .iter()
                .map(|(name, kind)| (name.as_str(), *kind)),
        )
    }

    pub fn skips_table(&self, table: SourceTable) -> bool {
        self.skip_tables
            .iter()
            .any(|t| t.trim().eq_ignore_ascii_case(table.name()))
    }

    /// Entries of `skip_tables` that are not Monica tables
    pub fn unknown_skip_tables(&self) -> Vec<&str> {
        self.skip_tables
            .iter()
            .map(|t| t.trim())
            .filter(|t| SourceTable::from_name(t).is_none())
            .collect()
    }
}
