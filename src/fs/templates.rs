//! The reaction template library.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

use super::table::Table;
use crate::models::constants::TEMPLATE_COLUMN;

/// Ordered template SMARTS with fast membership checks.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<String>,
    index: HashSet<String>,
}

impl TemplateLibrary {
    /// Load the `canonical_smarts` column of a (gzip) tab-separated library.
    pub fn load(path: &Path) -> Result<Self> {
        let table = Table::read_with(path, Some('\t'))
            .with_context(|| format!("Failed to load template library: {}", path.display()))?;

        let templates = table
            .column(TEMPLATE_COLUMN)
            .with_context(|| format!("Failed to load template library: {}", path.display()))?;

        let library: TemplateLibrary = templates.into_iter().map(str::to_string).collect();
        tracing::debug!(path = %path.display(), templates = library.len(), "loaded template library");
        Ok(library)
    }

    pub fn contains(&self, template: &str) -> bool {
        self.index.contains(template)
    }

    /// Template at a library row, as referenced by `template_code`.
    pub fn get(&self, code: usize) -> Option<&str> {
        self.templates.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl FromIterator<String> for TemplateLibrary {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let templates: Vec<String> = iter.into_iter().collect();
        let index = templates.iter().cloned().collect();
        Self { templates, index }
    }
}
