//! Configuration documents - the ordered part list behind one catalog entry
//!
//! Index 0 of a document is always the base part. Every other entry is an
//! attachment that belongs to exactly one category. Attachments that do not
//! name a category are given a singleton category keyed by their asset
//! reference, so they toggle independently of everything else.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::catalog::CatalogEntry;
use crate::part::{PartDescriptor, PartRecord, PartRole};

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration document has no parts")]
    Empty,
}

/// Ordered sequence of part descriptors for one catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationDocument {
    pub entry: CatalogEntry,
    parts: Vec<PartDescriptor>,
}

/// All options offered for a single category, in document order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryOptions<'a> {
    pub category: &'a str,
    pub options: Vec<&'a PartDescriptor>,
}

impl ConfigurationDocument {
    /// Parse a JSON array of part records
    pub fn from_json(entry: CatalogEntry, content: &str) -> Result<Self, DocumentError> {
        let records: Vec<PartRecord> = serde_json::from_str(content)?;
        Self::from_records(entry, records)
    }

    /// Assign roles to raw records: first is the base, the rest are attachments
    pub fn from_records(entry: CatalogEntry, records: Vec<PartRecord>) -> Result<Self, DocumentError> {
        if records.is_empty() {
            return Err(DocumentError::Empty);
        }

        let parts = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let category = record
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string);

                let role = if index == 0 {
                    if let Some(category) = category {
                        warn!(
                            entry = %entry,
                            category = %category,
                            "Ignoring category on base part"
                        );
                    }
                    PartRole::Base
                } else {
                    PartRole::Attachment {
                        category: category.unwrap_or_else(|| record.file_path.clone()),
                    }
                };

                PartDescriptor::from_record(record, role)
            })
            .collect();

        Ok(Self { entry, parts })
    }

    pub fn base(&self) -> &PartDescriptor {
        // from_records rejects empty documents
        &self.parts[0]
    }

    pub fn parts(&self) -> &[PartDescriptor] {
        &self.parts
    }

    pub fn attachments(&self) -> impl Iterator<Item = &PartDescriptor> {
        self.parts.iter().skip(1)
    }

    /// Distinct attachment categories in first-appearance order
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for category in self.attachments().filter_map(PartDescriptor::category) {
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Options of one category, in document order
    pub fn options(&self, category: &str) -> Vec<&PartDescriptor> {
        self.attachments()
            .filter(|p| p.category() == Some(category))
            .collect()
    }

    /// Every category together with its options
    pub fn grouped(&self) -> Vec<CategoryOptions<'_>> {
        self.categories()
            .into_iter()
            .map(|category| CategoryOptions {
                category,
                options: self.options(category),
            })
            .collect()
    }

    /// Look up an attachment by category and asset reference
    pub fn find(&self, category: &str, asset_reference: &str) -> Option<&PartDescriptor> {
        self.attachments()
            .find(|p| p.category() == Some(category) && p.asset_reference == asset_reference)
    }
}
