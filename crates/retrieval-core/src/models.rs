use crate::error::{Result, RetrievalError};
use crate::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Enumerated origin of a document, carried through to the engine's
/// `source_type` field and usable as a query filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    File,
    Web,
    Slack,
    Confluence,
    GoogleDrive,
    Github,
    Notion,
    Other(String),
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::File => write!(f, "file"),
            SourceType::Web => write!(f, "web"),
            SourceType::Slack => write!(f, "slack"),
            SourceType::Confluence => write!(f, "confluence"),
            SourceType::GoogleDrive => write!(f, "google_drive"),
            SourceType::Github => write!(f, "github"),
            SourceType::Notion => write!(f, "notion"),
            SourceType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// One ordered section of a document's content. Order is semantically
/// significant: it determines chunk emission order (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub text: String,
    pub link: Option<String>,
}

impl Section {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// A logical source record produced by a connector, prior to chunking.
///
/// `doc_updated_at`, if present, must be UTC — a mixed-zone value is
/// rejected by [`Document::validate`] rather than silently normalized
/// (spec §3 invariants, §7 "programmer error").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub semantic_identifier: String,
    pub source_type: SourceType,
    pub sections: Vec<Section>,
    pub metadata: HashMap<String, String>,
    pub primary_owners: BTreeSet<String>,
    pub secondary_owners: BTreeSet<String>,
    pub doc_updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// First non-empty section link, used by the pipeline to populate the
    /// record-of-truth's `first_non_empty_link` field (spec §4.3 step 2).
    pub fn first_non_empty_link(&self) -> Option<&str> {
        self.sections
            .iter()
            .find_map(|s| s.link.as_deref())
            .filter(|l| !l.is_empty())
    }

    /// Reject an empty id up front; everything downstream (chunk ids,
    /// record-of-truth keys, engine document ids) assumes a non-empty
    /// string (spec §7, "programmer error" surfaced immediately).
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(RetrievalError::validation(
                "id",
                "document id must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_link_skips_unlinked_sections() {
        let doc = Document {
            id: "doc1".into(),
            semantic_identifier: "Doc One".into(),
            source_type: SourceType::File,
            sections: vec![
                Section::new("intro"),
                Section::new("body").with_link("https://example.com/body"),
            ],
            metadata: HashMap::new(),
            primary_owners: BTreeSet::new(),
            secondary_owners: BTreeSet::new(),
            doc_updated_at: None,
        };
        assert_eq!(
            doc.first_non_empty_link(),
            Some("https://example.com/body")
        );
    }

    #[test]
    fn validate_rejects_empty_id() {
        let doc = Document {
            id: String::new(),
            semantic_identifier: "x".into(),
            source_type: SourceType::File,
            sections: vec![],
            metadata: HashMap::new(),
            primary_owners: BTreeSet::new(),
            secondary_owners: BTreeSet::new(),
            doc_updated_at: None,
        };
        assert!(doc.validate().is_err());
    }
}
