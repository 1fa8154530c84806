//! Minimal filesystem connector: walks a directory for markdown files and
//! turns each into a single-section [`Document`]. Real connectors (Slack,
//! Confluence, ...) are out of scope (spec §1); this exists only so
//! `retrieval-cli index` has something to feed the pipeline.

use anyhow::{Context, Result};
use retrieval_core::{Document, Section, SourceType};
use std::path::Path;

/// Recursively collect every `.md`/`.markdown` file under `root` into a
/// `Document`, one per file, id'd by its path relative to `root`.
pub fn load_documents(root: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    walk(root, root, &mut documents)?;
    Ok(documents)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<Document>) -> Result<()> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, out)?;
            continue;
        }
        let is_markdown = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("md") | Some("markdown")
        );
        if !is_markdown {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| relative.clone());
        let metadata = std::fs::metadata(&path)?;
        let doc_updated_at = metadata
            .modified()
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t));

        out.push(Document {
            id: relative.clone(),
            semantic_identifier: title,
            source_type: SourceType::File,
            sections: vec![Section::new(content).with_link(relative)],
            metadata: Default::default(),
            primary_owners: Default::default(),
            secondary_owners: Default::default(),
            doc_updated_at,
        });
    }
    Ok(())
}
