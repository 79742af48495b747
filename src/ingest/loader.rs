//! PDF loading. One document per page, mirroring the page-level metadata
//! (`source`, `page`, `total_pages`) attached by common PDF loaders.

use crate::error::RagError;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct PageDocument {
    pub text: String,
    pub metadata: Map<String, Value>,
}

pub fn load_pdf(path: &Path) -> Result<Vec<PageDocument>, RagError> {
    if !path.exists() {
        return Err(RagError::NotFound);
    }

    let doc = lopdf::Document::load(path).map_err(|err| RagError::Load(err.to_string()))?;
    let pages = doc.get_pages();
    let total_pages = pages.len();

    let mut out = Vec::with_capacity(total_pages);
    for &number in pages.keys() {
        // A single unextractable page (e.g. image-only) yields empty text
        // rather than failing the whole document.
        let text = match doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(err) => {
                warn!(page = number, error = %err, "failed to extract page text");
                String::new()
            }
        };

        let mut metadata = Map::new();
        metadata.insert("source".to_string(), json!(path.display().to_string()));
        metadata.insert("page".to_string(), json!(number));
        metadata.insert("total_pages".to_string(), json!(total_pages));

        out.push(PageDocument { text, metadata });
    }

    Ok(out)
}
