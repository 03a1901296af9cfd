//! Context assembly: turning ranked chunks into a bounded prompt context.

use std::fmt::Write as _;

use crate::document::{DocChunk, ScoredChunk};

/// The assembled prompt context and its deduplicated source listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// Concatenated chunk texts under positional labels.
    pub text: String,
    /// Human-readable provenance strings, first-seen order, no duplicates.
    pub sources: Vec<String>,
}

/// Build a bounded context window from the best-ranked chunks.
///
/// Takes at most `limit` entries in rank order. Each contributes a
/// positionally labelled section to the context text and a formatted source
/// string to the source list; a source string already present is not added
/// again (two chunks from the same page of the same file share one entry).
pub fn assemble_context(ranked: &[ScoredChunk], limit: usize) -> AssembledContext {
    let mut text = String::new();
    let mut sources: Vec<String> = Vec::new();

    for (i, entry) in ranked.iter().take(limit).enumerate() {
        let _ = write!(text, "Document {}:\n{}\n\n", i + 1, entry.chunk.text);

        let label = source_label(&entry.chunk);
        if !sources.contains(&label) {
            sources.push(label);
        }
    }

    AssembledContext { text, sources }
}

/// Human-readable provenance for a chunk: `source [(Page p)] [- type]`.
///
/// An absent or empty `source` renders as `Unknown`; absent `page` and
/// `type` are simply omitted.
pub fn source_label(chunk: &DocChunk) -> String {
    let mut label = chunk.meta_str("source").unwrap_or_else(|| "Unknown".to_string());
    if let Some(page) = chunk.meta_str("page") {
        let _ = write!(label, " (Page {page})");
    }
    if let Some(kind) = chunk.meta_str("type") {
        let _ = write!(label, " - {kind}");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;
    use serde_json::json;

    fn scored(text: &str, source: &str, page: Option<u32>, kind: Option<&str>) -> ScoredChunk {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!(source));
        if let Some(page) = page {
            metadata.insert("page".to_string(), json!(page));
        }
        if let Some(kind) = kind {
            metadata.insert("type".to_string(), json!(kind));
        }
        ScoredChunk { chunk: DocChunk::new(text, metadata), score: 0.8 }
    }

    #[test]
    fn takes_exactly_the_top_entries() {
        let ranked: Vec<ScoredChunk> =
            (0..7).map(|i| scored(&format!("chunk {i}"), "doc.pdf", Some(i), None)).collect();
        let assembled = assemble_context(&ranked, 5);

        assert!(assembled.text.contains("Document 1:\nchunk 0\n\n"));
        assert!(assembled.text.contains("Document 5:\nchunk 4\n\n"));
        assert!(!assembled.text.contains("chunk 5"));
        assert!(assembled.sources.len() <= 5);
    }

    #[test]
    fn source_list_deduplicates_formatted_strings() {
        let ranked = vec![
            scored("a", "manual.pdf", Some(3), Some("pdf")),
            scored("b", "manual.pdf", Some(3), Some("pdf")),
            scored("c", "notes.txt", None, None),
        ];
        let assembled = assemble_context(&ranked, 5);
        assert_eq!(
            assembled.sources,
            vec!["manual.pdf (Page 3) - pdf".to_string(), "notes.txt".to_string()]
        );
    }

    #[test]
    fn missing_source_formats_as_unknown() {
        let entry = ScoredChunk { chunk: DocChunk::new("text", Metadata::new()), score: 0.0 };
        assert_eq!(source_label(&entry.chunk), "Unknown");
    }
}
