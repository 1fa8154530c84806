//! Splits a [`Document`] into token-budgeted [`Chunk`]s (spec §4.1).
//!
//! Sections are accumulated into a chunk until the next section would
//! overflow `chunk_size` tokens, at which point the chunk is flushed and a
//! new one started with a small word-overlap carried over from the tail of
//! the previous chunk. A section that alone exceeds `chunk_size` is split
//! into several self-contained chunks by [`chunk_large_section`] rather
//! than accumulated with neighbors.

use retrieval_core::traits::Tokenizer;
use retrieval_core::{Chunk, Document, Result};

/// Take the leading words of `text` until the tokenizer reports at least
/// `blurb_size` tokens, or the text runs out. Mirrors the source's
/// `extract_blurb`: a cheap preview, not a semantic summary.
fn extract_blurb(text: &str, blurb_size: usize, tokenizer: &dyn Tokenizer) -> String {
    if tokenizer.count_tokens(text) <= blurb_size {
        return text.trim().to_string();
    }
    let mut blurb = String::new();
    for word in text.split_whitespace() {
        if !blurb.is_empty() {
            blurb.push(' ');
        }
        blurb.push_str(word);
        if tokenizer.count_tokens(&blurb) >= blurb_size {
            break;
        }
    }
    blurb
}

/// Last `overlap_words` whitespace-delimited words of `text`, used to seed
/// the next chunk when a section boundary forces a flush. The tokenizer
/// interface has no decode step, so overlap is approximated in words rather
/// than an exact token count — documented open-question resolution.
fn tail_words(text: &str, overlap_words: usize) -> String {
    if overlap_words == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    let start = words.len().saturating_sub(overlap_words);
    words[start..].join(" ")
}

struct ChunkBuilder {
    document_id: String,
    content: String,
    source_links: Vec<(usize, Option<String>)>,
}

impl ChunkBuilder {
    fn new(document_id: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            content: String::new(),
            source_links: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn push(&mut self, text: &str, link: Option<String>) {
        self.source_links.push((self.content.len(), link));
        if !self.content.is_empty() && !self.content.ends_with(char::is_whitespace) {
            self.content.push(' ');
        }
        self.content.push_str(text);
    }

    fn finish(self, chunk_id: usize, blurb_size: usize, tokenizer: &dyn Tokenizer, section_continuation: bool) -> Chunk {
        let blurb = extract_blurb(&self.content, blurb_size, tokenizer);
        Chunk {
            document_id: self.document_id,
            chunk_id,
            blurb,
            content: self.content,
            source_links: self.source_links,
            section_continuation,
        }
    }
}

/// Split a single section whose full text exceeds `chunk_size` tokens into
/// several chunks, sentence-aware where possible. The first chunk is not a
/// continuation; later ones are (spec §9: the documented semantics, not
/// the inverted `chunk_document_FAST` behavior).
fn chunk_large_section(
    document_id: &str,
    section_text: &str,
    section_link: &Option<String>,
    start_chunk_id: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    blurb_size: usize,
    tokenizer: &dyn Tokenizer,
) -> Vec<Chunk> {
    let sentences = tokenizer.split_sentences(section_text);
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut builder = ChunkBuilder::new(document_id);

    for sentence in sentences {
        let sentence_tokens = tokenizer.count_tokens(sentence);

        if !builder.is_empty() && tokenizer.count_tokens(&builder.content) + sentence_tokens > chunk_size {
            let carry_over = tail_words(&builder.content, chunk_overlap);
            let continuation = !chunks.is_empty();
            chunks.push(builder.finish(start_chunk_id + chunks.len(), blurb_size, tokenizer, continuation));
            builder = ChunkBuilder::new(document_id);
            if !carry_over.is_empty() {
                builder.push(&carry_over, section_link.clone());
            }
        }

        // An irreducible over-budget sentence is emitted as its own chunk
        // untouched (spec §8 "Chunker token bound" carve-out).
        if sentence_tokens > chunk_size && builder.is_empty() {
            builder.push(sentence, section_link.clone());
            let continuation = !chunks.is_empty();
            chunks.push(builder.finish(start_chunk_id + chunks.len(), blurb_size, tokenizer, continuation));
            builder = ChunkBuilder::new(document_id);
            continue;
        }

        builder.push(sentence, section_link.clone());
    }

    if !builder.is_empty() {
        let continuation = !chunks.is_empty();
        chunks.push(builder.finish(start_chunk_id + chunks.len(), blurb_size, tokenizer, continuation));
    }

    chunks
}

/// Split `document` into dense, ascending-id chunks (spec §4.1, §3
/// invariants). Fails only if the document itself fails [`Document::validate`].
pub fn chunk_document(
    document: &Document,
    tokenizer: &dyn Tokenizer,
    chunk_size: usize,
    chunk_overlap: usize,
    blurb_size: usize,
) -> Result<Vec<Chunk>> {
    document.validate()?;

    let mut chunks = Vec::new();
    let mut builder = ChunkBuilder::new(&document.id);

    for section in &document.sections {
        let section_tokens = tokenizer.count_tokens(&section.text);

        if section_tokens > chunk_size {
            if !builder.is_empty() {
                chunks.push(builder.finish(chunks.len(), blurb_size, tokenizer, false));
                builder = ChunkBuilder::new(&document.id);
            }
            let large = chunk_large_section(
                &document.id,
                &section.text,
                &section.link,
                chunks.len(),
                chunk_size,
                chunk_overlap,
                blurb_size,
                tokenizer,
            );
            chunks.extend(large);
            continue;
        }

        let current_tokens = tokenizer.count_tokens(&builder.content);
        if !builder.is_empty() && current_tokens + section_tokens > chunk_size {
            let carry_over = tail_words(&builder.content, chunk_overlap);
            chunks.push(builder.finish(chunks.len(), blurb_size, tokenizer, false));
            builder = ChunkBuilder::new(&document.id);
            if !carry_over.is_empty() {
                builder.push(&carry_over, section.link.clone());
            }
        }

        builder.push(&section.text, section.link.clone());
    }

    if !builder.is_empty() {
        chunks.push(builder.finish(chunks.len(), blurb_size, tokenizer, false));
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrieval_core::traits::WhitespaceTokenizer;
    use retrieval_core::{Section, SourceType};

    fn doc(sections: Vec<Section>) -> Document {
        Document {
            id: "doc1".into(),
            semantic_identifier: "doc1".into(),
            source_type: SourceType::File,
            sections,
            metadata: Default::default(),
            primary_owners: Default::default(),
            secondary_owners: Default::default(),
            doc_updated_at: None,
        }
    }

    #[test]
    fn fresh_insert_single_small_section_yields_one_chunk() {
        let words = (0..200).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let document = doc(vec![Section::new(words)]);
        let tokenizer = WhitespaceTokenizer;
        let chunks = chunk_document(&document, &tokenizer, 512, 0, 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_id, 0);
        assert!(!chunks[0].section_continuation);
    }

    #[test]
    fn self_contained_large_section_yields_multiple_chunks_with_continuation_flags() {
        let words = (0..2000).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let document = doc(vec![Section::new(words)]);
        let tokenizer = WhitespaceTokenizer;
        let chunks = chunk_document(&document, &tokenizer, 512, 0, 100).unwrap();
        assert!(chunks.len() >= 4, "expected at least 4 chunks, got {}", chunks.len());
        assert!(!chunks[0].section_continuation);
        assert!(chunks[1..].iter().all(|c| c.section_continuation));
    }

    #[test]
    fn chunk_ids_are_dense_and_ascending() {
        let words = (0..2000).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let document = doc(vec![Section::new(words)]);
        let tokenizer = WhitespaceTokenizer;
        let chunks = chunk_document(&document, &tokenizer, 512, 0, 100).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_id, i);
        }
    }

    #[test]
    fn link_offsets_are_monotonic() {
        let document = doc(vec![
            Section::new("alpha beta gamma".to_string()).with_link("https://a".to_string()),
            Section::new("delta epsilon zeta".to_string()).with_link("https://b".to_string()),
        ]);
        let tokenizer = WhitespaceTokenizer;
        let chunks = chunk_document(&document, &tokenizer, 512, 0, 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].source_links_are_monotonic());
    }

    #[test]
    fn reindex_with_fewer_sections_shrinks_chunk_count() {
        let tokenizer = WhitespaceTokenizer;
        let words = |n: usize| (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");

        let first = doc(vec![Section::new(words(2200))]);
        let first_chunks = chunk_document(&first, &tokenizer, 512, 0, 100).unwrap();
        assert!(first_chunks.len() >= 5);

        let second = doc(vec![Section::new(words(900))]);
        let second_chunks = chunk_document(&second, &tokenizer, 512, 0, 100).unwrap();
        assert!(second_chunks.len() < first_chunks.len());
        assert!(second_chunks.len() <= 2);
    }
}
