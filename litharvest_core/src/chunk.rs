//! Fixed-width chunking of article text.
//!
//! Text is whitespace-normalized first, then wrapped greedily on word
//! boundaries into chunks of at most `width` characters. Joining the chunks
//! back with single spaces reconstructs the normalized text.

use crate::model::{ChunkRecord, RawArticle};

pub const DEFAULT_WRAP_WIDTH: usize = 500;

/// Collapse all whitespace runs (including newlines and tabs) to single
/// spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Greedy word-boundary wrap of normalized text into chunks of at most
/// `width` characters. Words longer than the width are split hard.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() || width == 0 {
        return Vec::new();
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in normalized.split(' ') {
        let word_len = word.chars().count();

        if word_len > width {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let mut piece = String::new();
            let mut piece_len = 0usize;
            for ch in word.chars() {
                if piece_len == width {
                    chunks.push(std::mem::take(&mut piece));
                    piece_len = 0;
                }
                piece.push(ch);
                piece_len += 1;
            }
            current = piece;
            current_len = piece_len;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Expand one article into its chunk records. `chunk_id` is the zero-based
/// index within the article; an article with no usable text contributes no
/// records.
pub fn chunk_records(article: &RawArticle, width: usize) -> Vec<ChunkRecord> {
    let normalized = normalize_whitespace(&article.summary);
    wrap_text(&normalized, width)
        .into_iter()
        .enumerate()
        .map(|(chunk_id, text_chunk)| ChunkRecord {
            paper_id: article.paper_id.clone(),
            source: article.source,
            title: article.title.clone(),
            authors: article.authors.clone(),
            published: article.published.clone(),
            chunk_id,
            text_chunk,
            pdf_url: article.pdf_url.clone(),
            abstract_text: normalized.clone(),
            doi: article.doi.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn article(summary: &str) -> RawArticle {
        RawArticle {
            paper_id: "http://arxiv.org/abs/2401.00001v1".to_string(),
            source: Source::Arxiv,
            title: "A title".to_string(),
            authors: "A. Author, B. Author".to_string(),
            published: "2024-01-01".to_string(),
            summary: summary.to_string(),
            doi: None,
            pdf_url: Some("https://arxiv.org/pdf/2401.00001v1.pdf".to_string()),
        }
    }

    #[test]
    fn chunk_ids_are_contiguous_from_zero() {
        let text = "word ".repeat(300);
        let records = chunk_records(&article(&text), 100);
        assert!(records.len() > 1);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.chunk_id, i);
        }
    }

    #[test]
    fn chunks_rejoin_to_normalized_text() {
        let text = "Deep  learning\nmodels for\tclinical prediction tasks. ".repeat(40);
        let normalized = normalize_whitespace(&text);
        let chunks = wrap_text(&text, 80);
        assert_eq!(chunks.join(" "), normalized);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 80);
        }
    }

    #[test]
    fn chunks_contain_no_control_whitespace() {
        let records = chunk_records(&article("line one\nline two\ttabbed\r\nmore"), 20);
        for record in records {
            assert!(!record.text_chunk.contains('\n'));
            assert!(!record.text_chunk.contains('\t'));
            assert!(!record.text_chunk.contains('\r'));
        }
    }

    #[test]
    fn empty_text_yields_no_records() {
        assert!(chunk_records(&article(""), 500).is_empty());
        assert!(chunk_records(&article("   \n\t "), 500).is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let records = chunk_records(&article("a short abstract"), 500);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].chunk_id, 0);
        assert_eq!(records[0].text_chunk, "a short abstract");
    }

    #[test]
    fn oversized_words_are_split_hard() {
        let chunks = wrap_text(&"x".repeat(25), 10);
        assert_eq!(chunks, vec!["xxxxxxxxxx", "xxxxxxxxxx", "xxxxx"]);
    }
}
