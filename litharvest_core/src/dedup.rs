//! Exact-duplicate removal across sources.
//!
//! The key is `(doi or paper_id, published, chunk_id, text_chunk)`; the
//! first occurrence in input order wins, which is what makes the fixed
//! source precedence order meaningful.

use crate::model::ChunkRecord;
use std::collections::HashSet;

type DedupKey = (String, String, usize, String);

fn dedup_key(record: &ChunkRecord) -> DedupKey {
    (
        record
            .doi
            .clone()
            .unwrap_or_else(|| record.paper_id.clone()),
        record.published.clone(),
        record.chunk_id,
        record.text_chunk.clone(),
    )
}

/// Retain the first occurrence of each dedup key, in input order.
pub fn dedup_records(records: Vec<ChunkRecord>) -> Vec<ChunkRecord> {
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Source;

    fn record(source: Source, doi: Option<&str>, chunk_id: usize, text: &str) -> ChunkRecord {
        ChunkRecord {
            paper_id: format!("{}-id", source.as_str()),
            source,
            title: "Shared title".to_string(),
            authors: "A. Author".to_string(),
            published: "2024-02-01".to_string(),
            chunk_id,
            text_chunk: text.to_string(),
            pdf_url: None,
            abstract_text: text.to_string(),
            doi: doi.map(|d| d.to_string()),
        }
    }

    #[test]
    fn first_source_wins_for_identical_keys() {
        let records = vec![
            record(Source::Arxiv, Some("10.1/abc"), 0, "same text"),
            record(Source::Medrxiv, Some("10.1/abc"), 0, "same text"),
        ];
        let deduped = dedup_records(records);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].source, Source::Arxiv);
    }

    #[test]
    fn differing_chunk_text_is_kept() {
        let records = vec![
            record(Source::Arxiv, Some("10.1/abc"), 0, "first chunk"),
            record(Source::Medrxiv, Some("10.1/abc"), 0, "different chunk"),
        ];
        assert_eq!(dedup_records(records).len(), 2);
    }

    #[test]
    fn paper_id_is_the_key_when_doi_is_absent() {
        let records = vec![
            record(Source::Medrxiv, None, 1, "text"),
            record(Source::Medrxiv, None, 1, "text"),
            record(Source::Medrxiv, None, 2, "text"),
        ];
        // Same paper_id within one source: the repeat collapses, the
        // distinct chunk_id survives.
        assert_eq!(dedup_records(records).len(), 2);
    }

    #[test]
    fn dedup_is_idempotent() {
        let records = vec![
            record(Source::Arxiv, Some("10.1/abc"), 0, "alpha"),
            record(Source::Medrxiv, Some("10.1/abc"), 0, "alpha"),
            record(Source::EuropePmc, None, 0, "beta"),
        ];
        let once = dedup_records(records);
        let twice = dedup_records(once.clone());
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_eq!(a.paper_id, b.paper_id);
            assert_eq!(a.chunk_id, b.chunk_id);
            assert_eq!(a.text_chunk, b.text_chunk);
        }
    }
}
