use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The literature sources this pipeline knows about. The array order of
/// [`Source::PRECEDENCE`] is the fixed merge order: a chunk surfaced by two
/// sources is attributed to whichever source comes first here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Arxiv,
    Medrxiv,
    EuropePmc,
}

impl Source {
    pub const PRECEDENCE: [Source; 3] = [Source::Arxiv, Source::Medrxiv, Source::EuropePmc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Arxiv => "arxiv",
            Source::Medrxiv => "medrxiv",
            Source::EuropePmc => "europe_pmc",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One retrieved article or preprint, before chunking.
///
/// `paper_id` plus `source` uniquely identifies the article within a fetch;
/// `published`, when non-empty, is a valid `YYYY-MM-DD` date.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub paper_id: String,
    pub source: Source,
    pub title: String,
    /// Comma-joined author display names.
    pub authors: String,
    pub published: String,
    /// Abstract or summary text; may have been backfilled by the
    /// Europe PMC enrichment chain.
    pub summary: String,
    pub doi: Option<String>,
    pub pdf_url: Option<String>,
}

/// One output row: an article field set plus one fixed-width text chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub paper_id: String,
    pub source: Source,
    pub title: String,
    pub authors: String,
    pub published: String,
    pub chunk_id: usize,
    pub text_chunk: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

/// Best-effort extraction of an ISO-8601 calendar date. Accepts RFC 3339
/// timestamps (arXiv Atom `published`) and plain `YYYY-MM-DD` strings
/// (medRxiv `date`, Europe PMC `firstPublicationDate`). Returns an empty
/// string when nothing parseable is found.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return ts.format("%Y-%m-%d").to_string();
    }
    let head: String = trimmed.chars().take(10).collect();
    if NaiveDate::parse_from_str(&head, "%Y-%m-%d").is_ok() {
        return head;
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_rfc3339_timestamps() {
        assert_eq!(normalize_date("2024-03-05T12:30:00Z"), "2024-03-05");
        assert_eq!(normalize_date("2024-03-05T12:30:00+02:00"), "2024-03-05");
    }

    #[test]
    fn passes_plain_dates_through() {
        assert_eq!(normalize_date("2023-11-30"), "2023-11-30");
        assert_eq!(normalize_date("  2023-11-30  "), "2023-11-30");
    }

    #[test]
    fn unparseable_dates_become_empty() {
        assert_eq!(normalize_date("Nov 30, 2023"), "");
        assert_eq!(normalize_date("2023-13-45"), "");
        assert_eq!(normalize_date(""), "");
    }

    #[test]
    fn source_wire_names_are_stable() {
        assert_eq!(Source::Arxiv.as_str(), "arxiv");
        assert_eq!(Source::Medrxiv.as_str(), "medrxiv");
        assert_eq!(Source::EuropePmc.as_str(), "europe_pmc");
        assert_eq!(
            serde_json::to_value(Source::EuropePmc).unwrap(),
            serde_json::json!("europe_pmc")
        );
    }
}
