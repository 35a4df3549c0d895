//! medRxiv/bioRxiv fetcher: details API over a lookback window, numeric
//! offset pagination, and client-side term filtering (the API has no
//! keyword search).

use crate::chunk;
use crate::error::HarvestError;
use crate::model::{normalize_date, ChunkRecord, RawArticle, Source};
use crate::paginate::{collect_paginated, Page};
use crate::retry::RetryPolicy;
use crate::sources::MAX_PAGE_REQUESTS;
use crate::SourceFetcher;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct MedrxivConfig {
    /// "medrxiv" or "biorxiv"; also the paper_id fallback prefix.
    pub server: String,
    pub base_url: String,
    pub days_back: i64,
    pub max_results: usize,
    /// Item count the API returns per full page; fewer items than this on a
    /// nonempty page means the results are exhausted.
    pub page_size: usize,
    pub wrap_width: usize,
    pub retry: RetryPolicy,
}

impl Default for MedrxivConfig {
    fn default() -> Self {
        Self {
            server: "medrxiv".to_string(),
            base_url: "https://api.biorxiv.org".to_string(),
            days_back: 30,
            max_results: 500,
            page_size: 100,
            wrap_width: chunk::DEFAULT_WRAP_WIDTH,
            retry: RetryPolicy::default(),
        }
    }
}

// API response wrapper; the `messages` block is ignored.
#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    collection: Vec<MedrxivItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct MedrxivItem {
    #[serde(default)]
    doi: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    version: String,
    #[serde(rename = "abstract", default)]
    abstract_text: String,
}

pub struct MedrxivFetcher {
    client: Client,
    config: MedrxivConfig,
}

impl MedrxivFetcher {
    pub fn new(client: Client, config: MedrxivConfig) -> Self {
        Self { client, config }
    }

    fn page_url(&self, start_date: &str, end_date: &str, cursor: usize) -> String {
        format!(
            "{}/details/{}/{}/{}/{}/json",
            self.config.base_url, self.config.server, start_date, end_date, cursor
        )
    }
}

/// Keep an item when at least one term appears as a case-insensitive
/// substring of `title + " " + abstract`. An empty term list keeps all.
fn matches_terms(terms: &[String], item: &MedrxivItem) -> bool {
    if terms.is_empty() {
        return true;
    }
    let haystack = format!("{} {}", item.title, item.abstract_text).to_lowercase();
    terms
        .iter()
        .any(|term| haystack.contains(&term.to_lowercase()))
}

/// Offset to request next, or `None` when the window is exhausted: a short
/// or empty page means the API has no more results.
fn next_offset(cursor: usize, fetched: usize, page_size: usize) -> Option<usize> {
    if fetched == 0 || fetched < page_size {
        None
    } else {
        Some(cursor + fetched)
    }
}

fn paper_id(server: &str, item: &MedrxivItem) -> String {
    if item.doi.trim().is_empty() {
        format!("{}_{}", server, item.version)
    } else {
        item.doi.clone()
    }
}

fn to_article(server: &str, item: MedrxivItem) -> RawArticle {
    let doi = if item.doi.trim().is_empty() {
        None
    } else {
        Some(item.doi.clone())
    };
    RawArticle {
        paper_id: paper_id(server, &item),
        source: Source::Medrxiv,
        title: item.title,
        authors: item.authors,
        published: normalize_date(&item.date),
        summary: item.abstract_text,
        doi,
        pdf_url: None,
    }
}

#[async_trait]
impl SourceFetcher for MedrxivFetcher {
    fn source(&self) -> Source {
        Source::Medrxiv
    }

    async fn fetch(
        &self,
        topic: &str,
        terms: &[String],
    ) -> Result<Vec<ChunkRecord>, HarvestError> {
        let end_date = Utc::now().format("%Y-%m-%d").to_string();
        let start_date = (Utc::now() - Duration::days(self.config.days_back))
            .format("%Y-%m-%d")
            .to_string();
        let page_size = self.config.page_size.max(1);
        let terms: Vec<String> = terms.to_vec();

        let matched = collect_paginated(
            self.config.max_results,
            MAX_PAGE_REQUESTS,
            0usize,
            |cursor| {
                let url = self.page_url(&start_date, &end_date, cursor);
                let client = self.client.clone();
                let retry = self.config.retry.clone();
                let terms = terms.clone();
                async move {
                    let value = retry.get_json(&client, &url).await?;
                    let page: DetailsResponse =
                        serde_json::from_value(value).map_err(|err| HarvestError::Decode {
                            url: url.clone(),
                            message: err.to_string(),
                        })?;
                    let fetched = page.collection.len();
                    debug!(url = %url, fetched, "medrxiv page fetched");
                    let items: Vec<MedrxivItem> = page
                        .collection
                        .into_iter()
                        .filter(|item| matches_terms(&terms, item))
                        .collect();
                    Ok(Page {
                        items,
                        next_cursor: next_offset(cursor, fetched, page_size),
                    })
                }
            },
        )
        .await;

        let server = self.config.server.as_str();
        let records: Vec<ChunkRecord> = matched
            .into_iter()
            .map(|item| to_article(server, item))
            .flat_map(|article| chunk::chunk_records(&article, self.config.wrap_width))
            .collect();
        info!(topic, server, chunks = records.len(), "medrxiv fetch complete");
        Ok(records)
    }
}
