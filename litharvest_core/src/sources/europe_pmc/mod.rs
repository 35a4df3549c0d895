//! Europe PMC fetcher: REST search with opaque `cursorMark` pagination and
//! a fallback enrichment chain (detail record, then full text) for items
//! whose search result carries no abstract.

mod fulltext;

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
use std::future::Future;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EuropePmcConfig {
    pub base_url: String,
    pub days_back: i64,
    pub max_results: usize,
    pub page_size: usize,
    pub wrap_width: usize,
    /// Character cap applied to abstracts recovered from full-text
    /// documents.
    pub fulltext_abstract_limit: usize,
    pub retry: RetryPolicy,
}

impl Default for EuropePmcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebi.ac.uk/europepmc/webservices/rest".to_string(),
            days_back: 30,
            max_results: 500,
            page_size: 100,
            wrap_width: chunk::DEFAULT_WRAP_WIDTH,
            fulltext_abstract_limit: 2000,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    next_cursor_mark: Option<String>,
    result_list: Option<ResultList>,
}

#[derive(Debug, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<PmcItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PmcItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    author_string: String,
    #[serde(default)]
    first_publication_date: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default)]
    doi: String,
    #[serde(default)]
    pmcid: String,
    #[serde(rename = "inPMC", default)]
    in_pmc: String,
}

pub struct EuropePmcFetcher {
    client: Client,
    config: EuropePmcConfig,
}

impl EuropePmcFetcher {
    pub fn new(client: Client, config: EuropePmcConfig) -> Self {
        Self { client, config }
    }

    fn build_query(&self, terms: &[String], start_date: &str, end_date: &str) -> String {
        let disjunction = terms
            .iter()
            .map(|term| format!("\"{}\"", term.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" OR ");
        let mut clauses = Vec::new();
        if !disjunction.is_empty() {
            clauses.push(format!("({disjunction})"));
        }
        clauses.push(format!("(FIRST_PDATE:[{start_date} TO {end_date}])"));
        clauses.push("(HAS_ABS:Y)".to_string());
        clauses.join(" AND ")
    }

    fn search_url(&self, query: &str, cursor: &str) -> String {
        format!(
            "{}/search?query={}&format=json&pageSize={}&cursorMark={}&resultType=core",
            self.config.base_url,
            urlencoding::encode(query),
            self.config.page_size,
            urlencoding::encode(cursor)
        )
    }

    /// Detail record lookup, the first enrichment fallback.
    async fn fetch_detail_abstract(&self, item: &PmcItem) -> Option<String> {
        let url = format!(
            "{}/{}/{}?format=json&resultType=core",
            self.config.base_url, item.source, item.id
        );
        match self.config.retry.get_json(&self.client, &url).await {
            Ok(value) => value
                .get("result")
                .and_then(|result| result.get("abstractText"))
                .and_then(|text| text.as_str())
                .map(str::to_string),
            Err(err) => {
                debug!(url = %url, error = %err, "detail lookup failed");
                None
            }
        }
    }

    /// Full-text lookup, the last enrichment fallback; only attempted for
    /// PMC-sourced items.
    async fn fetch_fulltext_abstract(&self, item: &PmcItem) -> Option<String> {
        let url = format!(
            "{}/{}/{}/fullTextXML",
            self.config.base_url, item.source, item.id
        );
        match self.config.retry.get_text(&self.client, &url).await {
            Ok(body) => fulltext::extract_text(&body, self.config.fulltext_abstract_limit),
            Err(err) => {
                debug!(url = %url, error = %err, "full-text lookup failed");
                None
            }
        }
    }

    /// Summary, then detail record, then full text. `None` when the chain
    /// comes up empty; such items contribute no chunk records.
    async fn resolve_abstract(&self, item: &PmcItem) -> Option<String> {
        resolve_abstract_with(
            item,
            || self.fetch_detail_abstract(item),
            || self.fetch_fulltext_abstract(item),
        )
        .await
    }
}

/// The enrichment chain over injected lookups. The summary short-circuits
/// both lookups, the detail record is consulted before the full text, and
/// the full-text lookup only runs for PMC-sourced items.
async fn resolve_abstract_with<D, F, DFut, FFut>(
    item: &PmcItem,
    detail_lookup: D,
    fulltext_lookup: F,
) -> Option<String>
where
    D: FnOnce() -> DFut,
    DFut: Future<Output = Option<String>>,
    F: FnOnce() -> FFut,
    FFut: Future<Output = Option<String>>,
{
    if !item.abstract_text.trim().is_empty() {
        return Some(item.abstract_text.clone());
    }
    if let Some(text) = detail_lookup().await {
        if !text.trim().is_empty() {
            return Some(text);
        }
    }
    if is_pmc_sourced(item) {
        if let Some(text) = fulltext_lookup().await {
            if !text.trim().is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn is_pmc_sourced(item: &PmcItem) -> bool {
    item.source.eq_ignore_ascii_case("pmc")
        || item.in_pmc.eq_ignore_ascii_case("y")
        || !item.pmcid.trim().is_empty()
}

/// Composite id from source code and internal id, falling back to the DOI,
/// so identity is stable even when the DOI is absent.
fn paper_id(item: &PmcItem) -> String {
    if !item.source.is_empty() && !item.id.is_empty() {
        format!("{}_{}", item.source, item.id)
    } else if !item.doi.is_empty() {
        item.doi.clone()
    } else {
        item.id.clone()
    }
}

/// Cursor to follow after a page: `None` when the server omits the next
/// cursor or echoes the current one back (no further progress possible).
fn advance_cursor(current: &str, next: Option<String>) -> Option<String> {
    match next {
        Some(next) if next != current => Some(next),
        _ => None,
    }
}

#[async_trait]
impl SourceFetcher for EuropePmcFetcher {
    fn source(&self) -> Source {
        Source::EuropePmc
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
        let query = self.build_query(terms, &start_date, &end_date);

        let items = collect_paginated(
            self.config.max_results,
            MAX_PAGE_REQUESTS,
            "*".to_string(),
            |cursor| {
                let url = self.search_url(&query, &cursor);
                let client = self.client.clone();
                let retry = self.config.retry.clone();
                async move {
                    let value = retry.get_json(&client, &url).await?;
                    let page: SearchResponse =
                        serde_json::from_value(value).map_err(|err| HarvestError::Decode {
                            url: url.clone(),
                            message: err.to_string(),
                        })?;
                    let items = page
                        .result_list
                        .map(|list| list.result)
                        .unwrap_or_default();
                    debug!(url = %url, fetched = items.len(), "europe pmc page fetched");
                    let next_cursor = if items.is_empty() {
                        None
                    } else {
                        advance_cursor(&cursor, page.next_cursor_mark)
                    };
                    Ok(Page { items, next_cursor })
                }
            },
        )
        .await;

        let mut records: Vec<ChunkRecord> = Vec::new();
        let mut articles = 0usize;
        for item in items {
            let Some(summary) = self.resolve_abstract(&item).await else {
                debug!(id = %item.id, "no abstract after enrichment chain, skipping");
                continue;
            };
            let doi = if item.doi.trim().is_empty() {
                None
            } else {
                Some(item.doi.clone())
            };
            let article = RawArticle {
                paper_id: paper_id(&item),
                source: Source::EuropePmc,
                title: item.title.clone(),
                authors: item.author_string.clone(),
                published: normalize_date(&item.first_publication_date),
                summary,
                doi,
                pdf_url: None,
            };
            articles += 1;
            records.extend(chunk::chunk_records(&article, self.config.wrap_width));
        }

        info!(topic, articles, chunks = records.len(), "europe pmc fetch complete");
        Ok(records)
    }
}
