//! arXiv fetcher: Atom feed search with an OR-combined term query, sorted
//! by submission date descending.

use crate::chunk;
use crate::error::HarvestError;
use crate::model::{normalize_date, ChunkRecord, RawArticle, Source};
use crate::retry::RetryPolicy;
use crate::SourceFetcher;
use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone)]
pub struct ArxivConfig {
    pub base_url: String,
    /// Fixed conjunction prepended to the term disjunction. Empty disables
    /// the prefix.
    pub query_prefix: String,
    pub max_results: usize,
    pub page_size: usize,
    pub wrap_width: usize,
    pub retry: RetryPolicy,
}

impl Default for ArxivConfig {
    fn default() -> Self {
        Self {
            base_url: "http://export.arxiv.org/api/query".to_string(),
            query_prefix:
                "artificial intelligence OR machine learning OR deep learning".to_string(),
            max_results: 500,
            page_size: 100,
            wrap_width: chunk::DEFAULT_WRAP_WIDTH,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct ArxivFetcher {
    client: Client,
    config: ArxivConfig,
}

/// One `<entry>` of the Atom response, reduced to the fields we keep.
#[derive(Debug, Default, Clone)]
struct AtomEntry {
    id: String,
    title: String,
    summary: String,
    authors: Vec<String>,
    published: String,
    doi: Option<String>,
    pdf_href: Option<String>,
}

impl ArxivFetcher {
    pub fn new(client: Client, config: ArxivConfig) -> Self {
        Self { client, config }
    }

    fn build_query(&self, terms: &[String]) -> String {
        let disjunction = terms
            .iter()
            .map(|term| format!("\"{}\"", term.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" OR ");
        match (self.config.query_prefix.is_empty(), disjunction.is_empty()) {
            (false, false) => format!("({}) AND ({})", self.config.query_prefix, disjunction),
            (false, true) => format!("({})", self.config.query_prefix),
            (true, false) => format!("({disjunction})"),
            (true, true) => String::new(),
        }
    }

    fn page_url(&self, query: &str, start: usize, count: usize) -> Result<String, HarvestError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|err| HarvestError::InvalidInput(format!("bad arXiv base URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("search_query", query)
            .append_pair("start", &start.to_string())
            .append_pair("max_results", &count.to_string())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending");
        Ok(url.into())
    }
}

#[async_trait]
impl SourceFetcher for ArxivFetcher {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    async fn fetch(
        &self,
        topic: &str,
        terms: &[String],
    ) -> Result<Vec<ChunkRecord>, HarvestError> {
        let query = self.build_query(terms);
        let max = self.config.max_results;
        let page_size = self.config.page_size.max(1);

        let mut articles: Vec<RawArticle> = Vec::new();
        let mut start = 0usize;
        while articles.len() < max {
            let count = page_size.min(max - articles.len());
            let url = self.page_url(&query, start, count)?;
            let body = self.config.retry.get_text(&self.client, &url).await?;
            let entries = parse_feed(&body)?;

            if entries.is_empty() {
                if start == 0 {
                    break;
                }
                // More results were expected after a full page; an empty
                // page here means the feed went bad mid-walk.
                return Err(HarvestError::EmptyPage { offset: start });
            }

            let fetched = entries.len();
            debug!(topic, start, fetched, "arxiv page fetched");
            articles.extend(entries.into_iter().map(to_article));
            if fetched < count {
                break;
            }
            start += fetched;
        }

        let records: Vec<ChunkRecord> = articles
            .iter()
            .flat_map(|article| chunk::chunk_records(article, self.config.wrap_width))
            .collect();
        info!(
            topic,
            articles = articles.len(),
            chunks = records.len(),
            "arxiv fetch complete"
        );
        Ok(records)
    }
}

fn to_article(entry: AtomEntry) -> RawArticle {
    let pdf_url = entry.pdf_href.clone().or_else(|| {
        entry
            .id
            .rsplit_once("/abs/")
            .map(|(_, short_id)| format!("https://arxiv.org/pdf/{short_id}.pdf"))
    });
    RawArticle {
        paper_id: entry.id,
        source: Source::Arxiv,
        title: chunk::normalize_whitespace(&decode_entities(&entry.title)),
        authors: entry.authors.join(", "),
        published: normalize_date(&entry.published),
        summary: decode_entities(&entry.summary),
        doi: entry.doi,
        pdf_url,
    }
}

/// Atom payloads are sometimes double-encoded; decode twice at most.
fn decode_entities(text: &str) -> String {
    let mut cleaned = text.to_string();
    for _ in 0..2 {
        let decoded = html_escape::decode_html_entities(&cleaned).into_owned();
        if decoded == cleaned {
            break;
        }
        cleaned = decoded;
    }
    cleaned
}

fn parse_feed(xml: &str) -> Result<Vec<AtomEntry>, HarvestError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<AtomEntry> = None;
    let mut current_tag: Option<String> = None;
    let mut buffer = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Start(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "entry" => current = Some(AtomEntry::default()),
                    "id" | "title" | "summary" | "published" | "name" | "arxiv:doi"
                        if current.is_some() =>
                    {
                        current_tag = Some(tag);
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let (Some(tag), Some(entry)) = (current_tag.as_deref(), current.as_mut()) {
                    let text = e
                        .unescape()
                        .map_err(|err| HarvestError::Xml(err.to_string()))?
                        .to_string();
                    match tag {
                        "id" => entry.id = text,
                        "title" => entry.title = text,
                        "summary" => entry.summary = text,
                        "published" => entry.published = text,
                        "name" => entry.authors.push(text),
                        "arxiv:doi" => entry.doi = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"link" {
                    if let Some(entry) = current.as_mut() {
                        let mut href = None;
                        let mut is_pdf = false;
                        for attr in e.attributes().filter_map(Result::ok) {
                            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            match key.as_str() {
                                "href" => {
                                    if value.contains("/pdf/") {
                                        is_pdf = true;
                                    }
                                    href = Some(value);
                                }
                                "title" if value == "pdf" => is_pdf = true,
                                _ => {}
                            }
                        }
                        if is_pdf && entry.pdf_href.is_none() {
                            entry.pdf_href = href;
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if tag == "entry" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                } else if Some(tag.as_str()) == current_tag.as_deref() {
                    current_tag = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(HarvestError::Xml(err.to_string())),
            _ => {}
        }
        buffer.clear();
    }

    Ok(entries)
}
