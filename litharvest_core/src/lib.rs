// src/lib.rs
pub mod aggregate;
pub mod chunk;
pub mod dedup;
pub mod error;
pub mod model;
pub mod paginate;
pub mod retry;
pub mod sources;

pub use crate::error::HarvestError;
pub use crate::model::{ChunkRecord, RawArticle, Source};
pub use crate::retry::RetryPolicy;

use async_trait::async_trait;

/// One literature source. A fetcher queries its external API for a topic's
/// terms, paginates and retries internally, and yields the topic's chunk
/// records for that source.
///
/// Failures inside a page walk keep partial results; a returned `Err` means
/// the source contributed nothing usable and the caller should log it and
/// carry on with the other sources.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch(
        &self,
        topic: &str,
        terms: &[String],
    ) -> Result<Vec<ChunkRecord>, HarvestError>;
}
