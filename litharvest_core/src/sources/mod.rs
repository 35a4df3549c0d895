pub mod arxiv;
pub mod europe_pmc;
pub mod medrxiv;

/// Upper bound on page requests per source per topic, independent of the
/// result cap.
pub(crate) const MAX_PAGE_REQUESTS: usize = 100;
