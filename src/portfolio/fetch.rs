//! Paginated fetch
//!
//! Page 1 is fetched first to learn the page count, then the remaining pages
//! are fetched strictly in order, one at a time.

use super::{PageRequest, PortfolioSource, Record};
use crate::error::ExtractError;
use crate::etl::{Extraction, Extractor};
use eyre::Result;

/// What to do when a page after the first fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PagePolicy {
    /// Log the failure, skip the page and keep going
    #[default]
    BestEffort,
    /// Abort the run on the first failed page
    Strict,
}

/// Records from every page that could be fetched
#[derive(Clone, Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<Record>,
    pub total_pages: u32,
    /// Page numbers that failed and were skipped
    pub skipped_pages: Vec<u32>,
}

impl FetchOutcome {
    pub fn fetched_pages(&self) -> u32 {
        self.total_pages - self.skipped_pages.len() as u32
    }
}

/// Fetch every page of the listing described by `first`
///
/// A failure on page 1 is always fatal. Failures on later pages follow
/// `policy`.
///
/// # Errors
/// Returns the page error for page 1, or for any page under [`PagePolicy::Strict`]
pub async fn fetch_all_pages<S: PortfolioSource>(
    source: &S,
    first: &PageRequest,
    policy: PagePolicy,
) -> Result<FetchOutcome, ExtractError> {
    let first = first.page(1);
    let initial = source.fetch_page(&first).await?;
    let total_pages = initial.total_pages().max(1);
    log::info!("Total pages found: {}", total_pages);

    let mut outcome = FetchOutcome {
        records: initial.into_results(),
        total_pages,
        skipped_pages: Vec::new(),
    };

    for page in 2..=total_pages {
        match source.fetch_page(&first.page(page)).await {
            Ok(data) => {
                let results = data.into_results();
                log::debug!("Page {}/{}: {} records", page, total_pages, results.len());
                outcome.records.extend(results);
            }
            Err(e) if policy == PagePolicy::BestEffort => {
                log::warn!("Error fetching page {}: {}", page, e);
                outcome.skipped_pages.push(page);
            }
            Err(e) => return Err(e),
        }
    }

    if !outcome.skipped_pages.is_empty() {
        log::warn!(
            "Skipped {} of {} pages: {:?}",
            outcome.skipped_pages.len(),
            total_pages,
            outcome.skipped_pages
        );
    }

    Ok(outcome)
}

/// Extractor over every page of a portfolio listing
///
/// # Example
/// ```no_run
/// use b3_carteira::etl::Extractor;
/// use b3_carteira::portfolio::{B3Client, PagePolicy, PageRequest, PortfolioExtractor};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = B3Client::try_new(Url::parse(b3_carteira::config::DEFAULT_BASE_URL)?)?;
/// let extractor = PortfolioExtractor::new(&client, PageRequest::default(), PagePolicy::BestEffort);
/// let extraction = extractor.extract().await?;
/// println!("{} records, {} pages skipped", extraction.items.len(), extraction.skipped);
/// # Ok(())
/// # }
/// ```
pub struct PortfolioExtractor<'a, S> {
    source: &'a S,
    first: PageRequest,
    policy: PagePolicy,
}

impl<'a, S: PortfolioSource> PortfolioExtractor<'a, S> {
    pub fn new(source: &'a S, first: PageRequest, policy: PagePolicy) -> Self {
        Self {
            source,
            first,
            policy,
        }
    }
}

impl<S: PortfolioSource> Extractor for PortfolioExtractor<'_, S> {
    type Item = Record;

    async fn extract(&self) -> Result<Extraction<Self::Item>> {
        let outcome = fetch_all_pages(self.source, &self.first, self.policy).await?;
        let skipped = outcome.skipped_pages.len();

        log::info!(
            "Fetched {} record(s) from {}/{} page(s)",
            outcome.records.len(),
            outcome.fetched_pages(),
            outcome.total_pages
        );

        Ok(Extraction::complete(outcome.records).with_skipped(skipped))
    }
}
