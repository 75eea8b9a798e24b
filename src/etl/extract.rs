//! Extractor trait for pulling data from a source

use eyre::Result;

/// Items pulled from a source, plus how many units of work were skipped
///
/// A best-effort source can drop part of its input (pages, files, ...) and
/// still succeed; `skipped` makes that visible to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Extraction<T> {
    /// An extraction where nothing was skipped
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, skipped: 0 }
    }

    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }
}

/// Extractor trait for extracting data from a source
///
/// # Example
/// ```no_run
/// use b3_carteira::etl::{Extraction, Extractor};
/// use eyre::Result;
///
/// struct StaticExtractor(Vec<u32>);
///
/// impl Extractor for StaticExtractor {
///     type Item = u32;
///
///     async fn extract(&self) -> Result<Extraction<Self::Item>> {
///         Ok(Extraction::complete(self.0.clone()))
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails in a way the source cannot skip
    fn extract(&self) -> impl std::future::Future<Output = Result<Extraction<Self::Item>>> + Send;
}
