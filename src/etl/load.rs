//! Loader trait for loading data to destinations

use eyre::Result;

/// Loader trait for writing a transformed batch to a destination
///
/// # Example
/// ```no_run
/// use b3_carteira::etl::Loader;
/// use eyre::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = Vec<String>;
///
///     async fn load(&self, batch: Self::Item) -> Result<usize> {
///         Ok(batch.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The batch type to load
    type Item: Send;

    /// Load a batch to the destination
    ///
    /// Returns the number of rows written
    ///
    /// # Errors
    /// Returns an error if loading fails (network, I/O, serialization, etc.)
    fn load(&self, batch: Self::Item) -> impl std::future::Future<Output = Result<usize>> + Send;
}
