//! Transformer trait for data transformation

use eyre::Result;

/// Transformer trait for transforming a consolidated batch
///
/// The pipeline hands the whole batch over at once, so implementors can
/// apply column-level changes (stamping, casting) in a single pass.
///
/// # Example
/// ```
/// use b3_carteira::etl::Transformer;
/// use eyre::Result;
///
/// struct Doubler;
///
/// impl Transformer for Doubler {
///     type Input = Vec<i32>;
///     type Output = Vec<i32>;
///
///     fn transform(&self, input: Self::Input) -> Result<Self::Output> {
///         Ok(input.into_iter().map(|i| i * 2).collect())
///     }
/// }
///
/// assert_eq!(Doubler.transform(vec![1, 2]).unwrap(), vec![2, 4]);
/// ```
pub trait Transformer: Send + Sync {
    /// Input batch type
    type Input: Send;

    /// Output batch type after transformation
    type Output: Send;

    /// Transform a batch
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;
}
