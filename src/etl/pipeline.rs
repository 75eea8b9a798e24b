//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use eyre::Result;

/// Counters from one pipeline run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Items returned by the extractor
    pub extracted: usize,
    /// Units of work the extractor skipped
    pub skipped: usize,
    /// Rows reported by the loader (0 when the load step never ran)
    pub loaded: usize,
}

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// Extracted items are consolidated into the transformer's input batch via
/// `From<Vec<E::Item>>`, transformed once, and handed to the loader.
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (its input is built from `Vec<E::Item>`)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use b3_carteira::etl::Pipeline;
/// # use b3_carteira::etl::{Extraction, Extractor, Transformer, Loader};
/// # use eyre::Result;
/// # struct MyExtractor;
/// # impl Extractor for MyExtractor {
/// #     type Item = i32;
/// #     async fn extract(&self) -> Result<Extraction<Self::Item>> { Ok(Extraction::complete(vec![])) }
/// # }
/// # struct MyTransformer;
/// # impl Transformer for MyTransformer {
/// #     type Input = Vec<i32>;
/// #     type Output = Vec<i32>;
/// #     fn transform(&self, input: Self::Input) -> Result<Self::Output> { Ok(input) }
/// # }
/// # struct MyLoader;
/// # impl Loader for MyLoader {
/// #     type Item = Vec<i32>;
/// #     async fn load(&self, batch: Self::Item) -> Result<usize> { Ok(batch.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let pipeline = Pipeline::new(MyExtractor, MyTransformer, MyLoader);
///
/// let report = pipeline.run().await?;
/// println!("Loaded {} rows", report.loaded);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer,
    T::Input: From<Vec<E::Item>>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract items from source
    /// 2. Consolidate and transform the batch
    /// 3. Load the batch to destination
    ///
    /// An empty extraction ends the run before the transform and load steps.
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<PipelineReport> {
        log::info!("Starting ETL pipeline");

        // Extract
        log::debug!("Extracting from source...");
        let extraction = self.extractor.extract().await?;
        let mut report = PipelineReport {
            extracted: extraction.items.len(),
            skipped: extraction.skipped,
            loaded: 0,
        };
        log::info!(
            "Extracted {} items ({} skipped)",
            report.extracted,
            report.skipped
        );

        if extraction.items.is_empty() {
            log::warn!("No items extracted, pipeline complete");
            return Ok(report);
        }

        // Transform
        log::debug!("Transforming batch...");
        let transformed = self.transformer.transform(extraction.items.into())?;

        // Load
        log::debug!("Loading to destination...");
        report.loaded = self.loader.load(transformed).await?;
        log::info!("Loaded {} rows", report.loaded);

        Ok(report)
    }
}
