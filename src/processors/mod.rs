pub mod consolidator;
pub mod enrichment;
pub mod pipeline;
pub mod reducer;
pub mod report;
pub mod rollup;

pub use consolidator::ChunkedConsolidator;
pub use enrichment::Enricher;
pub use pipeline::{ExpensePipeline, PipelineOutput};
pub use reducer::GlobalReducer;
pub use report::{ConsolidationReport, RowRejection};
pub use rollup::RollupCalculator;
