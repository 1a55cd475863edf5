pub mod consolidated;
pub mod expense;
pub mod operator;
pub mod registry;
pub mod rollup;

pub use consolidated::{ConsolidatedRecord, EnrichedRecord};
pub use expense::{ExpenseKey, PartialAggregate, RawTransaction};
pub use operator::OperatorEntry;
pub use registry::{OperatorLookup, OperatorRegistry};
pub use rollup::RollupRecord;
