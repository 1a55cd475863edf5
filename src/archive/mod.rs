pub mod inspector;

pub use inspector::{ArchiveInspector, ArchiveSummary, EntrySummary};
