pub mod archive_writer;

pub use archive_writer::{ArchiveFileInfo, ArchiveWriter, CsvTable};
