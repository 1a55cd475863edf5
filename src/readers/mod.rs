pub mod columns;
pub mod registry_reader;
pub mod transaction_reader;

pub use columns::ColumnIndex;
pub use registry_reader::RegistryReader;
pub use transaction_reader::{TransactionBlock, TransactionBlocks, TransactionReader};
