pub mod constants;
pub mod decimal;
pub mod encoding;
pub mod filename;
pub mod period;
pub mod progress;
pub mod tax_id;

pub use constants::*;
pub use decimal::parse_locale_decimal;
pub use encoding::TextEncoding;
pub use filename::generate_default_archive_filename;
pub use period::{parse_posting_date, Quarter};
pub use progress::ProgressReporter;
pub use tax_id::is_valid_tax_id;
