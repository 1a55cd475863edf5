use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default archive filename with format: despesas-{YYMMDD}.zip
pub fn generate_default_archive_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("despesas-{:02}{:02}{:02}.zip", year, month, day);
    PathBuf::from("output").join(filename)
}
