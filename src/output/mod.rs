//! Output formatting

mod formatter;

pub use formatter::{write_summary_to_file, OutputFormat, ResultFormatter};
