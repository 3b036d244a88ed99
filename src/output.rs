//! Output formatting module.

pub mod report;
pub mod table;

pub use report::CheckReport;
pub use table::print_status;
