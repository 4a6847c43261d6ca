//! Terminal output
//!
//! - [`console`] - line-oriented output with optional color
//! - [`report`] - the error-kind to message table shared by operations

pub mod console;
pub mod report;

pub use console::Console;
pub use report::ErrorReport;
