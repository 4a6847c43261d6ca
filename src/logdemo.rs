//! Logging walkthrough
//!
//! Emits one event per level, a structured event and a failed operation with
//! its error chain, so the subscriber setup can be checked end to end.

use anyhow::{anyhow, Context, Result};
use std::io::Write;

use crate::ui::Console;

fn divide(numerator: i64, denominator: i64) -> Result<i64> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| anyhow!("division by zero"))
}

fn run_math() -> Result<i64> {
    divide(10, 0).context("An unexpected error occurred during math operations!")
}

/// Run the demo
pub fn run<W: Write>(console: &mut Console<W>) {
    console.line("[PRINT] This is a standard print statement.");

    tracing::trace!("[TRACE] Every step, for deep debugging.");
    tracing::debug!("[DEBUG] Fine details for developers.");
    tracing::info!("[INFO] Something notable happened.");
    tracing::warn!("[WARNING] This might be a problem.");
    tracing::error!("[ERROR] This is definitely a problem!");

    tracing::info!(
        task_id = "12345",
        user = "developer_test",
        status = "success",
        "Task completed"
    );

    let span = tracing::info_span!("math", operation = "divide");
    let _guard = span.enter();
    match run_math() {
        Ok(value) => tracing::info!(value, "Math succeeded"),
        Err(e) => tracing::error!(error = format!("{:#}", e), "Operation failed"),
    }
}
