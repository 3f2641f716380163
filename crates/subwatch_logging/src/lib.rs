#![deny(missing_docs)]
//! Shared logging utilities for the subwatch workspace.
//!
//! This crate provides the `watch_*` logging macros used across the codebase.
//! Every record is tagged with the poll cycle the current thread is working
//! on, so a log file reads as a sequence of fetch/reconcile passes.

use std::cell::Cell;

thread_local! {
    /// Poll cycle currently being processed on this thread (0 = not polling).
    static POLL_CYCLE: Cell<u64> = const { Cell::new(0) };
}

/// Sets the poll cycle number for the current thread.
/// The poll driver calls this once at the top of each cycle.
pub fn set_poll_cycle(cycle: u64) {
    POLL_CYCLE.with(|v| v.set(cycle));
}

/// Retrieves the poll cycle number for the current thread.
/// Returns 0 if no cycle has started yet.
pub fn poll_cycle() -> u64 {
    POLL_CYCLE.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current poll cycle.
#[macro_export]
macro_rules! watch_trace {
    ($($arg:tt)*) => {{
        log::trace!("[cycle {}] {}", $crate::poll_cycle(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current poll cycle.
#[macro_export]
macro_rules! watch_debug {
    ($($arg:tt)*) => {{
        log::debug!("[cycle {}] {}", $crate::poll_cycle(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current poll cycle.
#[macro_export]
macro_rules! watch_info {
    ($($arg:tt)*) => {{
        log::info!("[cycle {}] {}", $crate::poll_cycle(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current poll cycle.
#[macro_export]
macro_rules! watch_warn {
    ($($arg:tt)*) => {{
        log::warn!("[cycle {}] {}", $crate::poll_cycle(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current poll cycle.
#[macro_export]
macro_rules! watch_error {
    ($($arg:tt)*) => {{
        log::error!("[cycle {}] {}", $crate::poll_cycle(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
