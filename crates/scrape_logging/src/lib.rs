#![deny(missing_docs)]
//! Shared logging utilities for the scraper workspace.
//!
//! This crate provides the `scrape_*` logging macros used across the codebase,
//! a helper for printing legacy session ids without leaking the whole token,
//! and a minimal test initializer for the global logger.

/// Number of session-token characters kept by [`session_tag`].
const SESSION_TAG_LEN: usize = 8;

/// Shortens a `JSESSIONID=...` cookie to a log-friendly tag.
///
/// Returns `"none"` when no session has been established yet.
pub fn session_tag(cookie: Option<&str>) -> String {
    let Some(cookie) = cookie else {
        return "none".to_string();
    };
    let token = cookie.split_once('=').map_or(cookie, |(_, value)| value);
    let short: String = token.chars().take(SESSION_TAG_LEN).collect();
    if token.chars().count() > SESSION_TAG_LEN {
        format!("{short}…")
    } else {
        short
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
