// This file implements the application's logging system.
// It provides macros for different log levels (INFO, WARN, ERROR, DEBUG)
// and handles conditional output for debug messages, with colored terminal output.

use std::sync::OnceLock; // Ensures the DEBUG_ENABLED flag is initialized exactly once.
use std::sync::atomic::{AtomicBool, Ordering}; // Thread-safe, atomic control of the debug flag.

// `log_info!` for general progress and informational messages.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[INFO]".bright_green(), format!($($arg)*));
    }};
}

// `log_warn!` for non-critical issues or noteworthy conditions.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[WARN]".bright_yellow(), format!($($arg)*));
    }};
}

// `log_error!` for critical errors requiring immediate attention.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[ERROR]".bright_red(), format!($($arg)*));
    }};
}

// `log_debug!` for detailed internal tracing. Messages are only printed when
// debug mode was enabled via `logger::init(true)`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if $crate::logger::is_debug_enabled() {
            use colored::Colorize as _;
            eprintln!("{} {}", "[DEBUG]".dimmed(), format!($($arg)*));
        }
    }};
}

// Global flag controlling debug logging, initialized once at startup.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// Call once at application startup, before any `log_debug!` invocation.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    if debug {
        log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Checks if debug logging is currently enabled.
/// Used primarily by the `log_debug!` macro.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|f| f.load(Ordering::Relaxed))
        .unwrap_or(false)
}
