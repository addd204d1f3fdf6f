// User-facing status reporting.
//
// The mutation logic never prints on its own; it talks to a small injected
// `Reporter` so the core stays testable without capturing console output.
// The console implementation rides on the crate's logging macros.

use colored::Colorize;

use crate::{log_error, log_info, log_warn};

/// Status sink injected into every component that has something to say.
pub trait Reporter {
    fn info(&self, message: &str);
    fn success(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Prints through the colored logging macros.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        log_info!("{message}");
    }

    fn success(&self, message: &str) {
        log_info!("{}", message.green());
    }

    fn warn(&self, message: &str) {
        log_warn!("{message}");
    }

    fn error(&self, message: &str) {
        log_error!("{message}");
    }
}
