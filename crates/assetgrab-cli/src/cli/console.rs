//! Prints pipeline events to stderr and forwards them to the log file.

use assetgrab_core::report::{Event, Level, Reporter, TracingReporter};
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

pub(super) fn format_event(event: &Event) -> String {
    let mut line = format!("[assetgrab] {:<7} | {}", event.level, event.message);
    if event.level != Level::Info {
        if let (Some(bytes), Some(total)) = (event.bytes, event.total) {
            line.push_str(&format!(" ({bytes} of {total} bytes)"));
        } else if let Some(bytes) = event.bytes {
            line.push_str(&format!(" ({bytes} bytes)"));
        }
    }
    line
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: Event) {
        let _ = writeln!(std::io::stderr().lock(), "{}", format_event(&event));
        TracingReporter.report(event);
    }
}
