//! Marker protocol shared by every language adapter
//!
//! Instrumented code prints `##active_line<N>##` before a statement runs and
//! `##end_of_execution##` once the whole submission is done.

use crate::models::LineEvent;

/// Opening of an active-line marker
pub const ACTIVE_LINE_PREFIX: &str = "##active_line";

/// Closing delimiter of an active-line marker
pub const MARKER_DELIMITER: &str = "##";

/// Sentinel printed after the protected body
pub const END_OF_EXECUTION: &str = "##end_of_execution##";

/// Marker text announcing `line`
pub fn active_line_marker(line: usize) -> String {
    format!("{}{}{}", ACTIVE_LINE_PREFIX, line, MARKER_DELIMITER)
}

/// Line number carried by an active-line marker anywhere in `line`
///
/// Text around the marker is tolerated. A marker whose number does not parse
/// yields `None`, so the line is treated as ordinary output.
pub fn detect_active_line(line: &str) -> Option<usize> {
    let start = line.find(ACTIVE_LINE_PREFIX)? + ACTIVE_LINE_PREFIX.len();
    let rest = &line[start..];
    let end = rest.find(MARKER_DELIMITER)?;
    rest[..end].trim().parse().ok()
}

/// Whether `line` carries the end-of-execution sentinel
pub fn detect_end_of_execution(line: &str) -> bool {
    line.contains(END_OF_EXECUTION)
}

/// Marker-aware classification without any language-specific filtering
pub fn classify(line: &str) -> LineEvent {
    if let Some(number) = detect_active_line(line) {
        return LineEvent::ActiveLine(number);
    }
    if detect_end_of_execution(line) {
        return LineEvent::EndOfExecution;
    }
    LineEvent::OutputText(line.to_string())
}

/// Remove every marker line from instrumented output or source
pub fn strip_marker_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.contains(ACTIVE_LINE_PREFIX) && !detect_end_of_execution(line))
        .collect::<Vec<_>>()
        .join("\n")
}
