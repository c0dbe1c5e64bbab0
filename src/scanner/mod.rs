mod logcat;
mod patterns;

pub use logcat::{scan_lines, LogcatSession, ScanOutcome};
pub use patterns::{match_line, UrlMatch, UrlPattern, URL_PATTERNS};
