//! Duration-string parsing for the source-native playtime formats.
//!
//! Each source reports cumulative playtime in its own grammar. The launcher
//! export is already numeric; the other two sources need extraction:
//!
//! - shorthand (`"11h 45m"`, `"2h"`, `"30m"`) — console profile exports
//! - long form (`"11 hours, 45 minutes, 10 seconds"`) — emulator session logs
//!
//! Absence of a component means zero, and an empty or unparseable string is
//! zero as well — every observed source omits tokens rather than writing `0h`.

use std::sync::LazyLock;

use regex::Regex;

static SHORT_HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*h").unwrap());
static SHORT_MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*m").unwrap());

static LONG_HOURS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*hours?").unwrap());
static LONG_MINUTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*minutes?").unwrap());
static LONG_SECONDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*seconds?").unwrap());

/// Extracts the first capture of `re` as an integer, defaulting to 0.
fn component(re: &Regex, input: &str) -> i64 {
    re.captures(input)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Parses a shorthand duration like `"11h 45m"` into total minutes.
///
/// Hour and minute components are optional and independently extracted.
/// Empty or unmatched input yields 0.
#[must_use]
pub fn shorthand_to_minutes(input: &str) -> i64 {
    let input = input.trim();
    if input.is_empty() {
        return 0;
    }
    component(&SHORT_HOURS, input) * 60 + component(&SHORT_MINUTES, input)
}

/// Parses a long-form duration like `"11 hours, 45 minutes, 10 seconds"`
/// into total seconds.
///
/// Singular unit names (`"1 hour"`) are accepted. Empty or unmatched input
/// yields 0.
#[must_use]
pub fn long_form_to_seconds(input: &str) -> i64 {
    let input = input.trim();
    if input.is_empty() {
        return 0;
    }
    component(&LONG_HOURS, input) * 3600
        + component(&LONG_MINUTES, input) * 60
        + component(&LONG_SECONDS, input)
}
