//! Scrubbing of user-controlled text before it reaches the logs

use std::borrow::Cow;

/// Longest value written to a log line, in chars
pub const MAX_LOG_LENGTH: usize = 200;
const TRUNCATION_MARKER: &str = "...[TRUNCATED]";

/// Make a user-supplied string safe to log.
///
/// Control characters (including newlines) are removed so a title cannot
/// forge extra log lines, whitespace runs collapse to one space, and long
/// values are truncated.
pub fn sanitize_for_log(value: &str) -> Cow<'_, str> {
    let clean = value.chars().all(|c| !c.is_control())
        && !value.contains("  ")
        && value.trim() == value
        && value.chars().count() <= MAX_LOG_LENGTH;
    if clean {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len().min(MAX_LOG_LENGTH + TRUNCATION_MARKER.len()));
    let mut last_space = true;
    for c in value.chars().filter(|c| !c.is_control()) {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    let trimmed = out.trim_end();

    if trimmed.chars().count() > MAX_LOG_LENGTH {
        let mut cut: String = trimmed.chars().take(MAX_LOG_LENGTH).collect();
        cut.push_str(TRUNCATION_MARKER);
        Cow::Owned(cut)
    } else {
        Cow::Owned(trimmed.to_string())
    }
}
