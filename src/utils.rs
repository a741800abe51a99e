//! Small helpers shared across modules.
//!
//! - Whitespace cleanup for text pulled out of HTML
//! - String truncation for log fields
//! - Capitalisation for user-facing location tags
//! - Parent directory creation before writing a document

use std::path::Path;

use tracing::{debug, instrument};

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_text("  Free\n LEGO   set "), "Free LEGO set");
/// ```
pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Capitalize the first character of a string.
///
/// Used to echo subscription tags back (`"london"` -> `"London"`).
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

/// Make sure the directory that will hold `path` exists.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            debug!(parent = %parent.display(), "Ensured parent directory");
            Ok(())
        }
        _ => Ok(()),
    }
}
