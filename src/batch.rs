//! Row reconciliation: merging raw content with the two tag overlays.
//!
//! The single governing rule for a row's `(status, tag)` is the precedence
//! implemented by [`derive_status`]: a committed final tag wins over an
//! automatic pre-tag, and a pre-tag wins over nothing. Both storage
//! layouts reuse these helpers; only content resolution differs between
//! them.

use crate::error::{Error, Result};
use crate::models::{Status, NO_LABEL};

/// Clamp a requested batch window to the project's valid row range.
///
/// Returns the half-open index range `[start, min(start + size, total))`.
/// A `start` at or past the last row yields an empty range, not an error.
pub fn clamp_window(start: usize, size: usize, total: usize) -> std::ops::Range<usize> {
    if start >= total {
        return start..start;
    }
    start..(start.saturating_add(size)).min(total)
}

/// Derive a row's status and visible tag from its two tag-file lines.
///
/// 1. Final-tags line not the sentinel → `Tagged` with the final tag.
/// 2. Else pre-tags line not the sentinel → `PreTagged` with the pre-tag.
/// 3. Else → `NotTagged`, no tag.
pub fn derive_status(final_tag: &str, pre_tag: &str) -> (Status, Option<String>) {
    if final_tag != NO_LABEL {
        (Status::Tagged, Some(final_tag.to_string()))
    } else if pre_tag != NO_LABEL {
        (Status::PreTagged, Some(pre_tag.to_string()))
    } else {
        (Status::NotTagged, None)
    }
}

/// Check that a downloaded line list covers the project's row count.
///
/// A shorter list means the file is truncated relative to the canonical
/// index and reads against it would misalign rows.
pub fn ensure_row_count(lines: Vec<String>, expected: usize, path: &str) -> Result<Vec<String>> {
    if lines.len() < expected {
        return Err(Error::Download {
            path: path.to_string(),
            reason: format!("expected {} lines, found {}", expected, lines.len()),
        });
    }
    Ok(lines)
}
