//! Path operations — the string form of a node's position in the tree.
//!
//! A path is a `/`-joined list of segments, e.g. `root/footer/brands`.
//! Every operation here works on the string alone; no schema or registry
//! is needed to answer depth, parent, or subtree questions.
//!
//! ```text
//! root                      depth 0
//! root/footer               depth 1
//! root/footer/brands        depth 2
//! root/footer/brands/3      depth 3
//! ```

use crate::error::SegmentError;
use crate::marker::SEPARATOR;

/// Join a parent path and a child segment.
///
/// The segment is appended verbatim; see [`validate_segment`] for the
/// strict check.
#[inline]
pub fn join(parent: &str, segment: impl std::fmt::Display) -> String {
    format!("{parent}{SEPARATOR}{segment}")
}

/// Split `"a/b/c"` into `["a", "b", "c"]`.
#[inline]
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Depth of a path (0 for a single root segment).
#[inline]
pub fn depth_of(path: &str) -> usize {
    path.matches(SEPARATOR).count()
}

/// Parent path, or `None` for a root segment.
#[inline]
pub fn parent_of(path: &str) -> Option<&str> {
    path.rfind(SEPARATOR).map(|pos| &path[..pos])
}

/// Is `candidate` a descendant of (or equal to) `ancestor`?
///
/// Compares whole segments, so `root/footer2` is not under `root/footer`.
///
/// ```text
/// is_descendant_of("root/footer/brands", "root/footer") → true
/// is_descendant_of("root/footer2", "root/footer")       → false
/// ```
pub fn is_descendant_of(candidate: &str, ancestor: &str) -> bool {
    match candidate.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// Reject segments that would break the path or the selector string.
///
/// Markers never call this on their own. It backs the `try_*` variants for
/// callers that feed user-provided keys into paths.
pub fn validate_segment(segment: &str) -> Result<(), SegmentError> {
    if segment.is_empty() {
        return Err(SegmentError::Empty);
    }
    if segment.contains(SEPARATOR) {
        return Err(SegmentError::ContainsSeparator {
            segment: segment.to_string(),
            separator: SEPARATOR,
        });
    }
    if segment.contains(['\'', '"']) {
        return Err(SegmentError::ContainsQuote {
            segment: segment.to_string(),
        });
    }
    if segment.contains(['[', ']']) {
        return Err(SegmentError::ContainsBracket {
            segment: segment.to_string(),
        });
    }
    Ok(())
}
