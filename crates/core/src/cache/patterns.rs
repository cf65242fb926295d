//! Glob matching for cache keys.
//!
//! `*` matches any sequence of characters, including an empty one. No other
//! character is special.

/// Checks if a cache key matches a glob pattern.
///
/// # Examples
///
/// ```
/// use refdata_core::cache::pattern_matches;
///
/// assert!(pattern_matches("refdata:Country", "refdata:Country"));
/// assert!(pattern_matches("refdata:acme:*", "refdata:acme:Country"));
/// assert!(pattern_matches("refdata:*:Country", "refdata:acme:Country"));
/// assert!(!pattern_matches("refdata:acme:*", "refdata:other:Country"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == key;
    }

    let segments: Vec<&str> = pattern.split('*').collect();
    let last = segments.len() - 1;
    let mut remaining = key;

    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            // Anchored at the start.
            match remaining.strip_prefix(segment) {
                Some(rest) => remaining = rest,
                None => return false,
            }
        } else if i == last {
            // Anchored at the end; must not overlap what was already consumed.
            return remaining.ends_with(segment);
        } else if !segment.is_empty() {
            match remaining.find(segment) {
                Some(pos) => remaining = &remaining[pos + segment.len()..],
                None => return false,
            }
        }
    }

    true
}
