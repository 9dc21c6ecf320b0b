//! Composite keys and prefix scans for index tables.

/// Separator between the parts of a composite index key.
pub const KEY_SEPARATOR: char = ':';

/// Join two key parts, e.g. `("community-1", "user-9")` -> `"community-1:user-9"`.
pub fn composite_key(left: &str, right: &str) -> String {
    format!("{}{}{}", left, KEY_SEPARATOR, right)
}

/// Split a composite key back into its two parts.
///
/// Only the first separator is significant, so the right part may itself
/// contain separators.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once(KEY_SEPARATOR)
}

/// Calculate the exclusive end bound for a prefix range query.
///
/// Given prefix "user-1:", returns "user-1;" (next ASCII char after ':').
pub fn prefix_end_bound(prefix: &str) -> String {
    if prefix.is_empty() {
        return String::new();
    }

    let mut bytes = prefix.as_bytes().to_vec();
    if let Some(last) = bytes.last_mut() {
        *last = last.saturating_add(1);
    }

    String::from_utf8(bytes).unwrap_or_else(|_| format!("{}\x7F", prefix))
}

/// Range covering every composite key whose left part is `left`.
pub fn left_part_range(left: &str) -> (String, String) {
    let prefix = format!("{}{}", left, KEY_SEPARATOR);
    let end = prefix_end_bound(&prefix);
    (prefix, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_end_bound() {
        assert_eq!(prefix_end_bound("user:"), "user;");
        assert_eq!(prefix_end_bound("community:abc:"), "community:abc;");
        assert_eq!(prefix_end_bound(""), "");
    }

    #[test]
    fn test_composite_key_round_trip_keeps_right_separators() {
        let key = composite_key("ask-1", "user:with:colons");
        assert_eq!(split_key(&key), Some(("ask-1", "user:with:colons")));
    }

    #[test]
    fn test_left_part_range_excludes_longer_left_parts() {
        let (start, end) = left_part_range("u1");
        assert_eq!(start, "u1:");
        assert_eq!(end, "u1;");

        let in_range = |key: &str| key >= start.as_str() && key < end.as_str();
        assert!(in_range("u1:x"));
        assert!(!in_range("u10:x"));
        assert!(!in_range("u2:x"));
    }
}
