use std::collections::HashSet;

/// Collapse an entity list into trimmed, non-blank, first-seen-unique entries.
///
/// `None` items (nulls or non-string entries in the source list) are skipped.
/// Comparison is exact after trimming; `"Fed"` and `"FED"` stay distinct.
pub fn dedupe<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for item in items.into_iter().flatten() {
        let trimmed = item.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dedupe_strs(items: &[&str]) -> Vec<String> {
        dedupe(items.iter().map(Some))
    }

    #[test]
    fn test_trim_then_compare() {
        assert_eq!(dedupe_strs(&[" ", "A", "a", "A "]), vec!["A", "a"]);
    }

    #[test]
    fn test_preserves_first_seen_order() {
        assert_eq!(
            dedupe_strs(&["SEC", "Federal Reserve", "SEC", "FDIC", "Federal Reserve"]),
            vec!["SEC", "Federal Reserve", "FDIC"]
        );
    }

    #[test]
    fn test_skips_missing_entries() {
        let items = vec![None, Some("$10 billion"), None, Some("")];
        assert_eq!(dedupe(items), vec!["$10 billion"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::<Option<&str>>::new()).is_empty());
    }

    proptest! {
        #[test]
        fn dedupe_is_idempotent(items in proptest::collection::vec("[ aA bB]{0,4}", 0..20)) {
            let once = dedupe(items.iter().map(Some));
            let twice = dedupe(once.iter().map(Some));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn dedupe_output_has_no_blanks_or_duplicates(items in proptest::collection::vec(".{0,6}", 0..20)) {
            let out = dedupe(items.iter().map(Some));
            let unique: HashSet<&String> = out.iter().collect();
            prop_assert_eq!(unique.len(), out.len());
            prop_assert!(out.iter().all(|s| !s.trim().is_empty() && s.trim() == s.as_str()));
        }
    }
}
