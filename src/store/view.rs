//! Derived, read-only views over a list: sorting and search.
//!
//! These never touch the underlying entries, so they can be recomputed on
//! every keystroke.

use super::StoreEntity;

/// Starred entries first, then most recent first. Ties keep storage order.
pub fn sorted<T: StoreEntity>(entries: &[T]) -> Vec<&T> {
    let mut view: Vec<&T> = entries.iter().collect();
    view.sort_by(|a, b| {
        b.is_starred()
            .cmp(&a.is_starred())
            .then_with(|| b.recency().cmp(&a.recency()))
    });
    view
}

/// The sorted view narrowed to entries matching `query`, case-insensitively.
///
/// A blank query returns the full sorted view.
pub fn filtered<'a, T: StoreEntity>(entries: &'a [T], query: &str, include_body: bool) -> Vec<&'a T> {
    let query = query.trim();
    let view = sorted(entries);
    if query.is_empty() {
        return view;
    }

    let needle = query.to_lowercase();
    view.into_iter()
        .filter(|entry| entry.matches(&needle, include_body))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkspaceDocument;
    use chrono::{Duration, Utc};

    fn doc(title: &str, content: &str, age_minutes: i64, starred: bool) -> WorkspaceDocument {
        let mut doc = WorkspaceDocument::new(title, content);
        doc.updated_at = Utc::now() - Duration::minutes(age_minutes);
        doc.is_starred = starred;
        doc
    }

    fn titles(view: &[&WorkspaceDocument]) -> Vec<String> {
        view.iter().map(|d| d.title.clone()).collect()
    }

    fn sample() -> Vec<WorkspaceDocument> {
        vec![
            doc("Old plain", "budget numbers", 60, false),
            doc("New plain", "nothing here", 1, false),
            doc("Old starred", "Quarterly BUDGET", 120, true),
            doc("New starred", "", 5, true),
        ]
    }

    #[test]
    fn test_sorted_starred_then_recent() {
        let entries = sample();
        assert_eq!(
            titles(&sorted(&entries)),
            vec!["New starred", "Old starred", "New plain", "Old plain"]
        );
    }

    #[test]
    fn test_empty_query_is_full_sorted_view() {
        let entries = sample();
        assert_eq!(titles(&filtered(&entries, "  ", true)), titles(&sorted(&entries)));
    }

    #[test]
    fn test_filter_title_and_content_case_insensitive() {
        let entries = sample();
        assert_eq!(
            titles(&filtered(&entries, "Budget", true)),
            vec!["Old starred", "Old plain"]
        );
        assert!(filtered(&entries, "Budget", false).is_empty());
        assert_eq!(titles(&filtered(&entries, "STARRED", false)).len(), 2);
    }

    #[test]
    fn test_filter_is_pure() {
        let entries = sample();
        let once = titles(&filtered(&entries, "plain", true));
        let twice = titles(&filtered(&entries, "plain", true));
        assert_eq!(once, twice);
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].title, "Old plain");
    }
}
