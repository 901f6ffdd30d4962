//! Display-only filtering. Nothing here reorders or re-identifies items.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::reorder::Indexed;
use crate::rows::RowData;

/// Items matching `predicate`, in their original order.
pub fn project<'a, T, P>(items: &'a [T], predicate: P) -> Vec<&'a T>
where
    P: Fn(&T) -> bool,
{
    items.iter().filter(|item| predicate(item)).collect()
}

/// Like [`project`], keeping each item's index in the full list.
pub fn project_indexed<'a, T, P>(items: &'a [T], predicate: P) -> Vec<Indexed<&'a T>>
where
    P: Fn(&T) -> bool,
{
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate(item))
        .map(|(index, item)| Indexed { index, item })
        .collect()
}

/// Fuzzy match on a row's key or value. An empty query matches every row.
pub fn fuzzy(query: &str) -> impl Fn(&RowData) -> bool + use<> {
    let query = query.trim().to_string();
    let matcher = SkimMatcherV2::default();
    move |row: &RowData| {
        query.is_empty()
            || matcher.fuzzy_match(&row.key, &query).is_some()
            || matcher.fuzzy_match(&row.value, &query).is_some()
    }
}
