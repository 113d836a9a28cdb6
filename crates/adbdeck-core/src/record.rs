// ── Record traits ──
//
// What the generic components need to know about a list item.

use std::cmp::Ordering;
use std::fmt::Debug;

/// An item with a stable unique key.
pub trait Record: Clone + PartialEq + Send + Sync + 'static {
    /// Stable identifier (package name, file name, device serial).
    fn key(&self) -> &str;

    /// Field matched by the search box.
    fn search_text(&self) -> &str;
}

/// A record that can be filtered, sorted and tallied by
/// [`compute_visible`](crate::filter::compute_visible).
pub trait Listable: Record {
    /// Closed status predicate (`all` / `enabled` / `disabled` or equivalent).
    type Status: Copy + Default + Eq + Debug + Send + Sync + 'static;
    /// Column the view is sorted by.
    type SortKey: Copy + Default + Eq + Debug + Send + Sync + 'static;
    /// Aggregate counts over an unfiltered collection.
    type Stats: Clone + Default + PartialEq + Debug + Send + Sync + 'static;

    fn matches_status(&self, status: Self::Status) -> bool;

    /// Directory records sort ahead of everything else regardless of the
    /// chosen key and direction.
    fn is_directory(&self) -> bool {
        false
    }

    /// Ascending comparison on `key`.
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;

    fn tally(stats: &mut Self::Stats, record: &Self);
}
