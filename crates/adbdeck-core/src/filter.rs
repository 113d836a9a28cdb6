// ── Filtered collection ──
//
// Derives the visible list and aggregate counts from a raw snapshot and
// the current filter. Pure; recomputed whenever either input changes.

use serde::{Deserialize, Serialize};

use crate::record::Listable;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Search, status and sort settings for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState<St, So> {
    pub search: String,
    pub status: St,
    pub sort_key: So,
    pub direction: SortDirection,
}

/// Shorthand for the filter state of a record type.
pub type FilterFor<R> = FilterState<<R as Listable>::Status, <R as Listable>::SortKey>;

/// Output of [`compute_visible`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<R: Listable> {
    pub visible: Vec<R>,
    /// Counts over the unfiltered collection.
    pub stats: R::Stats,
}

impl<R: Listable> Default for FilteredView<R> {
    fn default() -> Self {
        Self {
            visible: Vec::new(),
            stats: R::Stats::default(),
        }
    }
}

impl<R: Listable> FilteredView<R> {
    pub fn visible_keys(&self) -> Vec<&str> {
        self.visible.iter().map(|r| r.key()).collect()
    }
}

/// Apply search, status predicate and sort to `records`.
///
/// Search is a case-insensitive substring match on
/// [`search_text`](crate::record::Record::search_text); a blank search
/// matches everything. The sort is stable so ties keep collection order.
pub fn compute_visible<R: Listable>(records: &[R], filter: &FilterFor<R>) -> FilteredView<R> {
    let mut stats = R::Stats::default();
    for record in records {
        R::tally(&mut stats, record);
    }

    let needle = filter.search.trim().to_lowercase();
    let mut visible: Vec<&R> = records
        .iter()
        .filter(|r| needle.is_empty() || r.search_text().to_lowercase().contains(&needle))
        .filter(|r| r.matches_status(filter.status))
        .collect();

    visible.sort_by(|a, b| {
        b.is_directory().cmp(&a.is_directory()).then_with(|| {
            let ord = a.compare(b, filter.sort_key);
            match filter.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        })
    });

    FilteredView {
        visible: visible.into_iter().cloned().collect(),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::record::Record;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        dir: bool,
        size: u64,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    enum Kind {
        #[default]
        All,
        Dirs,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    enum Key {
        #[default]
        Name,
        Size,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counts {
        total: usize,
        dirs: usize,
    }

    impl Record for Item {
        fn key(&self) -> &str {
            self.name
        }
        fn search_text(&self) -> &str {
            self.name
        }
    }

    impl Listable for Item {
        type Status = Kind;
        type SortKey = Key;
        type Stats = Counts;

        fn matches_status(&self, status: Kind) -> bool {
            status == Kind::All || self.dir
        }
        fn is_directory(&self) -> bool {
            self.dir
        }
        fn compare(&self, other: &Self, key: Key) -> Ordering {
            match key {
                Key::Name => self.name.cmp(other.name),
                Key::Size => self.size.cmp(&other.size),
            }
        }
        fn tally(stats: &mut Counts, record: &Self) {
            stats.total += 1;
            stats.dirs += usize::from(record.dir);
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item { name: "notes.txt", dir: false, size: 10 },
            Item { name: "Music", dir: true, size: 0 },
            Item { name: "a.bin", dir: false, size: 10 },
            Item { name: "DCIM", dir: true, size: 0 },
            Item { name: "z.log", dir: false, size: 3 },
        ]
    }

    fn names(view: &FilteredView<Item>) -> Vec<&str> {
        view.visible_keys()
    }

    #[test]
    fn directories_first_in_both_directions() {
        let mut filter = FilterFor::<Item>::default();
        let asc = compute_visible(&items(), &filter);
        assert_eq!(names(&asc), vec!["DCIM", "Music", "a.bin", "notes.txt", "z.log"]);

        filter.direction = SortDirection::Desc;
        let desc = compute_visible(&items(), &filter);
        assert_eq!(names(&desc), vec!["Music", "DCIM", "z.log", "notes.txt", "a.bin"]);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let filter = FilterFor::<Item> {
            sort_key: Key::Size,
            ..FilterState::default()
        };
        let view = compute_visible(&items(), &filter);
        // notes.txt precedes a.bin in the collection and both are size 10.
        assert_eq!(names(&view), vec!["Music", "DCIM", "z.log", "notes.txt", "a.bin"]);
    }

    #[test]
    fn search_is_trimmed_and_case_insensitive() {
        let filter = FilterFor::<Item> {
            search: "  MU ".into(),
            ..FilterState::default()
        };
        assert_eq!(names(&compute_visible(&items(), &filter)), vec!["Music"]);

        let blank = FilterFor::<Item> {
            search: "   ".into(),
            ..FilterState::default()
        };
        assert_eq!(compute_visible(&items(), &blank).visible.len(), 5);
    }

    #[test]
    fn stats_ignore_filter() {
        let filter = FilterFor::<Item> {
            search: "zzz".into(),
            status: Kind::Dirs,
            ..FilterState::default()
        };
        let view = compute_visible(&items(), &filter);
        assert!(view.visible.is_empty());
        assert_eq!(view.stats, Counts { total: 5, dirs: 2 });
    }

    #[test]
    fn status_applies_after_search() {
        let filter = FilterFor::<Item> {
            search: "i".into(),
            status: Kind::Dirs,
            ..FilterState::default()
        };
        // "Music", "DCIM" and "a.bin" match the search; only the folders survive.
        assert_eq!(names(&compute_visible(&items(), &filter)), vec!["DCIM", "Music"]);
    }

    #[test]
    fn idempotent() {
        let filter = FilterFor::<Item> {
            sort_key: Key::Size,
            direction: SortDirection::Desc,
            ..FilterState::default()
        };
        let once = compute_visible(&items(), &filter);
        let twice = compute_visible(&items(), &filter);
        assert_eq!(once, twice);
    }
}
