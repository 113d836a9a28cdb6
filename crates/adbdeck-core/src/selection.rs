// ── Selection set ──
//
// Keys the user has checked. Independent of what is currently visible,
// so filter and sort changes never drop a selection.

use std::collections::HashSet;

use indexmap::IndexSet;

/// Ordered set of selected record keys.
///
/// Iteration follows insertion order, which is the order batch items are
/// issued in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: IndexSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }

    /// Flip membership of `key`; returns whether it is now selected.
    pub fn toggle(&mut self, key: &str) -> bool {
        if self.keys.shift_remove(key) {
            false
        } else {
            self.keys.insert(key.to_owned());
            true
        }
    }

    pub fn set(&mut self, key: &str, included: bool) {
        if included {
            self.keys.insert(key.to_owned());
        } else {
            self.keys.shift_remove(key);
        }
    }

    pub fn set_many<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>, included: bool) {
        for key in keys {
            self.set(key, included);
        }
    }

    /// Union with (`checked`) or difference from (`!checked`) the visible
    /// keys. Keys outside `visible` are never touched.
    pub fn select_all_visible<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>, checked: bool) {
        self.set_many(visible, checked);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// True iff `visible` is non-empty and every key in it is selected.
    pub fn is_all_visible_selected<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for key in visible {
            if !self.keys.contains(key) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Drop every key not in `known`; returns how many were dropped.
    pub fn retain_known(&mut self, known: &HashSet<&str>) -> usize {
        let before = self.keys.len();
        self.keys.retain(|k| known.contains(k.as_str()));
        before - self.keys.len()
    }

    /// Remove `keys`; returns whether anything changed.
    pub fn remove_many<'a>(&mut self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        let before = self.keys.len();
        for key in keys {
            self.keys.shift_remove(key);
        }
        before != self.keys.len()
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
