// ── Package domain types ──

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{Listable, Record};

/// An installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PackageStatusFilter {
    #[default]
    All,
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PackageSortKey {
    #[default]
    Name,
    /// Enabled before disabled when ascending.
    State,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PackageStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
}

impl Record for Package {
    fn key(&self) -> &str {
        &self.name
    }

    fn search_text(&self) -> &str {
        &self.name
    }
}

impl Listable for Package {
    type Status = PackageStatusFilter;
    type SortKey = PackageSortKey;
    type Stats = PackageStats;

    fn matches_status(&self, status: PackageStatusFilter) -> bool {
        match status {
            PackageStatusFilter::All => true,
            PackageStatusFilter::Enabled => self.enabled,
            PackageStatusFilter::Disabled => !self.enabled,
        }
    }

    fn compare(&self, other: &Self, key: PackageSortKey) -> Ordering {
        match key {
            PackageSortKey::Name => self.name.cmp(&other.name),
            PackageSortKey::State => other.enabled.cmp(&self.enabled),
        }
    }

    fn tally(stats: &mut PackageStats, record: &Self) {
        stats.total += 1;
        if record.enabled {
            stats.enabled += 1;
        } else {
            stats.disabled += 1;
        }
    }
}
