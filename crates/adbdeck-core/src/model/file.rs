// ── File explorer domain types ──

use std::cmp::Ordering;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::record::{Listable, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    Directory,
    File,
    Symlink,
}

/// One entry of a device directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Name within the listed directory; unique per listing.
    pub name: String,
    pub kind: FileKind,
    pub size: Option<u64>,
    pub permissions: String,
    pub modified: Option<NaiveDateTime>,
}

impl FileEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileStatusFilter {
    #[default]
    All,
    Folders,
    Files,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FileSortKey {
    #[default]
    Name,
    Size,
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub total: usize,
    pub folders: usize,
    pub files: usize,
}

impl Record for FileEntry {
    fn key(&self) -> &str {
        &self.name
    }

    fn search_text(&self) -> &str {
        &self.name
    }
}

impl Listable for FileEntry {
    type Status = FileStatusFilter;
    type SortKey = FileSortKey;
    type Stats = FileStats;

    fn matches_status(&self, status: FileStatusFilter) -> bool {
        match status {
            FileStatusFilter::All => true,
            FileStatusFilter::Folders => self.is_dir(),
            FileStatusFilter::Files => !self.is_dir(),
        }
    }

    fn is_directory(&self) -> bool {
        self.is_dir()
    }

    fn compare(&self, other: &Self, key: FileSortKey) -> Ordering {
        match key {
            FileSortKey::Name => self
                .name
                .to_lowercase()
                .cmp(&other.name.to_lowercase())
                .then_with(|| self.name.cmp(&other.name)),
            FileSortKey::Size => self.size.unwrap_or(0).cmp(&other.size.unwrap_or(0)),
            // Unknown timestamps sort first.
            FileSortKey::Date => self.modified.cmp(&other.modified),
        }
    }

    fn tally(stats: &mut FileStats, record: &Self) {
        stats.total += 1;
        if record.is_dir() {
            stats.folders += 1;
        } else {
            stats.files += 1;
        }
    }
}
