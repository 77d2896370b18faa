use std::cmp::Ordering;

use crate::config::SortSetting;
use crate::library::Track;

/// The orderings offered by the sort menu.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Display name, case-insensitive.
    Name,
    /// Artist then title; tracks without an artist go last.
    Artist,
    /// Shortest first; unknown durations go last.
    Duration,
}

fn cmp_lower(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

impl SortKey {
    pub fn compare(self, a: &Track, b: &Track) -> Ordering {
        match self {
            SortKey::Name => cmp_lower(&a.display, &b.display),
            SortKey::Artist => match (a.artist.as_deref(), b.artist.as_deref()) {
                (Some(x), Some(y)) => cmp_lower(x, y).then_with(|| cmp_lower(&a.title, &b.title)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => cmp_lower(&a.title, &b.title),
            },
            SortKey::Duration => match (a.duration, b.duration) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }

    /// Cycle `Name -> Artist -> Duration -> Name`.
    pub fn next(self) -> Self {
        match self {
            SortKey::Name => SortKey::Artist,
            SortKey::Artist => SortKey::Duration,
            SortKey::Duration => SortKey::Name,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Artist => "artist",
            SortKey::Duration => "duration",
        }
    }

    pub fn from_setting(setting: SortSetting) -> Option<Self> {
        match setting {
            SortSetting::None => None,
            SortSetting::Name => Some(SortKey::Name),
            SortSetting::Artist => Some(SortKey::Artist),
            SortSetting::Duration => Some(SortKey::Duration),
        }
    }
}
