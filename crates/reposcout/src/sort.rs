//! Client-side ordering of result rows.
//!
//! Sorting never touches the network: it reorders the page that is already
//! loaded. Each [`SortColumn`] maps to a typed accessor, so adding a column is
//! a compile error until its extraction rule is written.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::RepoItem;

/// A sortable column of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Name,
    PrimaryLanguage,
    Forks,
    Stargazers,
    UpdatedAt,
}

impl SortColumn {
    /// All columns, in table order.
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Name,
        SortColumn::PrimaryLanguage,
        SortColumn::Forks,
        SortColumn::Stargazers,
        SortColumn::UpdatedAt,
    ];

    /// Stable identifier used in configuration and on the command line.
    pub fn id(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::PrimaryLanguage => "primaryLanguage",
            SortColumn::Forks => "forks",
            SortColumn::Stargazers => "stargazers",
            SortColumn::UpdatedAt => "updatedAt",
        }
    }

    /// Column header.
    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::PrimaryLanguage => "Language",
            SortColumn::Forks => "Forks",
            SortColumn::Stargazers => "Stars",
            SortColumn::UpdatedAt => "Updated",
        }
    }

    /// Extract the comparable value of this column from `item`.
    pub fn key(self, item: &RepoItem) -> SortKey<'_> {
        match self {
            SortColumn::Name => SortKey::Text(&item.name),
            SortColumn::PrimaryLanguage => {
                SortKey::Text(item.primary_language.as_deref().unwrap_or(""))
            }
            SortColumn::Forks => SortKey::Count(item.forks),
            SortColumn::Stargazers => SortKey::Count(item.stargazers),
            SortColumn::UpdatedAt if item.updated_at.is_empty() => SortKey::Missing,
            SortColumn::UpdatedAt => SortKey::Text(&item.updated_at),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort column '{0}' (expected one of: name, primaryLanguage, forks, stargazers, updatedAt)")]
pub struct ParseSortColumnError(pub String);

impl FromStr for SortColumn {
    type Err = ParseSortColumnError;

    /// Accepts the column id case-insensitively, plus a few short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "primarylanguage" | "language" | "lang" => Ok(SortColumn::PrimaryLanguage),
            "forks" => Ok(SortColumn::Forks),
            "stargazers" | "stars" => Ok(SortColumn::Stargazers),
            "updatedat" | "updated" => Ok(SortColumn::UpdatedAt),
            _ => Err(ParseSortColumnError(s.to_string())),
        }
    }
}

/// A comparable value extracted from a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey<'a> {
    Missing,
    Text(&'a str),
    Count(u64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// The base comparator: orders `a` before `b` when `a` ranks higher.
///
/// A row whose value is missing sorts after a row that has one.
pub fn descending_comparator(a: &RepoItem, b: &RepoItem, column: SortColumn) -> Ordering {
    match (column.key(a), column.key(b)) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (_, SortKey::Missing) => Ordering::Less,
        (SortKey::Missing, _) => Ordering::Greater,
        (a_key, b_key) => b_key.cmp(&a_key),
    }
}

/// Compare two rows by `column` in `direction`.
///
/// Ascending is the exact reverse of [`descending_comparator`].
pub fn compare(a: &RepoItem, b: &RepoItem, column: SortColumn, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Descending => descending_comparator(a, b, column),
        SortDirection::Ascending => descending_comparator(a, b, column).reverse(),
    }
}

/// Sort rows by `column`, keeping the original relative order of ties.
pub fn stable_sort(items: &[RepoItem], column: SortColumn, direction: SortDirection) -> Vec<&RepoItem> {
    let mut tagged: Vec<(usize, &RepoItem)> = items.iter().enumerate().collect();
    tagged.sort_by(|(ia, a), (ib, b)| compare(a, b, column, direction).then_with(|| ia.cmp(ib)));
    tagged.into_iter().map(|(_, item)| item).collect()
}

/// Which column the table is sorted by, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<SortColumn>,
    /// Only meaningful while `column` is set.
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.column.is_some()
    }

    pub fn is_active(&self, column: SortColumn) -> bool {
        self.column == Some(column)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Apply a header click on `column`.
    ///
    /// A new column sorts ascending, a second click on the same column sorts
    /// descending, and a third click clears the sort.
    pub fn request(&mut self, column: SortColumn) {
        match (self.column, self.direction) {
            (Some(current), SortDirection::Ascending) if current == column => {
                self.direction = SortDirection::Descending;
            }
            (Some(current), SortDirection::Descending) if current == column => {
                self.clear();
            }
            _ => {
                self.column = Some(column);
                self.direction = SortDirection::Ascending;
            }
        }
    }

    /// Rows in display order. Unsorted state keeps insertion order.
    pub fn apply<'a>(&self, items: &'a [RepoItem]) -> Vec<&'a RepoItem> {
        match self.column {
            Some(column) => stable_sort(items, column, self.direction),
            None => items.iter().collect(),
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{} {}", column, self.direction.as_str()),
            None => f.write_str("unsorted"),
        }
    }
}
