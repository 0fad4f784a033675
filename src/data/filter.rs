use std::collections::BTreeSet;

use super::model::{SalesRecord, SalesTable};

/// Year bounds offered when the loaded table has no years at all.
pub const DEFAULT_YEAR_SPAN: (i32, i32) = (1980, 2020);

// ---------------------------------------------------------------------------
// Filter predicate: selected genres and an inclusive year range
// ---------------------------------------------------------------------------

/// The active selection. Rebuilt on every interaction and passed by reference.
///
/// An empty `genres` set selects nothing; there is no implicit "select all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub genres: BTreeSet<String>,
    pub year_min: i32,
    pub year_max: i32,
}

impl FilterSelection {
    /// Everything in `table` selected: all genres, full year span.
    pub fn covering(table: &SalesTable) -> Self {
        let (year_min, year_max) = table.year_span.unwrap_or(DEFAULT_YEAR_SPAN);
        FilterSelection {
            genres: table.genres.clone(),
            year_min,
            year_max,
        }
    }

    pub fn with_genres(mut self, genres: impl IntoIterator<Item = String>) -> Self {
        self.genres = genres.into_iter().collect();
        self
    }

    /// Bounds are stored in ascending order whatever order they are given in.
    pub fn with_years(mut self, a: i32, b: i32) -> Self {
        self.year_min = a.min(b);
        self.year_max = a.max(b);
        self
    }

    /// A record passes when its genre is selected and its year lies in range.
    /// Records without a year never pass.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        let in_range = match record.year {
            Some(y) => self.year_min <= y && y <= self.year_max,
            None => false,
        };
        in_range && self.genres.contains(&record.genre)
    }
}

/// Rows of `table` passing `selection`, as a fresh table. The input is untouched.
pub fn filter(table: &SalesTable, selection: &FilterSelection) -> SalesTable {
    let records: Vec<SalesRecord> = table
        .records
        .iter()
        .filter(|r| selection.matches(r))
        .cloned()
        .collect();
    SalesTable::from_records(records)
}
