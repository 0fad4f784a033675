use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer};

/// Columns every non-empty sales table is expected to carry.
pub const SALES_COLUMNS: [&str; 10] = [
    "Name",
    "Platform",
    "Year",
    "Genre",
    "Publisher",
    "NA_Sales",
    "EU_Sales",
    "JP_Sales",
    "Other_Sales",
    "Global_Sales",
];

// ---------------------------------------------------------------------------
// SalesMeasure – the five numeric sales columns
// ---------------------------------------------------------------------------

/// One of the five sales figures of a record, in millions of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SalesMeasure {
    Na,
    Eu,
    Jp,
    Other,
    Global,
}

impl SalesMeasure {
    /// Four regional markets followed by the global total.
    pub const ALL: [SalesMeasure; 5] = [
        SalesMeasure::Na,
        SalesMeasure::Eu,
        SalesMeasure::Jp,
        SalesMeasure::Other,
        SalesMeasure::Global,
    ];

    /// Column name in the source table.
    pub fn column(self) -> &'static str {
        match self {
            SalesMeasure::Na => "NA_Sales",
            SalesMeasure::Eu => "EU_Sales",
            SalesMeasure::Jp => "JP_Sales",
            SalesMeasure::Other => "Other_Sales",
            SalesMeasure::Global => "Global_Sales",
        }
    }

    /// Short axis label.
    pub fn label(self) -> &'static str {
        match self {
            SalesMeasure::Na => "NA",
            SalesMeasure::Eu => "EU",
            SalesMeasure::Jp => "JP",
            SalesMeasure::Other => "Other",
            SalesMeasure::Global => "Global",
        }
    }

    /// Position inside [`SalesMeasure::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SalesMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single game release with its regional and global sales.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Name")]
    pub title: String,
    #[serde(rename = "Platform", default)]
    pub platform: String,
    #[serde(rename = "Year", default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    #[serde(rename = "Genre")]
    pub genre: String,
    #[serde(rename = "Publisher", default)]
    pub publisher: String,
    #[serde(rename = "NA_Sales")]
    pub na_sales: f64,
    #[serde(rename = "EU_Sales")]
    pub eu_sales: f64,
    #[serde(rename = "JP_Sales")]
    pub jp_sales: f64,
    #[serde(rename = "Other_Sales")]
    pub other_sales: f64,
    #[serde(rename = "Global_Sales")]
    pub global_sales: f64,
}

impl SalesRecord {
    pub fn measure(&self, measure: SalesMeasure) -> f64 {
        match measure {
            SalesMeasure::Na => self.na_sales,
            SalesMeasure::Eu => self.eu_sales,
            SalesMeasure::Jp => self.jp_sales,
            SalesMeasure::Other => self.other_sales,
            SalesMeasure::Global => self.global_sales,
        }
    }

    /// First sales figure that is NaN or infinite, if any.
    pub fn non_finite_measure(&self) -> Option<SalesMeasure> {
        SalesMeasure::ALL
            .into_iter()
            .find(|&m| !self.measure(m).is_finite())
    }
}

/// Year cells appear as `2006`, `2006.0`, empty, or a placeholder such as `N/A`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawYear {
    fn into_year(self) -> Option<i32> {
        match self {
            RawYear::Int(i) => i32::try_from(i).ok(),
            RawYear::Float(f) => year_from_f64(f),
            RawYear::Text(s) => parse_year(&s),
        }
    }
}

/// Parse a textual year cell; anything that is not a whole number is missing.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i32>() {
        return Some(i);
    }
    s.parse::<f64>().ok().and_then(year_from_f64)
}

/// Whole, finite numbers only.
pub fn year_from_f64(f: f64) -> Option<i32> {
    if f.is_finite() && f.fract() == 0.0 {
        i32::try_from(f as i64).ok()
    } else {
        None
    }
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawYear>::deserialize(deserializer)?;
    Ok(raw.and_then(RawYear::into_year))
}

// ---------------------------------------------------------------------------
// SalesTable – a loaded dataset or a derived view of one
// ---------------------------------------------------------------------------

/// Rows plus the indices the filter widgets are built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTable {
    pub records: Vec<SalesRecord>,
    /// Sorted distinct genres.
    pub genres: BTreeSet<String>,
    /// Smallest and largest known year, `None` when no row has a year.
    pub year_span: Option<(i32, i32)>,
}

impl SalesTable {
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let genres: BTreeSet<String> = records.iter().map(|r| r.genre.clone()).collect();
        let year_span = records
            .iter()
            .filter_map(|r| r.year)
            .fold(None, |span, y| match span {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });
        SalesTable {
            records,
            genres,
            year_span,
        }
    }

    /// Zero rows, used as the fallback when loading fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Test helper shared by the data modules.
    pub(crate) fn record(title: &str, genre: &str, year: Option<i32>, sales: [f64; 5]) -> SalesRecord {
        SalesRecord {
            title: title.to_string(),
            platform: "PS2".to_string(),
            year,
            genre: genre.to_string(),
            publisher: "Acme".to_string(),
            na_sales: sales[0],
            eu_sales: sales[1],
            jp_sales: sales[2],
            other_sales: sales[3],
            global_sales: sales[4],
        }
    }

    #[test]
    fn table_indices() {
        let table = SalesTable::from_records(vec![
            record("A", "Sports", Some(2005), [1.0, 0.0, 0.0, 0.0, 1.0]),
            record("B", "Action", None, [1.0, 0.0, 0.0, 0.0, 1.0]),
            record("C", "Action", Some(1998), [1.0, 0.0, 0.0, 0.0, 1.0]),
        ]);
        assert_eq!(
            table.genres.iter().collect::<Vec<_>>(),
            vec!["Action", "Sports"]
        );
        assert_eq!(table.year_span, Some((1998, 2005)));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn empty_table_has_no_span() {
        let table = SalesTable::empty();
        assert!(table.is_empty());
        assert!(table.genres.is_empty());
        assert_eq!(table.year_span, None);
    }

    #[test]
    fn year_cells() {
        assert_eq!(parse_year("2006"), Some(2006));
        assert_eq!(parse_year(" 2006.0 "), Some(2006));
        assert_eq!(parse_year("2006.5"), None);
        assert_eq!(parse_year("N/A"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn measure_order_matches_columns() {
        let r = record("A", "Sports", Some(2005), [1.0, 2.0, 3.0, 4.0, 10.0]);
        let values: Vec<f64> = SalesMeasure::ALL.iter().map(|&m| r.measure(m)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 10.0]);
        assert_eq!(SalesMeasure::Jp.index(), 2);
        assert_eq!(SalesMeasure::Global.column(), "Global_Sales");
    }

    #[test]
    fn non_finite_sales_are_reported() {
        let ok = record("A", "Sports", Some(2005), [1.0, 2.0, 3.0, 4.0, 10.0]);
        assert_eq!(ok.non_finite_measure(), None);
        let nan = record("B", "Sports", Some(2005), [1.0, f64::NAN, 3.0, 4.0, f64::NAN]);
        assert_eq!(nan.non_finite_measure(), Some(SalesMeasure::Eu));
        let inf = record("C", "Sports", Some(2005), [1.0, 2.0, 3.0, 4.0, f64::INFINITY]);
        assert_eq!(inf.non_finite_measure(), Some(SalesMeasure::Global));
    }
}
