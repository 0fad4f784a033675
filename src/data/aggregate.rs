use std::collections::{BTreeMap, BTreeSet};

use crate::config::AggregationPolicy;

use super::model::{SalesMeasure, SalesTable};

// ---------------------------------------------------------------------------
// Output rows
// ---------------------------------------------------------------------------

/// Mean global sales of one genre.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreAverage {
    pub genre: String,
    pub global_sales: f64,
}

/// Summed global sales of one (year, genre) pair, possibly capped.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub year: i32,
    pub genre: String,
    pub global_sales: f64,
}

/// Yearly sales of the best-selling genres.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTrend {
    /// Ranked best first.
    pub genres: Vec<String>,
    /// Sorted by year, then genre.
    pub points: Vec<TrendPoint>,
    /// Value every point was clipped to, `None` when there were no points.
    pub cap: Option<f64>,
}

impl SalesTrend {
    /// Points of one genre in year order.
    pub fn series<'a>(&'a self, genre: &'a str) -> impl Iterator<Item = &'a TrendPoint> + 'a {
        self.points.iter().filter(move |p| p.genre == genre)
    }
}

/// One game on the NA-vs-EU scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub title: String,
    pub genre: String,
    pub na_sales: f64,
    pub eu_sales: f64,
    pub global_sales: f64,
}

/// Pairwise Pearson coefficients of the five sales measures, in [`SalesMeasure::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub values: [[f64; 5]; 5],
}

impl CorrelationMatrix {
    pub fn get(&self, a: SalesMeasure, b: SalesMeasure) -> f64 {
        self.values[a.index()][b.index()]
    }

    /// True when no coefficient could be computed.
    pub fn is_undefined(&self) -> bool {
        self.values.iter().flatten().all(|v| v.is_nan())
    }
}

// ---------------------------------------------------------------------------
// Genre summary
// ---------------------------------------------------------------------------

/// Mean global sales per genre present in `view`, sorted by genre.
pub fn genre_average(view: &SalesTable) -> Vec<GenreAverage> {
    let mut acc: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in &view.records {
        let entry = acc.entry(r.genre.as_str()).or_insert((0.0, 0));
        entry.0 += r.global_sales;
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(genre, (sum, count))| GenreAverage {
            genre: genre.to_string(),
            global_sales: sum / count as f64,
        })
        .collect()
}

/// Total global sales per genre, largest first.
///
/// Groups are formed in genre order and the ranking sort is stable, so equal
/// totals stay in alphabetical order.
pub fn genre_totals(view: &SalesTable) -> Vec<(String, f64)> {
    let mut acc: BTreeMap<&str, f64> = BTreeMap::new();
    for r in &view.records {
        *acc.entry(r.genre.as_str()).or_default() += r.global_sales;
    }
    let mut totals: Vec<(String, f64)> = acc
        .into_iter()
        .map(|(genre, total)| (genre.to_string(), total))
        .collect();
    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// The `n` genres with the largest total; fewer when the view has fewer genres.
pub fn top_genres(view: &SalesTable, n: usize) -> Vec<(String, f64)> {
    let mut totals = genre_totals(view);
    totals.truncate(n);
    totals
}

// ---------------------------------------------------------------------------
// Trend of the top genres
// ---------------------------------------------------------------------------

/// Value at quantile `q` of `values` with linear interpolation between the two
/// nearest ranks. NaN entries are ignored; `None` when nothing is left.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Yearly global sales of the `policy.top_n` best-selling genres of `view`.
///
/// Sums are taken per (year, genre) and every sum above the
/// `policy.clip_quantile` quantile of those sums is capped to it, so one
/// outlier year cannot flatten the rest of the chart.
pub fn top_genre_trend(view: &SalesTable, policy: &AggregationPolicy) -> SalesTrend {
    let genres: Vec<String> = top_genres(view, policy.top_n)
        .into_iter()
        .map(|(genre, _)| genre)
        .collect();
    let keep: BTreeSet<&str> = genres.iter().map(String::as_str).collect();

    let mut sums: BTreeMap<(i32, &str), f64> = BTreeMap::new();
    for r in &view.records {
        let Some(year) = r.year else {
            continue;
        };
        if keep.contains(r.genre.as_str()) {
            *sums.entry((year, r.genre.as_str())).or_default() += r.global_sales;
        }
    }

    let totals: Vec<f64> = sums.values().copied().collect();
    let cap = quantile(&totals, policy.clip_quantile);

    let points = sums
        .into_iter()
        .map(|((year, genre), total)| TrendPoint {
            year,
            genre: genre.to_string(),
            global_sales: cap.map_or(total, |c| total.min(c)),
        })
        .collect();

    SalesTrend {
        genres,
        points,
        cap,
    }
}

// ---------------------------------------------------------------------------
// Regional analysis
// ---------------------------------------------------------------------------

pub fn regional_scatter(view: &SalesTable) -> Vec<ScatterPoint> {
    view.records
        .iter()
        .map(|r| ScatterPoint {
            title: r.title.clone(),
            genre: r.genre.clone(),
            na_sales: r.na_sales,
            eu_sales: r.eu_sales,
            global_sales: r.global_sales,
        })
        .collect()
}

/// Pearson correlation of every pair of sales measures over the rows of `view`.
///
/// A coefficient is NaN when there are fewer than two rows or either column
/// is constant; the diagonal is exactly 1.0 otherwise.
pub fn correlation_matrix(view: &SalesTable) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = SalesMeasure::ALL
        .iter()
        .map(|&m| view.records.iter().map(|r| r.measure(m)).collect())
        .collect();

    let mut values = [[f64::NAN; 5]; 5];
    for i in 0..5 {
        values[i][i] = if variance_sum(&columns[i]).is_some() {
            1.0
        } else {
            f64::NAN
        };
        for j in (i + 1)..5 {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { values }
}

/// Sum of squared deviations, `None` for fewer than two values or zero spread.
fn variance_sum(xs: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let ss: f64 = xs.iter().map(|x| (x - mean).powi(2)).sum();
    (ss > 0.0).then_some(ss)
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let (Some(sxx), Some(syy)) = (variance_sum(xs), variance_sum(ys)) else {
        return f64::NAN;
    };
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let sxy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mx) * (y - my))
        .sum();
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterSelection, filter};
    use crate::data::model::tests::record;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn global(genre: &str, year: i32, sales: f64) -> crate::data::model::SalesRecord {
        record("g", genre, Some(year), [0.0, 0.0, 0.0, 0.0, sales])
    }

    #[test]
    fn scenario_genre_average() {
        let table = SalesTable::from_records(vec![
            record("GameA", "Action", Some(2005), [1.0, 0.5, 0.1, 0.1, 1.7]),
            record("GameB", "Sports", Some(2005), [2.0, 1.0, 0.0, 0.2, 3.2]),
        ]);
        let selection = FilterSelection::covering(&table)
            .with_genres(["Action".to_string()])
            .with_years(2000, 2010);
        let view = filter(&table, &selection);

        assert_eq!(
            genre_average(&view),
            vec![GenreAverage {
                genre: "Action".to_string(),
                global_sales: 1.7
            }]
        );
    }

    #[test]
    fn genre_average_per_present_genre() {
        let view = SalesTable::from_records(vec![
            global("Sports", 2000, 1.0),
            global("Action", 2000, 2.0),
            global("Sports", 2001, 3.0),
            global("Action", 2002, 6.0),
            global("Puzzle", 2002, 0.5),
        ]);
        let avg = genre_average(&view);
        assert_eq!(avg.len(), view.genres.len());
        let genres: Vec<&str> = avg.iter().map(|a| a.genre.as_str()).collect();
        assert_eq!(genres, vec!["Action", "Puzzle", "Sports"]);
        assert!(close(avg[0].global_sales, 4.0));
        assert!(close(avg[1].global_sales, 0.5));
        assert!(close(avg[2].global_sales, 2.0));
    }

    #[test]
    fn top_genres_rank_and_ties() {
        let view = SalesTable::from_records(vec![
            global("Sports", 2000, 5.0),
            global("Action", 2000, 3.0),
            global("Racing", 2000, 3.0),
            global("Puzzle", 2000, 1.0),
        ]);
        let top = top_genres(&view, 3);
        let names: Vec<&str> = top.iter().map(|(g, _)| g.as_str()).collect();
        assert_eq!(names, vec!["Sports", "Action", "Racing"]);
    }

    #[test]
    fn fewer_genres_than_n_keeps_all() {
        let view = SalesTable::from_records(vec![global("Sports", 2000, 5.0), global("Action", 2001, 1.0)]);
        let trend = top_genre_trend(&view, &AggregationPolicy::default());
        assert_eq!(trend.genres, vec!["Sports".to_string(), "Action".to_string()]);
    }

    #[test]
    fn trend_keeps_top_five_and_caps() {
        let mut records = Vec::new();
        let genres = ["A", "B", "C", "D", "E", "F", "G"];
        for (i, g) in genres.iter().enumerate() {
            for year in 2000..2004 {
                records.push(global(g, year, (i + 1) as f64));
            }
        }
        // One spike that the cap must flatten.
        records.push(global("G", 2001, 100.0));
        let view = SalesTable::from_records(records);

        let policy = AggregationPolicy::default();
        let trend = top_genre_trend(&view, &policy);

        let expected: Vec<String> = ["G", "F", "E", "D", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(trend.genres, expected);

        let seen: BTreeSet<&str> = trend.points.iter().map(|p| p.genre.as_str()).collect();
        assert_eq!(seen, expected.iter().map(String::as_str).collect::<BTreeSet<&str>>());
        assert_eq!(trend.points.len(), 5 * 4);

        let cap = trend.cap.unwrap();
        assert!(cap < 107.0);
        assert!(trend.points.iter().all(|p| p.global_sales <= cap));

        let sums: Vec<f64> = {
            let mut raw: BTreeMap<(i32, &str), f64> = BTreeMap::new();
            for r in &view.records {
                if expected.contains(&r.genre) {
                    *raw.entry((r.year.unwrap(), r.genre.as_str())).or_default() += r.global_sales;
                }
            }
            raw.into_values().collect()
        };
        assert!(close(cap, quantile(&sums, 0.95).unwrap()));
    }

    #[test]
    fn trend_points_sorted_by_year_then_genre() {
        let view = SalesTable::from_records(vec![
            global("B", 2001, 1.0),
            global("A", 2001, 1.0),
            global("B", 2000, 1.0),
        ]);
        let trend = top_genre_trend(&view, &AggregationPolicy::default());
        let keys: Vec<(i32, &str)> = trend.points.iter().map(|p| (p.year, p.genre.as_str())).collect();
        assert_eq!(keys, vec![(2000, "B"), (2001, "A"), (2001, "B")]);
        assert_eq!(trend.series("B").count(), 2);
    }

    #[test]
    fn quantile_interpolates() {
        assert_eq!(quantile(&[], 0.95), None);
        assert_eq!(quantile(&[4.0], 0.95), Some(4.0));
        assert!(close(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.5).unwrap(), 3.0));
        assert!(close(quantile(&[5.0, 1.0, 2.0, 3.0, 4.0], 0.95).unwrap(), 4.8));
        assert!(close(quantile(&[1.0, f64::NAN, 3.0], 1.0).unwrap(), 3.0));
    }

    #[test]
    fn correlation_properties() {
        let view = SalesTable::from_records(vec![
            record("a", "X", Some(2000), [1.0, 0.5, 0.3, 0.1, 1.9]),
            record("b", "X", Some(2001), [2.0, 1.1, 0.1, 0.2, 3.4]),
            record("c", "X", Some(2002), [0.5, 0.6, 0.9, 0.0, 2.0]),
            record("d", "X", Some(2003), [3.0, 1.4, 0.0, 0.4, 4.8]),
        ]);
        let m = correlation_matrix(&view);
        for i in 0..5 {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..5 {
                assert_eq!(m.values[i][j], m.values[j][i]);
                assert!((-1.0..=1.0).contains(&m.values[i][j]));
            }
        }
        assert!(m.get(SalesMeasure::Na, SalesMeasure::Global) > 0.9);
        assert!(m.get(SalesMeasure::Na, SalesMeasure::Jp) < 0.0);
    }

    #[test]
    fn correlation_of_perfectly_linear_columns() {
        let view = SalesTable::from_records(vec![
            record("a", "X", Some(2000), [1.0, 2.0, 3.0, 0.0, 6.0]),
            record("b", "X", Some(2000), [2.0, 4.0, 2.0, 0.0, 8.0]),
            record("c", "X", Some(2000), [3.0, 6.0, 1.0, 0.0, 10.0]),
        ]);
        let m = correlation_matrix(&view);
        assert!(close(m.get(SalesMeasure::Na, SalesMeasure::Eu), 1.0));
        assert!(close(m.get(SalesMeasure::Na, SalesMeasure::Jp), -1.0));
        // Constant column.
        assert!(m.get(SalesMeasure::Other, SalesMeasure::Other).is_nan());
        assert!(m.get(SalesMeasure::Other, SalesMeasure::Na).is_nan());
    }

    #[test]
    fn degenerate_views_do_not_fail() {
        let empty = SalesTable::empty();
        assert!(genre_average(&empty).is_empty());
        assert!(regional_scatter(&empty).is_empty());

        let trend = top_genre_trend(&empty, &AggregationPolicy::default());
        assert!(trend.points.is_empty());
        assert!(trend.genres.is_empty());
        assert_eq!(trend.cap, None);

        assert!(correlation_matrix(&empty).is_undefined());

        let single = SalesTable::from_records(vec![global("A", 2000, 1.0)]);
        assert!(correlation_matrix(&single).is_undefined());
    }

    #[test]
    fn empty_selection_scenario() {
        let table = SalesTable::from_records(vec![
            global("Action", 2000, 1.0),
            global("Sports", 2001, 2.0),
        ]);
        let selection = FilterSelection::covering(&table).with_genres(Vec::new());
        let view = filter(&table, &selection);
        assert!(view.is_empty());
        assert!(genre_average(&view).is_empty());
        assert!(top_genre_trend(&view, &AggregationPolicy::default()).points.is_empty());
        assert!(correlation_matrix(&view).is_undefined());
    }
}
