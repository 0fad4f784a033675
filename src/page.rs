use crate::config::AggregationPolicy;
use crate::data::aggregate::{
    CorrelationMatrix, GenreAverage, SalesTrend, ScatterPoint, correlation_matrix, genre_average,
    regional_scatter, top_genre_trend,
};
use crate::data::model::SalesTable;

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// The four mutually exclusive views selected from the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Home,
    SalesByGenre,
    SalesTrends,
    RegionalAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Heatmap,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Home,
        Page::SalesByGenre,
        Page::SalesTrends,
        Page::RegionalAnalysis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::SalesByGenre => "Sales by Genre",
            Page::SalesTrends => "Sales Trends",
            Page::RegionalAnalysis => "Regional Analysis",
        }
    }

    /// Run the aggregation this page draws from.
    pub fn build(self, view: &SalesTable, policy: &AggregationPolicy) -> PageContent {
        match self {
            Page::Home => PageContent::Landing,
            Page::SalesByGenre => PageContent::GenreSummary(genre_average(view)),
            Page::SalesTrends => PageContent::Trend(top_genre_trend(view, policy)),
            Page::RegionalAnalysis => PageContent::Regional {
                scatter: regional_scatter(view),
                correlation: correlation_matrix(view),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Built page content
// ---------------------------------------------------------------------------

/// Everything the central panel needs to draw one page. Rebuilt on every interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PageContent {
    Landing,
    GenreSummary(Vec<GenreAverage>),
    Trend(SalesTrend),
    Regional {
        scatter: Vec<ScatterPoint>,
        correlation: CorrelationMatrix,
    },
}

impl PageContent {
    pub fn page(&self) -> Page {
        match self {
            PageContent::Landing => Page::Home,
            PageContent::GenreSummary(_) => Page::SalesByGenre,
            PageContent::Trend(_) => Page::SalesTrends,
            PageContent::Regional { .. } => Page::RegionalAnalysis,
        }
    }

    pub fn chart_kinds(&self) -> &'static [ChartKind] {
        match self {
            PageContent::Landing => &[],
            PageContent::GenreSummary(_) => &[ChartKind::Bar],
            PageContent::Trend(_) => &[ChartKind::Line],
            PageContent::Regional { .. } => &[ChartKind::Scatter, ChartKind::Heatmap],
        }
    }

    /// Caption shown under the charts.
    pub fn insight(&self) -> Option<&'static str> {
        match self {
            PageContent::Landing => None,
            PageContent::GenreSummary(_) => Some(
                "This bar plot shows the average global sales per genre. \
                 Use the genre filter to focus on specific categories.",
            ),
            PageContent::Trend(_) => Some(
                "This line plot shows sales trends for the top genres. \
                 Use the year range to zoom into specific periods. \
                 Outliers are capped for better readability.",
            ),
            PageContent::Regional { .. } => Some(
                "The scatter plot compares NA and EU sales, with point size reflecting \
                 global sales. The heatmap shows correlations between regional sales; \
                 high correlations suggest market similarities.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn view() -> SalesTable {
        SalesTable::from_records(vec![
            record("GameA", "Action", Some(2005), [1.0, 0.5, 0.1, 0.1, 1.7]),
            record("GameB", "Sports", Some(2006), [2.0, 1.0, 0.0, 0.2, 3.2]),
        ])
    }

    #[test]
    fn each_page_builds_its_own_content() {
        let view = view();
        let policy = AggregationPolicy::default();
        for page in Page::ALL {
            let content = page.build(&view, &policy);
            assert_eq!(content.page(), page);
        }
    }

    #[test]
    fn chart_kinds_per_page() {
        let view = view();
        let policy = AggregationPolicy::default();
        assert!(Page::Home.build(&view, &policy).chart_kinds().is_empty());
        assert_eq!(
            Page::SalesByGenre.build(&view, &policy).chart_kinds(),
            &[ChartKind::Bar]
        );
        assert_eq!(
            Page::SalesTrends.build(&view, &policy).chart_kinds(),
            &[ChartKind::Line]
        );
        assert_eq!(
            Page::RegionalAnalysis.build(&view, &policy).chart_kinds(),
            &[ChartKind::Scatter, ChartKind::Heatmap]
        );
    }

    #[test]
    fn regional_page_on_empty_view() {
        let content = Page::RegionalAnalysis.build(&SalesTable::empty(), &AggregationPolicy::default());
        match content {
            PageContent::Regional {
                scatter,
                correlation,
            } => {
                assert!(scatter.is_empty());
                assert!(correlation.is_undefined());
            }
            other => panic!("unexpected content {other:?}"),
        }
    }
}
