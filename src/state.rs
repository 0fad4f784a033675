use std::path::Path;
use std::sync::Arc;

use crate::color::GenreColors;
use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::filter::{DEFAULT_YEAR_SPAN, FilterSelection, filter};
use crate::data::model::SalesTable;
use crate::page::{Page, PageContent};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset, shared with the cache. Empty after a failed load.
    pub dataset: Arc<SalesTable>,

    /// Active genre / year selection.
    pub selection: FilterSelection,

    /// Page picked in the navigation control.
    pub page: Page,

    /// Rows passing `selection` (recomputed on every change).
    pub view: SalesTable,

    /// Aggregates for `page` over `view`.
    pub content: PageContent,

    /// One colour per genre of the dataset.
    pub colors: GenreColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state around the dataset at `config.data_path`.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState {
            config,
            dataset: Arc::new(SalesTable::empty()),
            selection: FilterSelection::covering(&SalesTable::empty()),
            page: Page::default(),
            view: SalesTable::empty(),
            content: PageContent::Landing,
            colors: GenreColors::default(),
            status_message: None,
        };
        let path = state.config.data_path.clone();
        state.open_dataset(&path);
        state
    }

    /// Load (or fetch from the cache) a dataset and reset the selection to cover it.
    pub fn open_dataset(&mut self, path: &Path) {
        let outcome = DatasetCache::global().load(path);
        if !outcome.is_ok() {
            log::warn!("Continuing with an empty table");
        }
        self.status_message = outcome.message();
        self.set_dataset(outcome.table);
    }

    /// Ingest a dataset, select everything in it and rebuild the current page.
    pub fn set_dataset(&mut self, dataset: Arc<SalesTable>) {
        self.selection = FilterSelection::covering(&dataset);
        self.colors = GenreColors::new(&dataset.genres);
        self.dataset = dataset;
        self.recompute();
    }

    /// Filter → aggregate for the current selection and page.
    pub fn recompute(&mut self) {
        self.view = filter(&self.dataset, &self.selection);
        self.content = self.page.build(&self.view, &self.config.policy());
        log::debug!(
            "{}: {} of {} rows selected",
            self.content.page().label(),
            self.view.len(),
            self.dataset.len()
        );
    }

    pub fn set_page(&mut self, page: Page) {
        if page != self.page {
            self.page = page;
            self.recompute();
        }
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        if selection != self.selection {
            self.selection = selection;
            self.recompute();
        }
    }

    /// Toggle a single genre in the multiselect.
    pub fn toggle_genre(&mut self, genre: &str) {
        let mut genres = self.selection.genres.clone();
        if !genres.remove(genre) {
            genres.insert(genre.to_string());
        }
        let selection = self.selection.clone().with_genres(genres);
        self.set_selection(selection);
    }

    pub fn select_all_genres(&mut self) {
        let selection = self
            .selection
            .clone()
            .with_genres(self.dataset.genres.iter().cloned());
        self.set_selection(selection);
    }

    pub fn select_no_genres(&mut self) {
        let selection = self.selection.clone().with_genres(Vec::new());
        self.set_selection(selection);
    }

    pub fn set_year_range(&mut self, a: i32, b: i32) {
        let selection = self.selection.clone().with_years(a, b);
        self.set_selection(selection);
    }

    /// Bounds of the year range widget.
    pub fn year_bounds(&self) -> (i32, i32) {
        self.dataset.year_span.unwrap_or(DEFAULT_YEAR_SPAN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use std::path::PathBuf;

    fn state() -> AppState {
        let config = DashboardConfig {
            data_path: PathBuf::from("/definitely/not/here/vgsales.csv"),
            ..Default::default()
        };
        let mut state = AppState::new(config);
        state.set_dataset(Arc::new(SalesTable::from_records(vec![
            record("GameA", "Action", Some(2005), [1.0, 0.5, 0.1, 0.1, 1.7]),
            record("GameB", "Sports", Some(2005), [2.0, 1.0, 0.0, 0.2, 3.2]),
            record("GameC", "Action", Some(2012), [0.5, 0.1, 0.0, 0.1, 0.7]),
        ])));
        state
    }

    #[test]
    fn missing_startup_file_leaves_empty_table_and_message() {
        let config = DashboardConfig {
            data_path: PathBuf::from("/definitely/not/here/startup.csv"),
            ..Default::default()
        };
        let state = AppState::new(config);
        assert!(state.dataset.is_empty());
        assert!(state.view.is_empty());
        assert!(state.status_message.as_deref().unwrap().contains("not found"));
    }

    #[test]
    fn interactions_recompute_the_page() {
        let mut state = state();
        state.set_page(Page::SalesByGenre);
        let PageContent::GenreSummary(rows) = &state.content else {
            panic!("expected genre summary");
        };
        assert_eq!(rows.len(), 2);

        state.toggle_genre("Sports");
        state.set_year_range(2010, 2000);
        assert_eq!(state.selection.year_min, 2000);
        assert_eq!(state.view.len(), 1);
        let PageContent::GenreSummary(rows) = &state.content else {
            panic!("expected genre summary");
        };
        assert_eq!(rows[0].genre, "Action");
        assert_eq!(rows[0].global_sales, 1.7);
    }

    #[test]
    fn select_none_then_all() {
        let mut state = state();
        state.set_page(Page::SalesTrends);
        state.select_no_genres();
        assert!(state.view.is_empty());
        let PageContent::Trend(trend) = &state.content else {
            panic!("expected trend");
        };
        assert!(trend.points.is_empty());

        state.select_all_genres();
        assert_eq!(state.view.len(), 3);
    }

    #[test]
    fn empty_view_empties_regional_page() {
        let mut state = state();
        state.set_page(Page::RegionalAnalysis);
        state.set_year_range(1990, 1995);
        assert!(state.view.is_empty());
        let PageContent::Regional { scatter, correlation } = &state.content else {
            panic!("expected regional analysis");
        };
        assert!(scatter.is_empty());
        assert!(correlation.is_undefined());
    }

    #[test]
    fn year_bounds_follow_dataset() {
        let state = state();
        assert_eq!(state.year_bounds(), (2005, 2012));
    }
}
