use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use super::loader::{LoadError, load_file};
use super::model::SalesTable;

// ---------------------------------------------------------------------------
// Load-once memo keyed by path
// ---------------------------------------------------------------------------

/// Result of the one and only load attempt for a path.
///
/// On failure `table` is empty and `error` holds the reason; callers keep going
/// with the empty table.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub table: Arc<SalesTable>,
    pub error: Option<Arc<LoadError>>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// User-facing message for the status bar.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("Error: {e}"))
    }
}

/// Each path is read at most once; failures are remembered too and never retried.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, LoadOutcome>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance used by the application.
    pub fn global() -> &'static DatasetCache {
        static CACHE: OnceLock<DatasetCache> = OnceLock::new();
        CACHE.get_or_init(DatasetCache::new)
    }

    pub fn load(&self, path: &Path) -> LoadOutcome {
        // A poisoned lock only means a previous loader panicked; the map is still usable.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(outcome) = entries.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return outcome.clone();
        }

        let outcome = match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} sales records ({} genres, years {:?}) from {}",
                    table.len(),
                    table.genres.len(),
                    table.year_span,
                    path.display()
                );
                LoadOutcome {
                    table: Arc::new(table),
                    error: None,
                }
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                LoadOutcome {
                    table: Arc::new(SalesTable::empty()),
                    error: Some(Arc::new(e)),
                }
            }
        };

        entries.insert(path.to_path_buf(), outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("vgsales.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "Name,Platform,Year,Genre,Publisher,NA_Sales,EU_Sales,JP_Sales,Other_Sales,Global_Sales"
        )
        .unwrap();
        writeln!(file, "GameA,PS2,2005,Action,Acme,1.0,0.5,0.1,0.1,1.7").unwrap();
        path
    }

    #[test]
    fn repeated_loads_share_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir);
        let cache = DatasetCache::new();

        let first = cache.load(&path);
        assert!(first.is_ok());
        assert_eq!(first.table.len(), 1);

        // Removing the file proves the second call never touches the disk.
        std::fs::remove_file(&path).unwrap();
        let second = cache.load(&path);
        assert!(Arc::ptr_eq(&first.table, &second.table));
    }

    #[test]
    fn missing_path_yields_empty_table_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        let cache = DatasetCache::new();

        let outcome = cache.load(&path);
        assert!(outcome.table.is_empty());
        assert!(matches!(
            outcome.error.as_deref(),
            Some(LoadError::NotFound { .. })
        ));
        assert!(outcome.message().unwrap().contains("not found"));
    }

    #[test]
    fn failures_are_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.csv");
        let cache = DatasetCache::new();

        let first = cache.load(&path);
        assert!(!first.is_ok());

        // The file appearing later does not change the remembered outcome.
        let written = write_csv(&dir);
        std::fs::rename(&written, &path).unwrap();
        let second = cache.load(&path);
        assert!(!second.is_ok());
        assert!(second.table.is_empty());
    }

    #[test]
    fn global_instance_is_shared() {
        assert!(std::ptr::eq(DatasetCache::global(), DatasetCache::global()));
    }
}
