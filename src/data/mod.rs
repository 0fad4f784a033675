/// Data layer: core types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SalesTable (or LoadError)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one load per path, failures remembered
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  genre set + year range → filtered SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  genre means, top-N trend, correlations
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
