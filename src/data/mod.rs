/// Data layer: core types, loading, filtering, statistics, export.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordTable, memoized per path
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ neighborhood  │  collapse one-hot columns → `Neighborhood`
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterSpec → filtered row indices
///   └──────────┘
///        │
///        ├──────────────┬──────────────┐
///        ▼              ▼              ▼
///   ┌──────────┐  ┌──────────┐  ┌──────────┐
///   │  stats    │  │  charts   │  │  export   │
///   └──────────┘  └──────────┘  └──────────┘
/// ```
///
/// Everything below the loader is a pure function of (table, spec); the
/// cached table is never mutated after the neighborhood reconstruction.

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod neighborhood;
pub mod stats;
