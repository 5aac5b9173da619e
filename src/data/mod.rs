/// Data layer: raw cells, typed records, loading, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .ods / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  ordered parser attempts → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  trimmed headers, schema check, Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  sex / age-class predicates → record subsets
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
