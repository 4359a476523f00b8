/// Data layer: core types, loading, filtering, derivation, aggregation,
/// and CSV export.
///
/// Architecture:
/// ```text
///  .xlsx / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table, coerce Date / numeric columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  classify work types, bonus, week labels
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply membership / date-range predicates → Table
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by + sum/count → summary Table
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Table → CSV bytes
///   └──────────┘
/// ```
/// Each stage returns a new immutable `Table`; nothing mutates in
/// place, so any filter change recomputes from the loaded table.

pub mod aggregate;
pub mod derive;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
