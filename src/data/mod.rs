/// Data layer: captures, traces, markers and the peak search.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Capture>
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │    model      │  Capture → Trace (live / hold), Marker index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  peaks    │  trace power + view window → new marker index
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod peaks;
