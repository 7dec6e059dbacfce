//! Data layer: registry, loading, caching and filtering.
//!
//! Architecture:
//! ```text
//!  wide CSV (one column per year)     long CSV (Date, Value)
//!        │                                 │
//!        ▼                                 ▼
//!   ┌───────────────────────────────────────────┐
//!   │  loader   reshape → Vec<Observation>       │
//!   └───────────────────────────────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  cache    │  populate-if-absent, Arc per series
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  inclusive year range → filtered view
//!   └──────────┘
//! ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod registry;
