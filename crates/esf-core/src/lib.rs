//! Extra Search Filters Core Library
//!
//! Client-side filtering of Steam store search results: price range, base
//! price range, discount, review score, demo/prologue and free-to-play
//! handling, on top of the host page's own filters.
//!
//! # Architecture
//!
//! Nothing in this crate touches a browser. Host access goes through small
//! traits ([`ResultItem`], [`ResultRow`], [`ResultContainer`]) implemented by
//! the wasm bindings for live DOM nodes, by `esf-markup` for parsed HTML, and
//! by test doubles.
//!
//! # Modules
//!
//! - `options`: filter settings and their setters
//! - `predicate`: per-result evaluation (show / hide / defer)
//! - `scanner`: list scanning and the per-page filter session
//! - `intercept`: AJAX response screening and deferred hiding
//! - `text`: lenient parsing of scraped text
//! - `host`: host page selectors and identifiers
//! - `price_stops`: host price tier table
//! - `types`: shared type definitions

pub mod error;
pub mod host;
pub mod intercept;
pub mod options;
pub mod predicate;
pub mod price_stops;
pub mod scanner;
pub mod text;
pub mod types;

// Re-export commonly used types
pub use error::{OptionsError, ResponseError};
pub use intercept::{
    screen, CancelToken, CompletedRequest, Interceptor, PendingHide, PollPolicy, PollState,
    ResultContainer, SearchResponse,
};
pub use options::{BoundUpdate, FilterOptions, OptionsConfig};
pub use predicate::{evaluate, ResultItem};
pub use price_stops::PriceStops;
pub use scanner::{scan, FilterSession, ResultRow, ScanSummary};
pub use types::{Bound, FilterFlags, HostMarkers, Verdict};
