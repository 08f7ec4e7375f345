//! # Spec Audit Search
//!
//! Retrieval from a specification chunk to the source code that
//! implements it.
//!
//! ## Flow
//!
//! ```text
//! chunk ──> explore (summary tree, oracle per directory)
//!             └─> [CandidateMatch { path, file }]
//!                   │
//!                   ├──> FunctionCatalog (name -> location, summaries)
//!                   ├──> select_functions (oracle ranking, bounded retries)
//!                   └──> extract_code (byte slices of the source files)
//! ```
//!
//! The summary tree itself comes from [`SummaryBuilder`], an offline pass
//! that asks the oracle to describe every function, file and folder.

mod builder;
mod error;
mod explore;
mod select;
mod summary;

pub use builder::SummaryBuilder;
pub use error::{Result, SearchError};
pub use explore::{explore, render_listing, CandidateMatch};
pub use select::{
    extract_code, select_functions, FunctionCatalog, FunctionLocation, SourceCache,
    DEFAULT_SELECTION_RETRIES,
};
pub use summary::{DirectorySummary, FileSummary, FunctionDescriptor, SummaryNode};
