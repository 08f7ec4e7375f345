//! # Spec Audit CLI
//!
//! Configuration, document segmentation and the end-to-end pipeline
//! behind the `specaudit` binary.

pub mod config;
pub mod document;
pub mod pipeline;

pub use config::{AppConfig, DEFAULT_CONFIG_FILE};
pub use document::{clean_document, segment_sections};
pub use pipeline::{build_index, load_sections, run, summarize, RunSummary};
