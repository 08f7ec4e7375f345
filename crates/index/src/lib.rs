//! # Spec Audit Index
//!
//! Cross-file knowledge index over a C/C++ project.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (sorted, dialect-aware)
//!     │      └─> .c / .h / .cpp / .hpp ...
//!     │
//!     ├──> Syntax Extractor (tree-sitter, per file)
//!     │      └─> FileTables { functions, calls, types, defines }
//!     │
//!     └──> SourceIndex (scan order)
//!            └─> Resolver (preference path, then fallback)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use specaudit_index::{PreferencePath, Resolver, SourceIndex};
//!
//! let index = SourceIndex::build("/path/to/project").unwrap();
//! let prefer = PreferencePath::new("/path/to/project/net");
//! let resolver = Resolver::new(&index, &prefer);
//!
//! if let Some(code) = resolver.query_name("tcp_connect") {
//!     println!("{code}");
//! }
//! println!("{}", resolver.resolve_caller("tcp_connect"));
//! ```

mod error;
mod index;
mod resolver;
mod scanner;
mod stats;
mod tables;

pub use error::{IndexError, Result};
pub use index::{IndexBuilder, IndexedFile, SourceIndex};
pub use resolver::{PreferencePath, Resolver};
pub use scanner::{FileScanner, ScanOptions, SourceFile};
pub use stats::IndexStats;
pub use tables::{CallTable, FileTables, NodeSpan, SymbolTable};
