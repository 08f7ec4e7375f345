//! # Spec Audit Syntax
//!
//! Thin layer over tree-sitter for C and C++ sources.
//!
//! ## Architecture
//!
//! ```text
//! Source bytes
//!     │
//!     ├──> Dialect Detection (from extension + header dialect)
//!     │
//!     ├──> Tree-sitter Parsing → Tree
//!     │
//!     ├──> Tree Search Primitives
//!     │    ├─> find_all (pre-order)
//!     │    ├─> find_first_breadth_first
//!     │    └─> find_first_ancestor
//!     │
//!     └──> Definition Names
//!          ├─> functions (incl. Class::member)
//!          ├─> macros (object / function-like)
//!          ├─> struct / union / enum / typedef
//!          └─> call targets
//! ```
//!
//! ## Example
//!
//! ```rust
//! use specaudit_syntax::{definitions, find_all, Dialect, SyntaxExtractor};
//!
//! let source = b"int add(int a, int b) { return a + b; }";
//! let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
//! let tree = extractor.parse(source).unwrap();
//!
//! let defs = find_all(tree.root_node(), "function_definition");
//! let name = definitions::function_name(defs[0], source);
//! assert_eq!(name.as_deref(), Some("add"));
//! ```

pub mod definitions;
mod dialect;
mod error;
mod extractor;

pub use dialect::Dialect;
pub use error::{Result, SyntaxError};
pub use extractor::{
    find_all, find_first_ancestor, find_first_breadth_first, node_text, SyntaxExtractor,
};
pub use tree_sitter::{Node, Tree};
