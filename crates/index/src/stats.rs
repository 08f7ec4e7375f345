use serde::{Deserialize, Serialize};

/// Statistics about an indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of files indexed
    pub files: usize,

    /// Number of files skipped after a read or parse failure
    pub skipped: usize,

    /// Function and macro-function definitions
    pub functions: usize,

    /// Struct / typedef definitions
    pub types: usize,

    /// Object-like macro definitions
    pub defines: usize,

    /// Reverse call edges
    pub call_edges: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Errors encountered, one line per skipped file
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, tables: &crate::FileTables) {
        self.files += 1;
        self.functions += tables.functions.len();
        self.types += tables.types.len();
        self.defines += tables.defines.len();
        self.call_edges += tables.call_edge_count();
    }

    pub fn add_error(&mut self, error: String) {
        self.skipped += 1;
        self.errors.push(error);
    }
}
