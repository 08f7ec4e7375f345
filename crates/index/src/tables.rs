use serde::{Deserialize, Serialize};
use specaudit_syntax::{definitions, Tree};
use std::collections::{BTreeMap, BTreeSet};

/// Location of a definition node inside its owning file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeSpan {
    /// Tree-sitter node kind (e.g. `function_definition`, `preproc_def`)
    pub kind: String,

    /// Byte range `[start_byte, end_byte)` into the file
    pub start_byte: usize,
    pub end_byte: usize,
}

impl NodeSpan {
    fn of(definition: &definitions::Definition<'_>) -> Self {
        let range = definition.byte_range();
        Self {
            kind: definition.kind().to_string(),
            start_byte: range.start,
            end_byte: range.end,
        }
    }
}

/// Symbol name -> defining node. A name defined twice in one file keeps
/// the last definition.
pub type SymbolTable = BTreeMap<String, NodeSpan>;

/// Callee name -> names of functions in this file whose body calls it
pub type CallTable = BTreeMap<String, BTreeSet<String>>;

/// Every table extracted from one parsed file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTables {
    /// Functions and function-like macros
    pub functions: SymbolTable,

    /// Reverse call edges observed in this file
    pub calls: CallTable,

    /// Struct / union / class / enum / typedef definitions
    pub types: SymbolTable,

    /// Object-like macros
    pub defines: SymbolTable,
}

impl FileTables {
    /// Extract all tables from a tree parsed out of `source`
    pub fn extract(tree: &Tree, source: &[u8]) -> Self {
        let root = tree.root_node();
        let mut tables = Self::default();

        for (name, definition) in definitions::functions(root, source) {
            // Only real function bodies contribute call edges; macro bodies
            // are token soup to the parser.
            if definition.kind() == "function_definition" {
                for callee in definitions::calls(definition.node, source) {
                    tables
                        .calls
                        .entry(callee)
                        .or_default()
                        .insert(name.clone());
                }
            }
            tables.functions.insert(name, NodeSpan::of(&definition));
        }

        for (name, definition) in definitions::types(root, source) {
            tables.types.insert(name, NodeSpan::of(&definition));
        }

        for (name, definition) in definitions::defines(root, source) {
            tables.defines.insert(name, NodeSpan::of(&definition));
        }

        tables
    }

    /// Number of distinct callee -> caller edges
    pub fn call_edge_count(&self) -> usize {
        self.calls.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use specaudit_syntax::{Dialect, SyntaxExtractor};

    fn extract(source: &[u8], dialect: Dialect) -> FileTables {
        let mut extractor = SyntaxExtractor::new(dialect).unwrap();
        let tree = extractor.parse(source).unwrap();
        FileTables::extract(&tree, source)
    }

    #[test]
    fn records_reverse_call_edges() {
        let source = br#"
static void log_msg(const char *m) {}
void handle(int fd) { log_msg("x"); close(fd); }
void shutdown(void) { log_msg("bye"); }
"#;
        let tables = extract(source, Dialect::C);

        let callers: Vec<_> = tables.calls["log_msg"].iter().cloned().collect();
        assert_eq!(callers, vec!["handle", "shutdown"]);
        assert_eq!(tables.calls["close"].len(), 1);
        assert_eq!(tables.call_edge_count(), 3);
    }

    #[test]
    fn last_definition_wins_within_a_file() {
        let source = br#"
#ifdef FAST
int pick(void) { return 1; }
#else
int pick(void) { return 2; }
#endif
"#;
        let tables = extract(source, Dialect::C);
        let span = &tables.functions["pick"];
        let text = std::str::from_utf8(&source[span.start_byte..span.end_byte]).unwrap();
        assert_eq!(text, "int pick(void) { return 2; }");
    }

    #[test]
    fn separates_functions_types_and_defines() {
        let source = br#"
#define BUF_SIZE 512
#define MIN(a, b) ((a) < (b) ? (a) : (b))
typedef struct conn { int fd; } conn_t;
int conn_open(conn_t *c) { return MIN(c->fd, BUF_SIZE); }
"#;
        let tables = extract(source, Dialect::C);

        assert_eq!(
            tables.functions.keys().cloned().collect::<Vec<_>>(),
            vec!["MIN", "conn_open"]
        );
        assert_eq!(
            tables.types.keys().cloned().collect::<Vec<_>>(),
            vec!["conn", "conn_t"]
        );
        assert_eq!(tables.defines.keys().cloned().collect::<Vec<_>>(), vec!["BUF_SIZE"]);
        assert_eq!(tables.functions["MIN"].kind, "preproc_function_def");
        assert_eq!(tables.types["conn_t"].kind, "type_definition");
    }
}
