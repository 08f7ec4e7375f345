use crate::dialect::Dialect;
use crate::error::{Result, SyntaxError};
use std::borrow::Cow;
use std::collections::VecDeque;
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser bound to one dialect
pub struct SyntaxExtractor {
    parser: Parser,
    dialect: Dialect,
}

impl SyntaxExtractor {
    pub fn new(dialect: Dialect) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.tree_sitter_language())
            .map_err(|e| SyntaxError::tree_sitter(format!("Failed to set language: {e}")))?;

        Ok(Self { parser, dialect })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parse a whole file. Syntax errors are kept inside the tree as
    /// `ERROR` nodes; only a missing tree is reported as a failure.
    pub fn parse(&mut self, source: &[u8]) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse("tree-sitter produced no tree"))
    }
}

/// All nodes of `kind` under `root` (inclusive), in pre-order.
pub fn find_all<'t>(root: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.kind() == kind {
            found.push(node);
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        // Reverse so the leftmost child is visited first
        stack.extend(children.into_iter().rev());
    }

    found
}

/// Shallowest node of `kind` under `root` (inclusive), breadth-first.
pub fn find_first_breadth_first<'t>(root: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut queue = VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        if node.kind() == kind {
            return Some(node);
        }

        let mut cursor = node.walk();
        queue.extend(node.children(&mut cursor));
    }

    None
}

/// Nearest strict ancestor of `node` with the given kind.
pub fn find_first_ancestor<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == kind {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Text covered by a node's byte range. Invalid UTF-8 is replaced rather
/// than rejected; C sources in the wild are not always clean.
pub fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> Cow<'s, str> {
    let end = node.end_byte().min(source.len());
    let start = node.start_byte().min(end);
    String::from_utf8_lossy(&source[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &[u8] = br#"
int helper(int x) { return x * 2; }

int main(void) {
    int y = helper(1);
    return helper(y);
}
"#;

    fn texts<'t>(nodes: &[Node<'t>], source: &[u8]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| node_text(*n, source).into_owned())
            .collect()
    }

    #[test]
    fn test_find_all_is_pre_order() {
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(SOURCE).unwrap();

        let calls = find_all(tree.root_node(), "call_expression");
        assert_eq!(texts(&calls, SOURCE), vec!["helper(1)", "helper(y)"]);

        let defs = find_all(tree.root_node(), "function_definition");
        assert_eq!(defs.len(), 2);
        assert!(defs[0].start_byte() < defs[1].start_byte());
    }

    #[test]
    fn test_find_first_breadth_first_prefers_shallow_nodes() {
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(SOURCE).unwrap();
        let defs = find_all(tree.root_node(), "function_definition");

        // The declarator name is shallower than any identifier in the body
        let ident = find_first_breadth_first(defs[1], "identifier").unwrap();
        assert_eq!(node_text(ident, SOURCE), "main");

        assert!(find_first_breadth_first(defs[0], "while_statement").is_none());
    }

    #[test]
    fn test_find_first_ancestor() {
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(SOURCE).unwrap();
        let call = find_all(tree.root_node(), "call_expression")[0];

        let def = find_first_ancestor(call, "function_definition").unwrap();
        assert!(node_text(def, SOURCE).starts_with("int main"));

        // Strict ancestor: a node is not its own ancestor
        assert!(find_first_ancestor(def, "function_definition").is_none());
    }

    #[test]
    fn test_node_text_tolerates_invalid_utf8() {
        let source: &[u8] = b"int f(void) { return '\xff'; }";
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(source).unwrap();
        let text = node_text(tree.root_node(), source);
        assert!(text.starts_with("int f(void)"));
    }
}
