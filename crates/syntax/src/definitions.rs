//! Names of C/C++ definitions as they appear in the source.
//!
//! These helpers decide which spelling a definition is keyed under. The
//! source index and the summary builder both go through them, so a name
//! listed in a summary always resolves against the index.

use crate::extractor::{find_all, find_first_breadth_first, node_text};
use tree_sitter::Node;

/// A named definition node found in a tree
#[derive(Debug, Clone, Copy)]
pub struct Definition<'t> {
    pub node: Node<'t>,
}

impl Definition<'_> {
    /// Byte range `[start, end)` of the whole definition
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        self.node.start_byte()..self.node.end_byte()
    }

    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }
}

/// Declarator spellings that already carry their scope
const QUALIFIED_DECLARATORS: &[&str] = &["qualified_identifier", "scoped_identifier"];

/// Declarator spellings that take the owner prefix inside a class body
const MEMBER_DECLARATORS: &[&str] = &[
    "identifier",
    "field_identifier",
    "destructor_name",
    "operator_name",
];

/// Record-like specifiers whose name is the owner of an in-class member
const CLASS_KINDS: &[&str] = &["class_specifier", "struct_specifier"];

/// Name of a `function_definition` node.
///
/// Members defined inside a class body, constructors, destructors and
/// operators included, are keyed as `Class::member`.
pub fn function_name(definition: Node<'_>, source: &[u8]) -> Option<String> {
    let declarator = find_first_breadth_first(definition, "function_declarator")?;
    let name_node = declarator.child_by_field_name("declarator")?;
    let kind = name_node.kind();

    if QUALIFIED_DECLARATORS.contains(&kind) {
        return Some(node_text(name_node, source).into_owned());
    }

    if MEMBER_DECLARATORS.contains(&kind) {
        let member = node_text(name_node, source).into_owned();
        let owner = enclosing_class(name_node).and_then(|class_node| record_name(class_node, source));

        return Some(match owner {
            Some(class_name) => format!("{class_name}::{member}"),
            None => member,
        });
    }

    None
}

/// Name of a `preproc_def` or `preproc_function_def` node
pub fn macro_name(definition: Node<'_>, source: &[u8]) -> Option<String> {
    definition
        .child_by_field_name("name")
        .map(|name| node_text(name, source).into_owned())
}

/// Name of a struct/union/class/enum with a body, or of a typedef alias.
///
/// Forward declarations (`struct foo;`) have no body and are not
/// definitions.
pub fn type_name(definition: Node<'_>, source: &[u8]) -> Option<String> {
    match definition.kind() {
        "type_definition" => {
            let declarator = definition.child_by_field_name("declarator")?;
            (declarator.kind() == "type_identifier")
                .then(|| node_text(declarator, source).into_owned())
        }
        "struct_specifier" | "union_specifier" | "class_specifier" => {
            let body = definition.child_by_field_name("body")?;
            if body.kind() != "field_declaration_list" {
                return None;
            }
            record_name(definition, source)
        }
        "enum_specifier" => {
            let body = definition.child_by_field_name("body")?;
            if body.kind() != "enumerator_list" {
                return None;
            }
            record_name(definition, source)
        }
        _ => None,
    }
}

/// Name of the function targeted by a `call_expression`
pub fn callee_name(call: Node<'_>, source: &[u8]) -> Option<String> {
    let Some(function) = call.child_by_field_name("function") else {
        return find_first_breadth_first(call, "identifier")
            .map(|ident| node_text(ident, source).into_owned());
    };

    match function.kind() {
        "identifier" | "qualified_identifier" => Some(node_text(function, source).into_owned()),
        "field_expression" => function
            .child_by_field_name("field")
            .map(|field| node_text(field, source).into_owned()),
        _ => find_first_breadth_first(function, "identifier")
            .map(|ident| node_text(ident, source).into_owned()),
    }
}

/// Function definitions and function-like macros, in source order,
/// paired with their key.
pub fn functions<'t>(root: Node<'t>, source: &[u8]) -> Vec<(String, Definition<'t>)> {
    let mut found: Vec<(String, Definition<'t>)> = find_all(root, "function_definition")
        .into_iter()
        .filter_map(|node| function_name(node, source).map(|name| (name, Definition { node })))
        .collect();

    found.extend(
        find_all(root, "preproc_function_def")
            .into_iter()
            .filter_map(|node| macro_name(node, source).map(|name| (name, Definition { node }))),
    );

    found
}

/// Object-like macro definitions
pub fn defines<'t>(root: Node<'t>, source: &[u8]) -> Vec<(String, Definition<'t>)> {
    find_all(root, "preproc_def")
        .into_iter()
        .filter_map(|node| macro_name(node, source).map(|name| (name, Definition { node })))
        .collect()
}

/// Type definitions: typedef aliases first, then record/enum specifiers
pub fn types<'t>(root: Node<'t>, source: &[u8]) -> Vec<(String, Definition<'t>)> {
    ["type_definition", "struct_specifier", "union_specifier", "class_specifier", "enum_specifier"]
        .iter()
        .flat_map(|kind| find_all(root, kind))
        .filter_map(|node| type_name(node, source).map(|name| (name, Definition { node })))
        .collect()
}

/// Callee names of every call expression under `node`
pub fn calls(node: Node<'_>, source: &[u8]) -> Vec<String> {
    find_all(node, "call_expression")
        .into_iter()
        .filter_map(|call| callee_name(call, source))
        .filter(|name| !name.is_empty())
        .collect()
}

fn enclosing_class(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if CLASS_KINDS.contains(&parent.kind()) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

fn record_name(record: Node<'_>, source: &[u8]) -> Option<String> {
    record
        .child_by_field_name("name")
        .map(|name| node_text(name, source).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dialect, SyntaxExtractor};
    use pretty_assertions::assert_eq;

    fn names(defs: &[(String, Definition<'_>)]) -> Vec<String> {
        defs.iter().map(|(name, _)| name.clone()).collect()
    }

    #[test]
    fn test_c_functions_and_macros() {
        let source = br#"
#define MAX_LEN 64
#define SQUARE(x) ((x) * (x))

static int *lookup(int key) { return 0; }

int main(void) { return SQUARE(2); }
"#;
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(source).unwrap();
        let root = tree.root_node();

        assert_eq!(names(&functions(root, source)), vec!["lookup", "main", "SQUARE"]);
        assert_eq!(names(&defines(root, source)), vec!["MAX_LEN"]);
    }

    #[test]
    fn test_c_types() {
        let source = br#"
struct fwd;
struct point { int x; int y; };
typedef struct point point_t;
typedef struct { int id; } anon_t;
enum color { RED, GREEN };
union value { int i; float f; };
"#;
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(source).unwrap();

        let mut found = names(&types(tree.root_node(), source));
        found.sort();
        assert_eq!(found, vec!["anon_t", "color", "point", "point_t", "value"]);
    }

    #[test]
    fn test_cpp_member_functions_are_qualified() {
        let source = br#"
class Session {
public:
    void open() { connect(); }
};

void Session::close() { this->flush(); }
"#;
        let mut extractor = SyntaxExtractor::new(Dialect::Cpp).unwrap();
        let tree = extractor.parse(source).unwrap();

        assert_eq!(
            names(&functions(tree.root_node(), source)),
            vec!["Session::open", "Session::close"]
        );
    }

    #[test]
    fn test_cpp_special_members_are_qualified() {
        let source = br#"
class Session {
public:
    Session() { reset(); }
    ~Session() { close(); }
    bool operator==(const Session &other) const { return id == other.id; }
    void open() { connect(); }
};

Session::Session(int fd) { attach(fd); }
"#;
        let mut extractor = SyntaxExtractor::new(Dialect::Cpp).unwrap();
        let tree = extractor.parse(source).unwrap();
        let root = tree.root_node();

        assert_eq!(
            names(&functions(root, source)),
            vec![
                "Session::Session",
                "Session::~Session",
                "Session::operator==",
                "Session::open",
                "Session::Session",
            ]
        );
        assert_eq!(names(&types(root, source)), vec!["Session"]);
    }

    #[test]
    fn test_callee_names() {
        let source = br#"
void run(struct ctx *c) {
    start(c);
    c->ops->stop(c);
}
"#;
        let mut extractor = SyntaxExtractor::new(Dialect::C).unwrap();
        let tree = extractor.parse(source).unwrap();

        assert_eq!(calls(tree.root_node(), source), vec!["start", "stop"]);
    }
}
