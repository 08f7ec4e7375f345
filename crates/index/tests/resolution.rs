use pretty_assertions::assert_eq;
use specaudit_index::{PreferencePath, Resolver, SourceIndex};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn two_file_project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    write(
        temp.path(),
        "x.c",
        "int foo(void) {\n    return bar() + 1;\n}\n",
    );
    write(temp.path(), "y.c", "int bar(void) {\n    return 41;\n}\n");
    temp
}

#[test]
fn end_to_end_two_file_project() {
    let temp = two_file_project();
    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::default();
    let resolver = Resolver::new(&index, &prefer);

    let foo = "int foo(void) {\n    return bar() + 1;\n}";
    assert_eq!(resolver.resolve_caller("bar"), format!("{foo}\n"));
    assert_eq!(resolver.query_name("foo").as_deref(), Some(foo));
    assert_eq!(resolver.query_name("Baz"), None);
}

#[test]
fn resolve_function_iff_defined_somewhere() {
    let temp = two_file_project();
    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::new("does-not-match");
    let resolver = Resolver::new(&index, &prefer);

    assert!(resolver.resolve_function("foo").is_some());
    assert!(resolver.resolve_function("bar").is_some());
    assert!(resolver.resolve_function("baz").is_none());
}

#[test]
fn resolve_caller_empty_iff_never_called() {
    let temp = two_file_project();
    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::default();
    let resolver = Resolver::new(&index, &prefer);

    assert_eq!(resolver.resolve_caller("foo"), "");
    assert!(!resolver.resolve_caller("bar").is_empty());
}

#[test]
fn preferred_path_definition_wins() {
    let temp = TempDir::new().expect("tempdir");
    // "a_core" sorts before "b_net", so without preference core would win
    write(temp.path(), "a_core/dup.c", "int shared(void) { return 1; }\n");
    write(temp.path(), "b_net/dup.c", "int shared(void) { return 2; }\n");

    let index = SourceIndex::build(temp.path()).expect("index");

    let none = PreferencePath::new("no-such-dir");
    let resolver = Resolver::new(&index, &none);
    assert_eq!(
        resolver.resolve_function("shared").as_deref(),
        Some("int shared(void) { return 1; }")
    );

    let net = PreferencePath::new("b_net");
    let resolver = Resolver::new(&index, &net);
    assert_eq!(
        resolver.resolve_function("shared").as_deref(),
        Some("int shared(void) { return 2; }")
    );
}

#[test]
fn caller_fallback_replaces_empty_preferred_pass() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "net_layer/sock.c", "void sock_send(void) { emit(); }\n");
    write(temp.path(), "core/evt.c", "void emit(void) {}\nvoid pump(void) { emit(); }\n");
    write(temp.path(), "core/tick.c", "void tick(void) { flush(); }\n");
    write(temp.path(), "net_layer/flush.c", "void flush(void) {}\n");

    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::new("net_layer");
    let resolver = Resolver::new(&index, &prefer);

    // Preferred pass has a caller of emit, so core callers are not merged in
    let callers: Vec<_> = resolver.caller_names("emit").into_iter().collect();
    assert_eq!(callers, vec!["sock_send"]);

    // Preferred pass has no caller of flush, so the fallback set is used
    let callers: Vec<_> = resolver.caller_names("flush").into_iter().collect();
    assert_eq!(callers, vec!["tick"]);
}

#[test]
fn query_name_falls_back_through_types_and_defines() {
    let temp = TempDir::new().expect("tempdir");
    write(
        temp.path(),
        "proto.h",
        "#define HDR_LEN 20\nstruct header { int len; };\ntypedef struct header header_t;\n",
    );

    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::default();
    let resolver = Resolver::new(&index, &prefer);

    assert_eq!(
        resolver.query_name("struct header").as_deref(),
        Some("struct header { int len; }")
    );
    assert_eq!(
        resolver.query_name("header_t").as_deref(),
        Some("typedef struct header header_t;")
    );
    assert_eq!(
        resolver.query_name("HDR_LEN").map(|s| s.trim_end().to_string()),
        Some("#define HDR_LEN 20".to_string())
    );
}

#[test]
fn class_name_resolves_to_the_class_not_its_constructor() {
    let temp = TempDir::new().expect("tempdir");
    write(
        temp.path(),
        "session.cpp",
        "class Session {\npublic:\n    Session() { reset(); }\n    ~Session() { close(); }\n};\n",
    );

    let index = SourceIndex::build(temp.path()).expect("index");
    let prefer = PreferencePath::default();
    let resolver = Resolver::new(&index, &prefer);

    let class = resolver.query_name("Session").expect("class definition");
    assert!(class.starts_with("class Session {"));
    assert_eq!(
        resolver.query_name("Session::Session").as_deref(),
        Some("Session() { reset(); }")
    );
    assert_eq!(
        resolver.query_name("Session::~Session").as_deref(),
        Some("~Session() { close(); }")
    );
}

#[test]
fn rebuilding_is_deterministic() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "b/impl.c", "#define N 3\nint g(void) { return h(N); }\n");
    write(temp.path(), "a/api.h", "typedef struct { int v; } val_t;\n");
    write(temp.path(), "a/h.c", "int h(int n) { return n; }\n");

    let first = SourceIndex::build(temp.path()).expect("first");
    let second = SourceIndex::build(temp.path()).expect("second");

    let snapshot = |index: &SourceIndex| {
        index
            .files()
            .iter()
            .map(|f| (f.display_path.clone(), f.tables.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(snapshot(&first), snapshot(&second));
}
