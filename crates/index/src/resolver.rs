use crate::index::{IndexedFile, SourceIndex};
use crate::tables::{FileTables, SymbolTable};
use std::collections::BTreeSet;

/// Soft locality hint: files whose path contains this substring are
/// searched before all others.
///
/// Matching is a raw substring test, so `lib` also prefers `liblib/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencePath(String);

impl PreferencePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn matches(&self, file_path: &str) -> bool {
        file_path.contains(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PreferencePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for PreferencePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

/// Point queries against a [`SourceIndex`].
///
/// An absent symbol is a normal answer (`None` / empty string), never an
/// error.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a SourceIndex,
    prefer: &'a PreferencePath,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a SourceIndex, prefer: &'a PreferencePath) -> Self {
        Self { index, prefer }
    }

    /// Source text of a function or function-like macro
    pub fn resolve_function(&self, name: &str) -> Option<String> {
        self.lookup(name, |tables| &tables.functions)
    }

    /// Source text of a struct/union/class/enum/typedef definition
    pub fn resolve_type(&self, name: &str) -> Option<String> {
        self.lookup(name, |tables| &tables.types)
    }

    /// Source text of an object-like macro
    pub fn resolve_define(&self, name: &str) -> Option<String> {
        self.lookup(name, |tables| &tables.defines)
    }

    /// Names of every function that calls `name`.
    ///
    /// Preferred files are consulted first; only when they yield no caller
    /// at all is the rest of the project used instead.
    pub fn caller_names(&self, name: &str) -> BTreeSet<String> {
        let collect = |preferred: bool| -> BTreeSet<String> {
            self.pass(preferred)
                .filter_map(|file| file.tables.calls.get(name))
                .flat_map(|callers| callers.iter().cloned())
                .collect()
        };

        let callers = collect(true);
        if callers.is_empty() {
            collect(false)
        } else {
            callers
        }
    }

    /// Concatenated source text of every caller of `name`, one definition
    /// per line block. Empty when nothing calls it.
    pub fn resolve_caller(&self, name: &str) -> String {
        let mut code = String::new();
        for caller in self.caller_names(name) {
            match self.resolve_function(&caller) {
                Some(text) => {
                    code.push_str(text.trim());
                    code.push('\n');
                }
                None => log::debug!("Caller {caller} of {name} has no definition"),
            }
        }
        code
    }

    /// Unified lookup: function, then type (accepting a `struct ` prefix),
    /// then define.
    pub fn query_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if let Some(text) = self.resolve_function(name) {
            return Some(text);
        }

        let type_name = name.strip_prefix("struct ").map_or(name, str::trim);
        if let Some(text) = self.resolve_type(type_name) {
            return Some(text);
        }

        self.resolve_define(name)
    }

    fn lookup<F>(&self, name: &str, table: F) -> Option<String>
    where
        F: Fn(&FileTables) -> &SymbolTable,
    {
        [true, false].into_iter().find_map(|preferred| {
            self.pass(preferred).find_map(|file| {
                table(&file.tables)
                    .get(name)
                    .map(|span| file.text(span))
            })
        })
    }

    /// Files of one resolution pass, in index order
    fn pass(&self, preferred: bool) -> impl Iterator<Item = &'a IndexedFile> + '_ {
        self.index
            .files()
            .iter()
            .filter(move |file| self.prefer.matches(&file.display_path) == preferred)
    }
}
