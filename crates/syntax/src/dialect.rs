use std::path::Path;

/// C-family dialect a source file is parsed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    C,
    Cpp,
}

impl Dialect {
    /// Detect dialect from a file extension.
    ///
    /// `.h` is ambiguous between C and C++, so headers take `header_dialect`.
    pub fn from_extension(ext: &str, header_dialect: Dialect) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "c" => Some(Dialect::C),
            "h" => Some(header_dialect),
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Some(Dialect::Cpp),
            _ => None,
        }
    }

    /// Detect dialect from file path
    pub fn from_path(path: impl AsRef<Path>, header_dialect: Dialect) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| Self::from_extension(ext, header_dialect))
    }

    /// Parse a dialect name as used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "c" => Some(Dialect::C),
            "cpp" | "c++" | "cxx" => Some(Dialect::Cpp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Cpp => "cpp",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Dialect::C => tree_sitter_c::LANGUAGE.into(),
            Dialect::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Dialect::from_extension("c", Dialect::C), Some(Dialect::C));
        assert_eq!(Dialect::from_extension("C", Dialect::C), Some(Dialect::C));
        assert_eq!(Dialect::from_extension("cpp", Dialect::C), Some(Dialect::Cpp));
        assert_eq!(Dialect::from_extension("hpp", Dialect::C), Some(Dialect::Cpp));
        assert_eq!(Dialect::from_extension("rs", Dialect::C), None);
    }

    #[test]
    fn test_header_follows_configured_dialect() {
        assert_eq!(Dialect::from_path("inc/a.h", Dialect::C), Some(Dialect::C));
        assert_eq!(Dialect::from_path("inc/a.h", Dialect::Cpp), Some(Dialect::Cpp));
        assert_eq!(Dialect::from_path("Makefile", Dialect::Cpp), None);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Dialect::from_name("C"), Some(Dialect::C));
        assert_eq!(Dialect::from_name("c++"), Some(Dialect::Cpp));
        assert_eq!(Dialect::from_name("rust"), None);
    }
}
