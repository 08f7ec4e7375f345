use ignore::WalkBuilder;
use specaudit_syntax::Dialect;
use std::path::{Path, PathBuf};

/// Options controlling which files are considered part of the project
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Dialect used for `.h` headers
    pub header_dialect: Dialect,

    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,

    /// Honour `.gitignore` / `.git/info/exclude`
    pub respect_gitignore: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            header_dialect: Dialect::C,
            skip_hidden: true,
            respect_gitignore: false,
        }
    }
}

/// A source file selected for indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub dialect: Dialect,
}

/// Scanner for finding C/C++ sources and headers in a project
pub struct FileScanner {
    root: PathBuf,
    options: ScanOptions,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Scan the project tree. Entries are visited in file-name order so the
    /// result is identical across runs over the same tree.
    pub fn scan(&self) -> Vec<SourceFile> {
        let mut files = Vec::new();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(self.options.skip_hidden)
            .parents(false)
            .ignore(false)
            .git_ignore(self.options.respect_gitignore)
            .git_global(self.options.respect_gitignore)
            .git_exclude(self.options.respect_gitignore)
            .sort_by_file_name(|a, b| a.cmp(b));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    let Some(dialect) = Dialect::from_path(path, self.options.header_dialect) else {
                        continue;
                    };

                    files.push(SourceFile {
                        path: path.to_path_buf(),
                        dialect,
                    });
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::info!("Found {} source files under {}", files.len(), self.root.display());
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn relative(root: &Path, files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn scans_only_c_family_files_in_name_order() {
        let temp = tempdir().unwrap();
        let lib = temp.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("b.c"), b"int b;").unwrap();
        fs::write(lib.join("a.h"), b"int a;").unwrap();
        fs::write(temp.path().join("main.cpp"), b"int main() {}").unwrap();
        fs::write(temp.path().join("README.md"), b"# readme").unwrap();

        let files = FileScanner::new(temp.path(), ScanOptions::default()).scan();

        assert_eq!(relative(temp.path(), &files), vec!["lib/a.h", "lib/b.c", "main.cpp"]);
        assert_eq!(files[0].dialect, Dialect::C);
        assert_eq!(files[2].dialect, Dialect::Cpp);
    }

    #[test]
    fn skips_hidden_directories_by_default() {
        let temp = tempdir().unwrap();
        let hidden = temp.path().join(".cache");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("gen.c"), b"int x;").unwrap();
        fs::write(temp.path().join("real.c"), b"int y;").unwrap();

        let files = FileScanner::new(temp.path(), ScanOptions::default()).scan();
        assert_eq!(relative(temp.path(), &files), vec!["real.c"]);

        let options = ScanOptions {
            skip_hidden: false,
            ..ScanOptions::default()
        };
        let files = FileScanner::new(temp.path(), options).scan();
        assert_eq!(relative(temp.path(), &files), vec![".cache/gen.c", "real.c"]);
    }

    #[test]
    fn headers_follow_configured_dialect() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("api.h"), b"class A {};").unwrap();

        let options = ScanOptions {
            header_dialect: Dialect::Cpp,
            ..ScanOptions::default()
        };
        let files = FileScanner::new(temp.path(), options).scan();
        assert_eq!(files[0].dialect, Dialect::Cpp);
    }
}
