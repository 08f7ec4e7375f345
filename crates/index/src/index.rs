use crate::error::{IndexError, Result};
use crate::scanner::{FileScanner, ScanOptions, SourceFile};
use crate::stats::IndexStats;
use crate::tables::{FileTables, NodeSpan};
use specaudit_syntax::{Dialect, SyntaxExtractor};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// One indexed file: its bytes and the tables extracted from them
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub path: PathBuf,

    /// Path as a string, used for preference matching
    pub display_path: String,

    pub tables: FileTables,

    source: Arc<[u8]>,
}

impl IndexedFile {
    /// Source text covered by a span of this file
    pub fn text(&self, span: &NodeSpan) -> String {
        let end = span.end_byte.min(self.source.len());
        let start = span.start_byte.min(end);
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }
}

/// Whole-project source index: per-file tables in scan order.
///
/// Read-only once built. Rebuilding replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    files: Vec<IndexedFile>,
    stats: IndexStats,
}

impl SourceIndex {
    /// Index every C/C++ file under `root` with default scan options
    pub fn build(root: impl AsRef<Path>) -> Result<Self> {
        IndexBuilder::new(ScanOptions::default()).build(root)
    }

    /// Files in scan order
    pub fn files(&self) -> &[IndexedFile] {
        &self.files
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&IndexedFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Builds a [`SourceIndex`] from a project tree or an explicit file list
pub struct IndexBuilder {
    options: ScanOptions,
}

impl IndexBuilder {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn build(&self, root: impl AsRef<Path>) -> Result<SourceIndex> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(IndexError::InvalidPath(root.display().to_string()));
        }

        let files = FileScanner::new(root, self.options.clone()).scan();
        self.build_from_files(files)
    }

    /// Index the given files in order. A file that cannot be read or parsed
    /// is logged and skipped; the rest of the project is still indexed.
    pub fn build_from_files(&self, files: Vec<SourceFile>) -> Result<SourceIndex> {
        let started = Instant::now();
        let mut extractors: HashMap<Dialect, SyntaxExtractor> = HashMap::new();
        let mut stats = IndexStats::new();
        let mut indexed = Vec::with_capacity(files.len());

        for file in files {
            let extractor = match extractors.entry(file.dialect) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(SyntaxExtractor::new(file.dialect)?),
            };

            match index_file(extractor, &file) {
                Ok(entry) => {
                    stats.add_file(&entry.tables);
                    indexed.push(entry);
                }
                Err(e) => {
                    log::warn!("Skipping {}: {e}", file.path.display());
                    stats.add_error(format!("{}: {e}", file.path.display()));
                }
            }
        }

        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} files ({} skipped): {} functions, {} types, {} defines, {} call edges in {} ms",
            stats.files,
            stats.skipped,
            stats.functions,
            stats.types,
            stats.defines,
            stats.call_edges,
            stats.time_ms
        );

        Ok(SourceIndex {
            files: indexed,
            stats,
        })
    }
}

fn index_file(extractor: &mut SyntaxExtractor, file: &SourceFile) -> Result<IndexedFile> {
    let bytes = std::fs::read(&file.path)?;
    let tree = extractor.parse(&bytes)?;
    let tables = FileTables::extract(&tree, &bytes);

    log::debug!(
        "{}: {} functions, {} types, {} defines",
        file.path.display(),
        tables.functions.len(),
        tables.types.len(),
        tables.defines.len()
    );

    Ok(IndexedFile {
        display_path: file.path.to_string_lossy().into_owned(),
        path: file.path.clone(),
        tables,
        source: Arc::from(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_skipped_not_fatal() {
        let temp = tempdir().unwrap();
        let good = temp.path().join("good.c");
        fs::write(&good, b"int ok(void) { return 0; }").unwrap();

        let files = vec![
            SourceFile {
                path: temp.path().join("vanished.c"),
                dialect: Dialect::C,
            },
            SourceFile {
                path: good.clone(),
                dialect: Dialect::C,
            },
        ];

        let index = IndexBuilder::new(ScanOptions::default())
            .build_from_files(files)
            .unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.stats().skipped, 1);
        assert!(index.file(&good).unwrap().tables.functions.contains_key("ok"));
    }

    #[test]
    fn rejects_non_directory_root() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("a.c");
        fs::write(&file, b"").unwrap();

        let err = SourceIndex::build(&file).unwrap_err();
        assert!(matches!(err, IndexError::InvalidPath(_)));
    }

    #[test]
    fn span_text_slices_original_bytes() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("m.c"), b"#define LIMIT 10\nint f(void) { return LIMIT; }\n")
            .unwrap();

        let index = SourceIndex::build(temp.path()).unwrap();
        let file = &index.files()[0];
        assert_eq!(file.text(&file.tables.defines["LIMIT"]).trim_end(), "#define LIMIT 10");
        assert_eq!(
            file.text(&file.tables.functions["f"]),
            "int f(void) { return LIMIT; }"
        );
    }
}
