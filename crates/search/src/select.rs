//! Oracle-based ranking of candidate functions and source extraction.

use crate::explore::CandidateMatch;
use specaudit_oracle::{Oracle, OracleReply};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_SELECTION_RETRIES: usize = 3;

/// Where a candidate function lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionLocation {
    pub path: PathBuf,
    pub start_byte: usize,
    pub end_byte: usize,
}

/// Flat view over every function of a chunk's candidate files
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    listing: String,
    locations: HashMap<String, FunctionLocation>,
}

impl FunctionCatalog {
    /// Collect descriptors in match order. A name seen again in a later
    /// match replaces the earlier location.
    pub fn from_matches(matches: &[CandidateMatch<'_>]) -> Self {
        let mut catalog = Self::default();

        for candidate in matches {
            for (name, descriptor) in &candidate.file.functions {
                catalog
                    .listing
                    .push_str(&format!("- {}: {}\n", name, descriptor.summary.trim()));
                catalog.locations.insert(
                    name.clone(),
                    FunctionLocation {
                        path: candidate.path.clone(),
                        start_byte: descriptor.start_byte,
                        end_byte: descriptor.end_byte,
                    },
                );
            }
        }

        catalog
    }

    /// `- name: summary` lines shown to the oracle
    pub fn listing(&self) -> &str {
        &self.listing
    }

    pub fn location(&self, name: &str) -> Option<&FunctionLocation> {
        self.locations.get(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Ask the oracle which catalogued functions implement the chunk.
///
/// Oracle failures and replies without a bracketed list are retried up to
/// `retries` times. `None` means every attempt failed; an empty selection
/// is a valid answer.
pub async fn select_functions(
    oracle: &dyn Oracle,
    chunk: &str,
    catalog: &FunctionCatalog,
    retries: usize,
) -> Option<Vec<String>> {
    if catalog.is_empty() {
        log::debug!("No candidate functions to rank");
        return Some(Vec::new());
    }

    let prompt = ranking_prompt(chunk, catalog);
    for attempt in 1..=retries {
        let reply = match oracle.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Function selection attempt {attempt}/{retries} failed: {e}");
                continue;
            }
        };

        match OracleReply::parse(&reply, false) {
            OracleReply::Malformed(_) => {
                log::warn!(
                    "Function selection attempt {attempt}/{retries}: reply has no bracketed list"
                );
            }
            parsed => {
                let selected = parsed.into_names();
                log::info!("Selected functions: {:?}", selected);
                return Some(selected);
            }
        }
    }

    None
}

fn ranking_prompt(chunk: &str, catalog: &FunctionCatalog) -> String {
    format!(
        "Below are a section of a technical document and a list of functions, each with \
a short summary of what it does.\n\
Identify the functions most likely to implement the behavior the section describes.\n\n\
--- Document Section ---\n{chunk}\n\n\
--- Functions ---\n{listing}\n\
Answer with the function names in square brackets, each quoted, \
e.g. [\"func1\", \"func2\", \"Class::method\"].",
        listing = catalog.listing(),
    )
}

/// File bytes read at most once per path
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<PathBuf, Arc<[u8]>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&mut self, path: &Path) -> std::io::Result<Arc<[u8]>> {
        if let Some(bytes) = self.files.get(path) {
            return Ok(Arc::clone(bytes));
        }
        let bytes: Arc<[u8]> = fs::read(path)?.into();
        self.files.insert(path.to_path_buf(), Arc::clone(&bytes));
        Ok(bytes)
    }

    /// Source text of `[start, end)` in `path`; `None` when the file cannot
    /// be read or the range does not fit it
    pub fn slice(&mut self, location: &FunctionLocation) -> Option<String> {
        let bytes = match self.bytes(&location.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to read {}: {}", location.path.display(), e);
                return None;
            }
        };

        let range = location.start_byte..location.end_byte;
        match bytes.get(range) {
            Some(slice) => Some(String::from_utf8_lossy(slice).into_owned()),
            None => {
                log::warn!(
                    "Byte range {}..{} is outside {} ({} bytes)",
                    location.start_byte,
                    location.end_byte,
                    location.path.display(),
                    bytes.len()
                );
                None
            }
        }
    }
}

/// Concatenate the trimmed source of every selected function, one per
/// line, in selection order. Names with no recorded location are skipped.
pub fn extract_code(catalog: &FunctionCatalog, selected: &[String], cache: &mut SourceCache) -> String {
    let mut code = String::new();

    for name in selected {
        let Some(location) = catalog.location(name) else {
            log::warn!("Function {name} not found in candidate descriptors");
            continue;
        };
        if let Some(text) = cache.slice(location) {
            code.push_str(text.trim());
            code.push('\n');
        }
    }

    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{FileSummary, FunctionDescriptor};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn file(functions: &[(&str, usize, usize)]) -> FileSummary {
        FileSummary {
            summary: String::new(),
            functions: functions
                .iter()
                .map(|(name, start, end)| {
                    (
                        name.to_string(),
                        FunctionDescriptor {
                            start_byte: *start,
                            end_byte: *end,
                            summary: format!("does {name}"),
                        },
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn later_descriptor_wins() {
        let first = file(&[("init", 0, 4), ("run", 5, 9)]);
        let second = file(&[("init", 10, 20)]);
        let matches = vec![
            CandidateMatch {
                path: PathBuf::from("a.c"),
                file: &first,
            },
            CandidateMatch {
                path: PathBuf::from("b.c"),
                file: &second,
            },
        ];

        let catalog = FunctionCatalog::from_matches(&matches);
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.location("init"),
            Some(&FunctionLocation {
                path: PathBuf::from("b.c"),
                start_byte: 10,
                end_byte: 20,
            })
        );
        assert_eq!(
            catalog.listing(),
            "- init: does init\n- run: does run\n- init: does init\n"
        );
    }

    #[test]
    fn extracts_selected_ranges_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.c");
        let source = "int a(void) { return 1; }\n  int b(void) { return 2; }  \n";
        fs::write(&path, source).unwrap();

        let b_start = source.find("int b").unwrap();
        let b_end = source.rfind('}').unwrap() + 1;
        let entries = file(&[("a", 0, 25), ("b", b_start, b_end), ("huge", 0, 10_000)]);
        let matches = vec![CandidateMatch {
            path: path.clone(),
            file: &entries,
        }];
        let catalog = FunctionCatalog::from_matches(&matches);

        let mut cache = SourceCache::new();
        let selected = vec!["b".to_string(), "ghost".to_string(), "huge".to_string(), "a".to_string()];
        let code = extract_code(&catalog, &selected, &mut cache);

        assert_eq!(code, "int b(void) { return 2; }\nint a(void) { return 1; }\n");
    }
}
