//! Offline pass that produces a summary tree for a source directory.

use crate::error::Result;
use crate::summary::{DirectorySummary, FileSummary, FunctionDescriptor, SummaryNode};
use specaudit_oracle::Oracle;
use specaudit_syntax::{definitions, Dialect, SyntaxExtractor};
use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Function text and location, extracted before any oracle call
struct ExtractedFunction {
    name: String,
    start_byte: usize,
    end_byte: usize,
    code: String,
}

/// Summarizes a directory bottom-up: functions, then files, then folders.
pub struct SummaryBuilder<'o> {
    oracle: &'o dyn Oracle,
    header_dialect: Dialect,
}

impl<'o> SummaryBuilder<'o> {
    pub fn new(oracle: &'o dyn Oracle, header_dialect: Dialect) -> Self {
        Self {
            oracle,
            header_dialect,
        }
    }

    pub async fn build(&self, dir: impl AsRef<Path>) -> Result<SummaryNode> {
        let dir = dir.as_ref();
        log::info!("Summarizing {}", dir.display());
        let root = self.summarize_directory(dir).await?;
        Ok(SummaryNode::Directory(root))
    }

    fn summarize_directory<'a>(&'a self, dir: &'a Path) -> BoxFuture<'a, Result<DirectorySummary>> {
        Box::pin(async move {
            let mut entries = fs::read_dir(dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.sort();

            let mut files = BTreeMap::new();
            let mut item_summaries = Vec::new();

            for path in entries {
                let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                    continue;
                };

                if path.is_dir() {
                    if name.starts_with('.') {
                        continue;
                    }
                    log::debug!("Entering {}", path.display());
                    let sub = self.summarize_directory(&path).await?;
                    item_summaries.push(format!("{}/: {}", name, sub.summary));
                    files.insert(name, SummaryNode::Directory(sub));
                } else if let Some(dialect) = Dialect::from_path(&path, self.header_dialect) {
                    let Some(file) = self.summarize_file(&path, dialect).await? else {
                        continue;
                    };
                    item_summaries.push(format!("{}: {}", name, file.summary));
                    files.insert(name, SummaryNode::File(file));
                }
            }

            let folder = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string());
            let prompt = format!(
                "Here are the summaries of the items in the folder \"{folder}\":\n\n{items}\n\n\
Write a 1-2 sentence summary of this folder's purpose based on its contents.",
                items = item_summaries
                    .iter()
                    .map(|s| format!("- {s}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
            let summary = self.oracle.complete(&prompt).await?.trim().to_string();

            Ok(DirectorySummary { summary, files })
        })
    }

    /// `None` when the file defines no functions
    async fn summarize_file(&self, path: &Path, dialect: Dialect) -> Result<Option<FileSummary>> {
        log::debug!("Processing {}", path.display());
        let source = fs::read(path)?;
        let extracted = extract_functions(&source, dialect)?;
        if extracted.is_empty() {
            return Ok(None);
        }

        let mut functions = BTreeMap::new();
        for function in extracted {
            let prompt = format!(
                "Analyze the following {} function and answer with a one-sentence summary \
of what it does.\n\n```{}\n{}\n```",
                dialect_label(dialect),
                dialect.as_str(),
                function.code,
            );
            let summary = self.oracle.complete(&prompt).await?.trim().to_string();
            functions.insert(
                function.name,
                FunctionDescriptor {
                    start_byte: function.start_byte,
                    end_byte: function.end_byte,
                    summary,
                },
            );
        }

        let listing = functions
            .iter()
            .map(|(name, f)| format!("- {}: {}", name, f.summary))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Here is a list of functions and what they do:\n\n{listing}\n\n\
Write a paragraph summary of this file based on the above functions."
        );
        let summary = self.oracle.complete(&prompt).await?.trim().to_string();

        Ok(Some(FileSummary { summary, functions }))
    }
}

fn dialect_label(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::C => "C",
        Dialect::Cpp => "C++",
    }
}

/// Function definitions and function-like macros with their byte ranges
fn extract_functions(source: &[u8], dialect: Dialect) -> Result<Vec<ExtractedFunction>> {
    let mut extractor = SyntaxExtractor::new(dialect)?;
    let tree = extractor.parse(source)?;

    Ok(definitions::functions(tree.root_node(), source)
        .into_iter()
        .map(|(name, definition)| {
            let range = definition.byte_range();
            ExtractedFunction {
                name,
                code: String::from_utf8_lossy(&source[range.clone()]).into_owned(),
                start_byte: range.start,
                end_byte: range.end,
            }
        })
        .collect())
}
