//! Oracle-guided descent through a summary tree.

use crate::error::Result;
use crate::summary::{DirectorySummary, FileSummary, SummaryNode};
use specaudit_oracle::{Oracle, OracleReply, TERMINATE};
use std::path::{Path, PathBuf};

/// A file reached by the descent, with its function descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMatch<'t> {
    pub path: PathBuf,
    pub file: &'t FileSummary,
}

/// Narrow a specification chunk down to the files that likely implement it.
///
/// At every directory the oracle sees the one-line summaries of the direct
/// children and names the relevant ones. All named directories are
/// explored and all named files are emitted, so matches may come from
/// unrelated subtrees and may repeat. Replies that are not a bracketed list
/// select nothing; names that are not children are skipped.
///
/// `root_path` is the on-disk directory the tree mirrors; match paths are
/// built by joining child names onto it.
pub async fn explore<'t>(
    oracle: &dyn Oracle,
    chunk: &str,
    root: &'t SummaryNode,
    root_path: &Path,
) -> Result<Vec<CandidateMatch<'t>>> {
    let mut matches = Vec::new();

    let root_dir = match root {
        SummaryNode::File(file) => {
            matches.push(CandidateMatch {
                path: root_path.to_path_buf(),
                file,
            });
            return Ok(matches);
        }
        SummaryNode::Directory(dir) => dir,
    };

    let mut pending: Vec<(PathBuf, &'t DirectorySummary)> = vec![(root_path.to_path_buf(), root_dir)];

    while let Some((path, dir)) = pending.pop() {
        if dir.files.is_empty() {
            log::debug!("Nothing to explore under {}", path.display());
            continue;
        }

        let prompt = selection_prompt(chunk, &path, dir);
        let reply = oracle.complete(&prompt).await?;

        let names = match OracleReply::parse(&reply, true) {
            OracleReply::Selection(names) => names,
            OracleReply::Empty => {
                log::debug!("No entries selected under {}", path.display());
                continue;
            }
            OracleReply::Malformed(raw) => {
                log::warn!(
                    "No bracketed list in reply for {}; treating as no match: {}",
                    path.display(),
                    raw.trim()
                );
                continue;
            }
        };
        log::debug!("Selected under {}: {:?}", path.display(), names);

        // Reversed so that the first named directory is explored first
        for name in names.iter().rev() {
            let Some(child) = dir.files.get(name) else {
                log::warn!("'{}' not found under {}", name, path.display());
                continue;
            };

            let child_path = path.join(name);
            match child {
                SummaryNode::Directory(sub) => pending.push((child_path, sub)),
                SummaryNode::File(file) => matches.push(CandidateMatch {
                    path: child_path,
                    file,
                }),
            }
        }
    }

    Ok(matches)
}

/// One line per child: `- name: summary`, directories marked with `/`
pub fn render_listing(dir: &DirectorySummary) -> String {
    dir.files
        .iter()
        .map(|(name, child)| {
            let marker = if child.is_leaf() { "" } else { "/" };
            format!("- {}{}: {}", name, marker, child.summary().trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn selection_prompt(chunk: &str, path: &Path, dir: &DirectorySummary) -> String {
    format!(
        "You are exploring a code base one directory level at a time, looking for \
the code that implements a section of a specification document.\n\n\
Section:\n{chunk}\n\n\
Entries in the current directory ({path}):\n{listing}\n\n\
Which entries are most relevant to this section? Answer with the file or folder \
names in square brackets, each quoted, e.g. [\"file1.c\", \"subdir\"]. \
Say {TERMINATE} if nothing matches.",
        path = path.display(),
        listing = render_listing(dir),
    )
}
