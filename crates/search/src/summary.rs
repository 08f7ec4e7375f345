//! Summary tree: natural-language descriptions mirroring a source tree.
//!
//! On disk a directory is `{"summary": .., "files": {..}}` and a source file
//! is `{"summary": .., "functions": {name: {start_byte, end_byte, summary}}}`.
//! Any node without a `files` map is a file (leaf).

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SummaryNode {
    Directory(DirectorySummary),
    File(FileSummary),
}

/// On-disk shape of either node kind; a `files` key makes it a directory
#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    summary: String,
    files: Option<BTreeMap<String, SummaryNode>>,
    #[serde(default)]
    functions: BTreeMap<String, FunctionDescriptor>,
}

impl From<RawNode> for SummaryNode {
    fn from(raw: RawNode) -> Self {
        match raw.files {
            Some(files) => SummaryNode::Directory(DirectorySummary {
                summary: raw.summary,
                files,
            }),
            None => SummaryNode::File(FileSummary {
                summary: raw.summary,
                functions: raw.functions,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for SummaryNode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawNode::deserialize(deserializer).map(SummaryNode::from)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    #[serde(default)]
    pub summary: String,
    pub files: BTreeMap<String, SummaryNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDescriptor>,
}

/// Location and one-line description of a function inside its file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub start_byte: usize,
    pub end_byte: usize,
    #[serde(default)]
    pub summary: String,
}

impl SummaryNode {
    pub fn summary(&self) -> &str {
        match self {
            SummaryNode::Directory(dir) => &dir.summary,
            SummaryNode::File(file) => &file.summary,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, SummaryNode::File(_))
    }

    /// Direct children; `None` for a file
    pub fn children(&self) -> Option<&BTreeMap<String, SummaryNode>> {
        match self {
            SummaryNode::Directory(dir) => Some(&dir.files),
            SummaryNode::File(_) => None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Pretty JSON, written to a sibling temp file then renamed into place
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Number of file (leaf) nodes below this one, counting itself
    pub fn file_count(&self) -> usize {
        match self {
            SummaryNode::File(_) => 1,
            SummaryNode::Directory(dir) => dir.files.values().map(SummaryNode::file_count).sum(),
        }
    }
}
