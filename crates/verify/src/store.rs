//! Durable list of findings, rewritten in full after every change.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Verification record of one specification chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "RFC chunk ID")]
    pub chunk: String,

    /// Source text the session started from
    #[serde(rename = "original context")]
    pub original_context: String,

    /// Every tool response seen during the session
    #[serde(rename = "additional context")]
    pub additional_context: String,

    #[serde(rename = "inconsistency summary")]
    pub inconsistency_summary: String,

    #[serde(rename = "proposed fix")]
    pub proposed_fix: String,
}

impl Finding {
    pub fn new(chunk: impl Into<String>, original_context: impl Into<String>) -> Self {
        Self {
            chunk: chunk.into(),
            original_context: original_context.into(),
            ..Self::default()
        }
    }

    pub fn has_verdict(&self) -> bool {
        !self.inconsistency_summary.is_empty() || !self.proposed_fix.is_empty()
    }
}

pub struct FindingStore {
    path: PathBuf,
    findings: Vec<Finding>,
}

impl FindingStore {
    /// `inconsistencies_<protocol>.json`
    pub fn file_name(protocol: &str) -> String {
        format!("inconsistencies_{protocol}.json")
    }

    /// Start an empty store at `path`, replacing whatever was there
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            findings: Vec::new(),
        };
        store.persist()?;
        Ok(store)
    }

    /// Load the findings at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let findings = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, findings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn last(&self) -> Option<&Finding> {
        self.findings.last()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Append a finding for a chunk entering verification
    pub fn begin(&mut self, chunk: &str, original_context: &str) -> Result<()> {
        self.findings.push(Finding::new(chunk, original_context));
        self.persist()
    }

    /// Add a tool response to the latest finding
    pub fn append_context(&mut self, text: &str) -> Result<()> {
        let Some(finding) = self.findings.last_mut() else {
            log::warn!("No finding to attach context to");
            return Ok(());
        };
        finding.additional_context.push_str(text);
        finding.additional_context.push_str("\n\n");
        self.persist()
    }

    /// Write the verdict into the latest finding. Returns `false` when the
    /// store holds no finding.
    pub fn record_verdict(&mut self, summary: &str, fix: &str) -> Result<bool> {
        let Some(finding) = self.findings.last_mut() else {
            log::warn!("No finding to record a verdict in");
            return Ok(false);
        };
        finding.inconsistency_summary = summary.to_string();
        finding.proposed_fix = fix.to_string();
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.findings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
