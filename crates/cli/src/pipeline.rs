//! End-to-end run: segment, index, retrieve, verify.

use crate::config::AppConfig;
use crate::document::{clean_document, segment_sections};
use anyhow::{Context, Result};
use serde::Serialize;
use specaudit_index::{IndexBuilder, PreferencePath, Resolver, ScanOptions, SourceIndex};
use specaudit_oracle::Oracle;
use specaudit_search::{
    explore, extract_code, select_functions, FunctionCatalog, SourceCache, SummaryBuilder,
    SummaryNode,
};
use specaudit_verify::{FindingStore, SessionConfig, SessionOutcome, VerificationSession};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Totals of one `run`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub chunks: usize,
    /// No functions selected, or nothing could be extracted
    pub skipped: usize,
    /// A stage failed; the chunk was abandoned
    pub failed: usize,
    pub verified: usize,
    pub confirmed: usize,
    pub time_ms: u64,
}

/// Read, clean and segment the configured specification document. The
/// cleaned text is written out when `spec_cleaned_output` is set.
pub fn load_sections(config: &AppConfig) -> Result<Vec<String>> {
    let input = config.spec_input()?;
    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read specification {}", input.display()))?;
    let cleaned = clean_document(&raw);

    if let Some(output) = &config.project.spec_cleaned_output {
        fs::write(output, &cleaned)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        log::info!("Cleaned document written to {}", output.display());
    }

    Ok(segment_sections(&cleaned))
}

pub fn build_index(config: &AppConfig) -> Result<SourceIndex> {
    let options = ScanOptions {
        header_dialect: config.header_dialect(),
        ..ScanOptions::default()
    };
    IndexBuilder::new(options)
        .build(&config.project.project_path)
        .with_context(|| {
            format!(
                "Failed to index {}",
                config.project.project_path.display()
            )
        })
}

/// Build the summary tree for `prefer_path` and save it to `summary_json`
pub async fn summarize(config: &AppConfig, oracle: &dyn Oracle) -> Result<SummaryNode> {
    let root = config.prefer_path();
    let tree = SummaryBuilder::new(oracle, config.header_dialect())
        .build(&root)
        .await
        .with_context(|| format!("Failed to summarize {root}"))?;

    tree.save(&config.project.summary_json).with_context(|| {
        format!(
            "Failed to write summary tree {}",
            config.project.summary_json.display()
        )
    })?;
    log::info!(
        "Summary tree with {} files written to {}",
        tree.file_count(),
        config.project.summary_json.display()
    );
    Ok(tree)
}

enum ChunkResult {
    Skipped,
    Verified(SessionOutcome),
}

/// Run the whole pipeline, one chunk at a time. A chunk that fails is
/// logged and counted; the next chunk proceeds.
pub async fn run(config: &AppConfig, oracle: &dyn Oracle) -> Result<RunSummary> {
    let start = Instant::now();

    let findings_path = config.findings_path();
    let mut store = FindingStore::create(&findings_path)
        .with_context(|| format!("Failed to create {}", findings_path.display()))?;

    let tree = SummaryNode::load(&config.project.summary_json).with_context(|| {
        format!(
            "Failed to load summary tree {}",
            config.project.summary_json.display()
        )
    })?;
    let sections = load_sections(config)?;
    log::info!("{} sections to verify", sections.len());

    let index = build_index(config)?;
    let prefer_root = config.prefer_path();
    let prefer = PreferencePath::new(prefer_root.clone());
    let session = VerificationSession::new(
        oracle,
        Resolver::new(&index, &prefer),
        SessionConfig {
            max_turns: config.verify.max_turns,
        },
    );

    let chunk_run = ChunkRun {
        oracle,
        tree: &tree,
        root: Path::new(&prefer_root),
        selection_retries: config.search.selection_retries,
        session: &session,
    };

    let mut cache = SourceCache::new();
    let mut summary = RunSummary::default();
    for (i, chunk) in sections.iter().enumerate() {
        summary.chunks += 1;
        log::info!(
            "Analyzing section {}/{}: {}",
            i + 1,
            sections.len(),
            chunk.lines().next().unwrap_or_default()
        );

        match chunk_run.process(chunk, &mut cache, &mut store).await {
            Ok(ChunkResult::Skipped) => summary.skipped += 1,
            Ok(ChunkResult::Verified(outcome)) => {
                summary.verified += 1;
                if outcome.is_confirmed() {
                    summary.confirmed += 1;
                }
            }
            Err(e) => {
                log::error!("Section {} failed: {e:#}", i + 1);
                summary.failed += 1;
            }
        }
    }

    summary.time_ms = start.elapsed().as_millis() as u64;
    Ok(summary)
}

struct ChunkRun<'a> {
    oracle: &'a dyn Oracle,
    tree: &'a SummaryNode,
    root: &'a Path,
    selection_retries: usize,
    session: &'a VerificationSession<'a>,
}

impl ChunkRun<'_> {
    async fn process(
        &self,
        chunk: &str,
        cache: &mut SourceCache,
        store: &mut FindingStore,
    ) -> Result<ChunkResult> {
        let matches = explore(self.oracle, chunk, self.tree, self.root)
            .await
            .context("Exploration failed")?;
        for candidate in &matches {
            log::info!("Match: {}", candidate.path.display());
        }

        let catalog = FunctionCatalog::from_matches(&matches);
        let Some(selected) =
            select_functions(self.oracle, chunk, &catalog, self.selection_retries).await
        else {
            log::warn!("No functions selected after {} attempts", self.selection_retries);
            return Ok(ChunkResult::Skipped);
        };

        let code = extract_code(&catalog, &selected, cache);
        if code.trim().is_empty() {
            log::warn!("No source extracted for this section, skipping");
            return Ok(ChunkResult::Skipped);
        }

        let report = self
            .session
            .verify(chunk, &code, store)
            .await
            .context("Verification failed")?;
        Ok(ChunkResult::Verified(report.outcome))
    }
}
