//! Frequency-ranked learnings digest over a project's captured sessions

use crate::{parse_summary, SessionDigest};
use anyhow::Context;
use michi_core::{truncate_chars, SessionRecord};
use michi_store::{atomic_write, sidecar_path, Config, Store, SUMMARY_SUFFIX};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const RECENT_WORK_CHARS: usize = 120;

/// Aggregated view of every captured session of one project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Learnings {
    pub session_count: usize,
    pub frequently_modified_files: Vec<(String, usize)>,
    pub error_patterns: Vec<(String, usize)>,
    pub recent_prompts: Vec<String>,
}

impl Learnings {
    /// Markdown digest; empty sections are left out
    pub fn render(&self, project: &str, recent_work_limit: usize) -> String {
        let mut lines = vec![format!("# Learnings: {}\n", project)];
        lines.push(format!("Sessions analyzed: {}\n", self.session_count));

        if !self.frequently_modified_files.is_empty() {
            lines.push("## Frequently Modified Files".to_string());
            for (path, count) in &self.frequently_modified_files {
                lines.push(format!("- {} ({}x)", path, count));
            }
            lines.push(String::new());
        }

        if !self.error_patterns.is_empty() {
            lines.push("## Common Errors".to_string());
            for (error, count) in &self.error_patterns {
                lines.push(format!("- [{}x] {}", count, error));
            }
            lines.push(String::new());
        }

        if !self.recent_prompts.is_empty() {
            lines.push("## Recent Work".to_string());
            let skip = self.recent_prompts.len().saturating_sub(recent_work_limit);
            for prompt in &self.recent_prompts[skip..] {
                lines.push(format!("- {}", truncate_chars(prompt, RECENT_WORK_CHARS)));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}

/// Occurrence counter ranking by count, then by first appearance
#[derive(Default)]
struct Tally {
    counts: HashMap<String, (usize, usize)>,
}

impl Tally {
    fn add(&mut self, key: String) {
        let order = self.counts.len();
        self.counts.entry(key).or_insert((0, order)).0 += 1;
    }

    fn most_common(self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize, usize)> = self
            .counts
            .into_iter()
            .map(|(key, (count, order))| (key, count, order))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(n)
            .map(|(key, count, _)| (key, count))
            .collect()
    }
}

/// Fold session digests, oldest first, into a learnings digest
pub fn aggregate(digests: &[SessionDigest], config: &Config) -> Learnings {
    let mut files = Tally::default();
    let mut errors = Tally::default();
    let mut prompts = Vec::new();

    for digest in digests {
        for path in &digest.modified_files {
            files.add(path.clone());
        }
        for error in &digest.errors {
            errors.add(error.clone());
        }
        prompts.extend(digest.prompts.iter().cloned());
    }

    let skip = prompts.len().saturating_sub(config.recent_prompt_limit);
    Learnings {
        session_count: digests.len(),
        frequently_modified_files: files.most_common(config.top_n),
        error_patterns: errors.most_common(config.top_n),
        recent_prompts: prompts.split_off(skip),
    }
}

/// Digests for every summary in `sessions_dir`, in filename (date) order
pub fn load_session_digests(sessions_dir: &Path) -> anyhow::Result<Vec<SessionDigest>> {
    let mut summaries: Vec<PathBuf> = match std::fs::read_dir(sessions_dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().ends_with(SUMMARY_SUFFIX))
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).context(format!("listing {}", sessions_dir.display())),
    };
    summaries.sort();

    summaries
        .iter()
        .map(|summary| load_digest(summary))
        .collect()
}

fn load_digest(summary: &Path) -> anyhow::Result<SessionDigest> {
    let sidecar = sidecar_path(summary);
    if let Ok(content) = std::fs::read_to_string(&sidecar) {
        match serde_json::from_str::<SessionRecord>(&content) {
            Ok(record) => return Ok(SessionDigest::from_record(&record)),
            Err(e) => warn!("Ignoring unreadable sidecar {}: {}", sidecar.display(), e),
        }
    }

    let doc = std::fs::read_to_string(summary)
        .with_context(|| format!("reading {}", summary.display()))?;
    Ok(parse_summary(&doc))
}

/// Recompute the learnings of `project` from its current summaries
pub fn extract_learnings(store: &Store, project: &str, config: &Config) -> anyhow::Result<Learnings> {
    let digests = load_session_digests(&store.paths().sessions_dir(project))?;
    Ok(aggregate(&digests, config))
}

/// Persist the rendered digest as `learnings/<project>.md`
pub fn write_learnings(
    store: &Store,
    project: &str,
    learnings: &Learnings,
    config: &Config,
) -> anyhow::Result<PathBuf> {
    store.learnings_dir()?;
    let out_path = store.paths().learnings_file(project);
    let doc = learnings.render(project, config.recent_work_limit);
    atomic_write(&out_path, doc.as_bytes())
        .with_context(|| format!("writing {}", out_path.display()))?;

    info!(
        "Wrote learnings for {} ({} sessions) to {}",
        project,
        learnings.session_count,
        out_path.display()
    );
    Ok(out_path)
}
