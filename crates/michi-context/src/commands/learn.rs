use michi_learn::{extract_learnings, write_learnings};
use std::path::Path;
use std::process::ExitCode;

pub fn run(project: Option<&Path>) -> anyhow::Result<ExitCode> {
    let (store, config) = super::open_store()?;
    let cwd = super::project_path(project)?;
    let project = store.register_project(&cwd)?;

    let learnings = extract_learnings(&store, &project.name, &config)?;
    let out_path = write_learnings(&store, &project.name, &learnings, &config)?;

    println!("Learnings written to: {}", out_path.display());
    println!("  Sessions analyzed: {}", learnings.session_count);
    println!(
        "  Files tracked: {}",
        learnings.frequently_modified_files.len()
    );
    println!("  Error patterns: {}", learnings.error_patterns.len());
    Ok(ExitCode::SUCCESS)
}
