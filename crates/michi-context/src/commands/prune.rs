use michi_store::prune_old_sessions;
use std::process::ExitCode;

pub fn run(max_age: Option<u32>) -> anyhow::Result<ExitCode> {
    let (store, config) = super::open_store()?;
    let max_age_days = max_age.unwrap_or(config.max_age_days);

    let pruned = prune_old_sessions(&store, max_age_days)?;
    if pruned.is_empty() {
        println!("Nothing to prune");
    } else {
        for path in &pruned {
            println!("Pruned: {}", path.display());
        }
        println!("\nPruned {} session(s)", pruned.len());
    }
    Ok(ExitCode::SUCCESS)
}
