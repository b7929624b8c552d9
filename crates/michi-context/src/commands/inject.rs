use michi_learn::format_for_hook;
use std::path::Path;
use std::process::ExitCode;

pub fn run(project: Option<&Path>) -> anyhow::Result<ExitCode> {
    let (store, config) = super::open_store()?;
    let cwd = super::project_path(project)?;
    let project = store.register_project(&cwd)?;

    if let Some(payload) = format_for_hook(&store, &project.name, config.inject_session_limit)? {
        println!("{}", payload);
    }
    Ok(ExitCode::SUCCESS)
}
