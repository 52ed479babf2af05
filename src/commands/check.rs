//! `herald check-config` command.

use std::path::Path;

use crate::config::ConfigLoader;

/// Execute the `check-config` command.
///
/// Prints the effective settings that matter for scheduling. Secrets are
/// never printed.
///
/// # Errors
///
/// Returns an error string naming the first configuration problem.
pub fn run(path: &Path) -> Result<(), String> {
    let config = ConfigLoader::load(Some(path))
        .map_err(|e| format!("Invalid configuration {}: {e}", path.display()))?;

    println!("Configuration OK: {}", path.display());
    println!("Repositories ({}):", config.github.repos.len());
    for repo in &config.github.repos {
        println!("  {repo}");
    }
    println!(
        "Active window: {} - {}, every {} min",
        config.schedule.start_time, config.schedule.end_time, config.schedule.interval_minutes
    );
    println!("Model: {} via {}", config.llm.model, config.llm.base_url);
    println!("Seen-sets: {}", config.state.dir.display());
    if config.github.token.is_none() {
        println!("Note: no GitHub token set, unauthenticated rate limits apply");
    }
    Ok(())
}
