//! `herald seen` command.

use crate::adapters::live::LiveFileSystem;
use crate::config::Config;
use crate::ports::RepositoryHandle;
use crate::store::SeenStore;

/// Execute the `seen` command.
///
/// Prints how many issue numbers are recorded for `repo`, the highest one,
/// and the numbers themselves.
///
/// # Errors
///
/// Returns an error string if the handle is invalid or the seen-set cannot
/// be read.
pub fn run(config: &Config, repo: &str) -> Result<(), String> {
    let repo: RepositoryHandle = repo.parse().map_err(|e| format!("{e}"))?;
    let fs = LiveFileSystem;
    let store = SeenStore::new(&fs, &config.state.dir);
    let seen = store.load(&repo).map_err(|e| e.to_string())?;

    println!("{repo}: {}", store.path_for(&repo).display());
    match seen.max_known() {
        None => println!("No issues recorded yet."),
        Some(max) => {
            println!("{} recorded, max known #{max}", seen.len());
            let numbers: Vec<String> = seen.iter().map(|n| n.to_string()).collect();
            println!("{}", numbers.join(" "));
        }
    }
    Ok(())
}
