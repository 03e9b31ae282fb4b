use crate::config::default_log_path;
use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Where records go while the terminal is in the alternate screen: the
/// configured file, else `lifeterm.log` in the per-user data directory.
/// `None` only when no data directory can be resolved.
pub fn log_path(configured: Option<&Path>) -> Option<PathBuf> {
    match configured {
        Some(p) => Some(p.to_path_buf()),
        None => default_log_path().ok(),
    }
}

/// `RUST_LOG` picks the filter (default `warn`). With a file, records are
/// appended there so they stay out of the alternate screen.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_wins() {
        let p = Path::new("/tmp/lifeterm-test.log");
        assert_eq!(log_path(Some(p)), Some(p.to_path_buf()));
    }
}
