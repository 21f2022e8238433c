//! Starting the game process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::info;

/// Errors raised while starting a process.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The process could not be spawned.
    #[error("Failed to start {}: {source}", .program.display())]
    Spawn {
        /// Program that failed to start
        program: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

/// Starts a program with a resolved argument string.
pub trait Launcher {
    /// Start `program` and return without waiting for it.
    ///
    /// `arguments` is split on whitespace.
    fn launch(&self, program: &Path, arguments: &str) -> Result<(), LaunchError>;
}

/// Launches real OS processes, fire-and-forget.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(&self, program: &Path, arguments: &str) -> Result<(), LaunchError> {
        let child = Command::new(program)
            .args(arguments.split_whitespace())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        info!(program = %program.display(), pid = child.id(), "started process");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let result = ProcessLauncher.launch(Path::new("/nonexistent/steam"), "-applaunch 70");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/steam"));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_does_not_wait() {
        let result = ProcessLauncher.launch(Path::new("sleep"), "5");
        assert!(result.is_ok());
    }
}
