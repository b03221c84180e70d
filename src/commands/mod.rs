pub mod build;

use crate::build::{BuildConfiguration, BuildRequest, DefaultsFile, RunOptions};
use crate::result::Result;
use std::path::{Path, PathBuf};

pub use build::{BuildCommand, BuildOutcome};

#[derive(Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /** Resolves the request against workspace defaults, then runs the pipeline
     *
     * # Notes
     * - The workspace is made absolute first so every checkout and tool path
     *   handed to child processes is independent of their working directory
     */
    pub async fn build(&mut self, request: BuildRequest, options: RunOptions) -> Result<BuildOutcome> {
        let workspace = absolute_workspace(request.workspace.as_deref())?;
        let request = BuildRequest {
            workspace: Some(workspace.clone()),
            ..request
        };

        let defaults = DefaultsFile::load(&workspace).await?;
        let config = BuildConfiguration::resolve(&request, &defaults)?;

        build::execute(&config, options).await
    }
}

/// Joins a relative (or missing) workspace onto the current directory.
pub fn absolute_workspace(workspace: Option<&Path>) -> Result<PathBuf> {
    let workspace = workspace.unwrap_or_else(|| Path::new("."));

    if workspace.is_absolute() {
        return Ok(workspace.to_path_buf());
    }

    let current_dir = std::env::current_dir()?;
    if workspace == Path::new(".") {
        Ok(current_dir)
    } else {
        Ok(current_dir.join(workspace))
    }
}
