use crate::result::{Result, SkiaccError};
use std::path::PathBuf;

pub struct CliParser;

impl CliParser {
    pub fn validate_workspace(path: &str) -> Result<PathBuf> {
        let workspace = PathBuf::from(path);

        if !workspace.exists() {
            return Err(SkiaccError::config(format!(
                "Workspace directory not found: {}",
                path
            )));
        }

        if !workspace.is_dir() {
            return Err(SkiaccError::config("Workspace path is not a directory"));
        }

        Ok(workspace)
    }
}
