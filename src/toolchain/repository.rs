use crate::result::Result;
use crate::utils::process::{CommandRunner, ExternalCommand, StepStatus};
use std::path::{Path, PathBuf};

pub const SKIA_URL: &str = "https://skia.googlesource.com/skia.git";
pub const DEPOT_TOOLS_URL: &str = "https://chromium.googlesource.com/chromium/tools/depot_tools.git";

/// A git checkout living directly under the workspace.
#[derive(Debug, Clone)]
pub struct Repository {
    pub label: &'static str,
    pub url: &'static str,
    pub dir_name: &'static str,
    workspace: PathBuf,
}

impl Repository {
    pub fn skia(workspace: &Path) -> Self {
        Self {
            label: "Skia",
            url: SKIA_URL,
            dir_name: "skia",
            workspace: workspace.to_path_buf(),
        }
    }

    pub fn depot_tools(workspace: &Path) -> Self {
        Self {
            label: "depot-tools",
            url: DEPOT_TOOLS_URL,
            dir_name: "depot_tools",
            workspace: workspace.to_path_buf(),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.workspace.join(self.dir_name)
    }

    /// Any existing directory counts as a checkout, even a partial one.
    pub fn exists(&self) -> bool {
        self.dir().exists()
    }

    // Target directory is explicit so the clone never depends on the URL's basename
    pub fn clone_command(&self) -> ExternalCommand {
        ExternalCommand::new("git", &self.workspace).args(["clone", self.url, self.dir_name])
    }

    pub fn checkout_command(&self, commit: &str) -> ExternalCommand {
        ExternalCommand::new("git", self.dir()).args(["checkout", commit])
    }

    pub fn pull_command(&self) -> ExternalCommand {
        ExternalCommand::new("git", self.dir()).arg("pull")
    }

    /** Clones the repository unless its directory is already present
     *
     * # Process Flow
     * 1. Any existing `dir_name` directory is taken as the checkout
     * 2. Otherwise `git clone <url> <dir_name>` runs inside the workspace
     *
     * # Notes
     * - A partial or broken checkout is not repaired; `--clean` does not remove it either
     * - The returned status is informational, strict mode already turned failures into `Err`
     */
    pub async fn ensure_cloned<R: CommandRunner>(&self, runner: &mut R) -> Result<StepStatus> {
        if self.exists() {
            println!("{} directory found, skipping clone", self.label);
            log::info!("{} already present at {}", self.label, self.dir().display());
            return Ok(StepStatus::Success);
        }

        println!("Cloning {}", self.label);
        runner.run(&self.clone_command()).await
    }

    /// Checks out `commit` and pulls. Pulling on a detached SHA fails harmlessly in permissive mode.
    pub async fn update<R: CommandRunner>(&self, runner: &mut R, commit: &str) -> Result<()> {
        println!("{} checkout to {}", self.label, commit);
        runner.run(&self.checkout_command(commit)).await?;
        runner.run(&self.pull_command()).await?;
        Ok(())
    }
}
