use crate::result::{Result, SkiaccError};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use which::{which, which_in};

/// One external tool invocation: program, argv and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// How an external command ended, when the run is allowed to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Success,
    Failed(Option<i32>),
}

impl StepStatus {
    pub fn success(&self) -> bool {
        matches!(self, StepStatus::Success)
    }
}

/// Seam between the build pipeline and the host process API.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&mut self, command: &ExternalCommand) -> Result<StepStatus>;
}

/** Spawns external commands for one build run
 *
 * # Modes
 * - **Permissive** (default): a failing step is recorded and the run continues
 * - **Strict**: the first failing step becomes `SkiaccError::Process`
 * - **Dry run**: commands are printed and never spawned
 *
 * # Notes
 * - Quiet mode discards child output and shows a spinner instead
 * - Failures are kept for the end-of-run summary
 */
#[derive(Debug, Default)]
pub struct ProcessManager {
    quiet: bool,
    strict: bool,
    dry_run: bool,
    failures: Vec<String>,
}

impl ProcessManager {
    pub fn new(quiet: bool, strict: bool, dry_run: bool) -> Self {
        Self {
            quiet,
            strict,
            dry_run,
            failures: Vec::new(),
        }
    }

    /// Resolves `name` on PATH.
    pub fn find_executable(name: &str) -> Result<PathBuf> {
        which(name).map_err(|_| SkiaccError::process(format!("Executable not found: {}", name)))
    }

    /** Locates a tool shipped in `dir` (usually depot_tools)
     *
     * # Notes
     * - Looks in `dir` first, then PATH
     * - Falls back to the bare name so the spawn error names the tool
     */
    pub fn find_executable_in(name: &str, dir: &Path) -> PathBuf {
        // `which_in` also applies PATHEXT, so `ninja` finds `ninja.exe`
        if let Ok(path) = which_in(name, Some(dir), dir) {
            return path;
        }

        match Self::find_executable(name) {
            Ok(path) => path,
            Err(_) => {
                log::debug!("{} not found in {} or PATH", name, dir.display());
                PathBuf::from(name)
            }
        }
    }

    /// Commands that exited unsuccessfully during this run.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    fn report_failure(
        &mut self,
        command: &ExternalCommand,
        reason: String,
        status: StepStatus,
    ) -> Result<StepStatus> {
        // Strict runs stop at the first failure and leave the cache untouched
        if self.strict {
            log::error!("{} failed: {}", command, reason);
            return Err(SkiaccError::process(format!(
                "{} failed: {}",
                command.program_name(),
                reason
            )));
        }

        log::warn!("{} failed: {}, continuing", command, reason);
        println!(
            "Warning: {} failed ({}), continuing",
            command.program_name(),
            reason
        );
        self.failures.push(command.to_string());
        Ok(status)
    }
}

impl CommandRunner for ProcessManager {
    /** Runs one command to completion
     *
     * # Process Flow
     * 1. Dry run: print the command with its working directory and return
     * 2. Configure stdio (inherited, or null plus spinner when quiet)
     * 3. Spawn in `command.cwd` and wait for exit
     * 4. Map the outcome through the strict or permissive policy
     *
     * # Errors
     * Only in strict mode, for a non-zero exit, a signal or a failed spawn.
     */
    async fn run(&mut self, command: &ExternalCommand) -> Result<StepStatus> {
        if self.dry_run {
            println!("[dry-run] ({}) {}", command.cwd.display(), command);
            return Ok(StepStatus::Success);
        }

        log::info!("Running in {}: {}", command.cwd.display(), command);

        // Build command with args and working directory
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd.current_dir(&command.cwd);

        let spinner = if self.quiet {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(format!("Running {}...", command.program_name()));
            spinner.enable_steady_tick(Duration::from_millis(100));
            Some(spinner)
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
            None
        };

        // A spawn error is a failed step, not an I/O error
        let result = match cmd.spawn() {
            Ok(mut child) => child.wait().await,
            Err(e) => Err(e),
        };

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match result {
            Ok(status) if status.success() => Ok(StepStatus::Success),
            Ok(status) => {
                // No exit code means the child was killed by a signal
                let code = status.code();
                let reason = match code {
                    Some(code) => format!("exit code {}", code),
                    None => "terminated by signal".to_string(),
                };
                self.report_failure(command, reason, StepStatus::Failed(code))
            }
            Err(e) => self.report_failure(
                command,
                format!("could not start: {}", e),
                StepStatus::Failed(None),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let cmd = ExternalCommand::new("gn", "skia")
            .arg("gen")
            .arg("--args=is_debug=false is_official_build=true");

        assert_eq!(
            cmd.to_string(),
            "gn gen '--args=is_debug=false is_official_build=true'"
        );
    }

    #[test]
    fn program_name_strips_directories() {
        let cmd = ExternalCommand::new("/work/depot_tools/gn", "/work/skia");
        assert_eq!(cmd.program_name(), "gn");
    }

    #[tokio::test]
    async fn dry_run_never_spawns() {
        let mut manager = ProcessManager::new(false, true, true);
        let cmd = ExternalCommand::new("definitely-not-a-real-program-skiacc", ".");

        let status = manager.run(&cmd).await.unwrap();
        assert!(status.success());
        assert!(manager.failures().is_empty());
    }

    #[tokio::test]
    async fn missing_program_is_tolerated_when_permissive() {
        let mut manager = ProcessManager::new(true, false, false);
        let cmd = ExternalCommand::new("definitely-not-a-real-program-skiacc", ".");

        let status = manager.run(&cmd).await.unwrap();
        assert_eq!(status, StepStatus::Failed(None));
        assert_eq!(manager.failures().len(), 1);
    }

    #[tokio::test]
    async fn missing_program_fails_when_strict() {
        let mut manager = ProcessManager::new(true, true, false);
        let cmd = ExternalCommand::new("definitely-not-a-real-program-skiacc", ".");

        let err = manager.run(&cmd).await.unwrap_err();
        assert!(matches!(err, SkiaccError::Process(_)));
    }

    #[test]
    fn unknown_executable_falls_back_to_bare_name() {
        let dir = tempfile::TempDir::new().unwrap();

        let path = ProcessManager::find_executable_in("definitely-not-a-real-program-skiacc", dir.path());
        assert_eq!(path, PathBuf::from("definitely-not-a-real-program-skiacc"));
    }
}
