pub mod parser;

use crate::build::{BuildRequest, RunOptions};
use crate::commands::CommandExecutor;
use crate::result::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skiacc")]
#[command(about = "Skia build utility")]
#[command(version = "0.1.0")]
#[command(
    help_template = "{before-help}{name} v{version}\n\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[arg(short, long, help = "Skia SHA commit to checkout (default: master)")]
    commit: Option<String>,

    #[arg(long, help = "Build as a shared library instead of a static library")]
    shared: bool,

    #[arg(short = 'm', long, help = "Build additional Skia modules")]
    all_modules: bool,

    #[arg(long, value_delimiter = ',', help = "Modules to build, comma separated")]
    modules: Vec<String>,

    #[arg(long = "args", allow_hyphen_values = true, help = "Additional arguments to pass to gn")]
    extra_args: Option<String>,

    #[arg(long, help = "Build in debug configuration")]
    debug: bool,

    #[arg(long, help = "LLVM directory for Windows")]
    llvm_win: Option<PathBuf>,

    #[arg(short, long, help = "Hide output from commands (e.g. git clone, etc)")]
    quiet: bool,

    #[arg(short, long, help = "Force rebuild, regardless of cache")]
    force: bool,

    #[arg(long, help = "Stop when an external command fails")]
    strict: bool,

    #[arg(long, help = "Print external commands without running them")]
    dry_run: bool,

    #[arg(long, help = "Delete the cache record before running")]
    clean: bool,

    #[arg(
        short = 'C',
        long,
        value_parser = parser::CliParser::validate_workspace,
        help = "Directory holding the checkouts and cache (default: current directory)"
    )]
    workspace: Option<PathBuf>,
}

impl Cli {
    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            commit: self.commit.clone(),
            shared: self.shared,
            debug: self.debug,
            all_modules: self.all_modules,
            modules: self.modules.clone(),
            extra_args: self.extra_args.clone(),
            llvm_win: self.llvm_win.clone(),
            workspace: self.workspace.clone(),
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            quiet: self.quiet,
            force: self.force,
            strict: self.strict,
            dry_run: self.dry_run,
            clean: self.clean,
        }
    }

    /// Runs the build. User input errors print and end the run with status 0.
    pub async fn execute(self) -> Result<()> {
        let mut executor = CommandExecutor::new();

        match executor.build(self.request(), self.options()).await {
            Ok(outcome) => {
                log::info!("Run finished: {:?}", outcome);
                Ok(())
            }
            Err(e) if e.is_user_facing() => {
                println!("{}", e);
                log::warn!("Run stopped: {}", e);
                Ok(())
            }
            Err(e) => {
                log::error!("Run failed: {}", e);
                Err(e)
            }
        }
    }
}
