use clap::Parser;
use dirs::config_dir;
use env_logger::Builder;
use log::LevelFilter;
use skiacc::cli::Cli;
use skiacc::result::Result;
use std::fs::OpenOptions;

/** Main entry point for skiacc
 *
 * # Process Flow
 * 1. Initialize logging system with file output
 * 2. Parse command line arguments using Clap
 * 3. Resolve the build configuration and run the pipeline
 *
 * # Exit Status
 * - Invalid input, incompatible flags, cache hits and unsupported hosts exit with 0
 * - Clap parsing errors exit with clap's code
 * - I/O errors and strict-mode step failures are returned from `main`
 */
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logging first so argument errors can still be traced
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests also arrive here, with exit code 0
            let _ = e.print();
            std::process::exit(e.exit_code());
        }
    };

    cli.execute().await
}

/** Initializes file-based logging
 *
 * # Configuration
 * - Log file: `<config dir>/skiacc/skiacc.log`, current directory as fallback
 * - Default level: Info, `RUST_LOG` overrides
 * - Append mode so earlier runs stay readable
 * - Logging is skipped entirely if no log file can be opened
 */
fn init_logging() {
    let log_file = get_log_file_path();

    // Missing directory is not fatal, the open below decides
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let file = match OpenOptions::new().create(true).append(true).open(&log_file) {
        Ok(file) => file,
        Err(_) => return,
    };

    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    log::info!("skiacc started");
}

/** Resolves the log file location
 *
 * # Notes
 * - `~/.config` on Linux, `~/Library/Application Support` on macOS, `%APPDATA%` on Windows
 * - Never fails; the bare file name is the last resort
 */
fn get_log_file_path() -> std::path::PathBuf {
    if let Some(config_dir) = config_dir() {
        config_dir.join("skiacc").join("skiacc.log")
    } else {
        // Fallback to current directory
        std::env::current_dir()
            .map(|p| p.join("skiacc.log"))
            .unwrap_or_else(|_| "skiacc.log".into())
    }
}

/*
 * Performance and Design Considerations:
 *
 * 1. Async Runtime:
 *    - `current_thread` flavor; every build step runs strictly in order
 *    - The heavy lifting happens in child processes, not in this runtime
 *
 * 2. Exit Status:
 *    - User mistakes print a message and exit 0
 *    - Only I/O errors and strict-mode step failures leave `main` as `Err`
 *
 * 3. Logging Strategy:
 *    - Log lines go to a file so they never interleave with gn or ninja output
 *    - Append mode keeps the history of earlier builds
 */
