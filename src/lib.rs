/// skiacc - fetch, configure and build Skia
///
/// Main modules:
/// - build: Build configuration, module whitelist and resolver
/// - cache: Rebuild decision record kept between runs
/// - cli: Command-line interface parsing and execution
/// - commands: The sync/generate/build pipeline
/// - result: Error handling and result types
/// - toolchain: Repositories and per-platform tool conventions
/// - utils: External process execution
pub mod build;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod result;
pub mod toolchain;
pub mod utils;
