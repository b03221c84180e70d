use crate::build::{BuildConfiguration, RunOptions};
use crate::cache::{should_skip, RebuildCache};
use crate::result::Result;
use crate::toolchain::{HostPlatform, ToolchainManager};
use crate::utils::process::{CommandRunner, ProcessManager};
use std::time::Instant;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The cache matched; no external command was run.
    Skipped,
    /// Every step ran and the cache was rewritten.
    Built,
    /// Commands were printed only; the cache was left untouched.
    DryRun,
}

pub async fn execute(config: &BuildConfiguration, options: RunOptions) -> Result<BuildOutcome> {
    let host = HostPlatform::detect()?;
    let mut runner = ProcessManager::new(options.quiet, options.strict, options.dry_run);

    let outcome = BuildCommand::new(config, options, host)
        .execute(&mut runner)
        .await?;

    if !runner.failures().is_empty() {
        println!(
            "{} external command(s) failed; the build output may be incomplete",
            runner.failures().len()
        );
        for failure in runner.failures() {
            log::warn!("Failed step: {}", failure);
        }
    }

    Ok(outcome)
}

pub struct BuildCommand<'a> {
    config: &'a BuildConfiguration,
    options: RunOptions,
    host: HostPlatform,
    cache: RebuildCache,
}

impl<'a> BuildCommand<'a> {
    pub fn new(config: &'a BuildConfiguration, options: RunOptions, host: HostPlatform) -> Self {
        Self {
            config,
            options,
            host,
            cache: RebuildCache::new(&config.workspace),
        }
    }

    pub async fn execute<R: CommandRunner>(&mut self, runner: &mut R) -> Result<BuildOutcome> {
        log::info!(
            "Build request: commit={} shared={} debug={} modules=[{}]",
            self.config.commit,
            self.config.shared,
            self.config.debug,
            self.config.module_list()
        );

        if self.options.clean {
            println!("Removing cache record");
            self.cache.clear().await?;
        }

        if self.options.force {
            println!("Forcing rebuild");
            log::info!("Cache check skipped by --force");
        } else {
            let previous = self.cache.load().await?;

            if should_skip(self.config, previous.as_ref()) {
                println!("Cached options are equal, no rebuild needed");
                return Ok(BuildOutcome::Skipped);
            }

            if previous.is_some() {
                println!("Cached options are different");
            }
        }

        let started = Instant::now();
        let toolchain = ToolchainManager::new(self.config, self.host);

        toolchain.sync_sources(runner).await?;
        toolchain.sync_dependencies(runner).await?;
        toolchain.generate(runner).await?;
        toolchain.build(runner).await?;

        if self.options.dry_run {
            log::info!("Dry run finished, cache left untouched");
            return Ok(BuildOutcome::DryRun);
        }

        self.cache.persist(self.config).await?;

        let elapsed = format_duration(started.elapsed());
        println!(
            "Build finished for {} ({}): {}",
            toolchain.platform_name(),
            self.config.out_dir(),
            elapsed
        );
        log::info!("Build completed in {}", elapsed);

        Ok(BuildOutcome::Built)
    }
}

fn format_duration(duration: std::time::Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 1000 {
        let seconds = duration.as_secs_f64();
        format!("{:.2}s", seconds)
    } else {
        format!("{}ms", total_ms)
    }
}
