use crate::build::BuildConfiguration;
use crate::result::Result;
use crate::toolchain::{HostPlatform, PlatformToolchain, Repository};
use crate::utils::process::{CommandRunner, ExternalCommand, ProcessManager};

/** Drives the external Skia toolchain for one resolved configuration
 *
 * # Pipeline
 * 1. `sync_sources`: clone skia and depot_tools, check out the commit
 * 2. `sync_dependencies`: `git-sync-deps` then `gclient sync`
 * 3. `generate`: `gn gen` with the composed args
 * 4. `build`: `ninja` for skia and every requested module target
 *
 * # Notes
 * - Each step only builds `ExternalCommand`s; spawning belongs to the `CommandRunner`
 * - The `*_command` builders are public so tests can inspect argv without spawning
 */
pub struct ToolchainManager<'a> {
    config: &'a BuildConfiguration,
    platform: &'static PlatformToolchain,
    skia: Repository,
    depot_tools: Repository,
}

impl<'a> ToolchainManager<'a> {
    pub fn new(config: &'a BuildConfiguration, host: HostPlatform) -> Self {
        Self {
            config,
            platform: host.toolchain(),
            skia: Repository::skia(&config.workspace),
            depot_tools: Repository::depot_tools(&config.workspace),
        }
    }

    pub fn platform_name(&self) -> &'static str {
        self.platform.name
    }

    pub async fn sync_sources<R: CommandRunner>(&self, runner: &mut R) -> Result<()> {
        // depot_tools is never checked out to a commit, it tracks its own main
        self.skia.ensure_cloned(runner).await?;
        self.skia.update(runner, &self.config.commit).await?;
        self.depot_tools.ensure_cloned(runner).await?;
        Ok(())
    }

    pub async fn sync_dependencies<R: CommandRunner>(&self, runner: &mut R) -> Result<()> {
        println!("Syncing dependencies");
        runner.run(&self.git_sync_deps_command()).await?;
        runner.run(&self.gclient_sync_command()).await?;
        Ok(())
    }

    pub async fn generate<R: CommandRunner>(&self, runner: &mut R) -> Result<()> {
        println!("Generating build files in {}", self.config.out_dir());
        runner.run(&self.gn_gen_command()).await?;
        Ok(())
    }

    pub async fn build<R: CommandRunner>(&self, runner: &mut R) -> Result<()> {
        println!("Building for {}", self.platform.name);
        runner.run(&self.ninja_command()).await?;
        Ok(())
    }

    pub fn git_sync_deps_command(&self) -> ExternalCommand {
        ExternalCommand::new(self.platform.python, self.skia.dir())
            .args(self.platform.python_args.iter().copied())
            .arg("tools/git-sync-deps")
    }

    /// `gclient sync` in depot_tools, preferring the launcher it ships.
    pub fn gclient_sync_command(&self) -> ExternalCommand {
        let depot_tools = self.depot_tools.dir();
        let gclient = ProcessManager::find_executable_in(self.platform.gclient, &depot_tools);
        ExternalCommand::new(gclient, depot_tools).arg("sync")
    }

    /** `gn gen <out_dir> --args=...` inside the skia checkout
     *
     * # Notes
     * - The launcher path is built from the depot_tools checkout, never relative to `cwd`
     * - Windows resolves relative programs against the parent's directory, not `cwd`
     */
    pub fn gn_gen_command(&self) -> ExternalCommand {
        let gn = self.depot_tools.dir().join(self.platform.gn);
        ExternalCommand::new(gn, self.skia.dir()).args([
            "gen".to_string(),
            self.config.out_dir().to_string(),
            format!("--args={}", self.platform.gn_args(self.config)),
        ])
    }

    pub fn ninja_command(&self) -> ExternalCommand {
        let ninja = ProcessManager::find_executable_in(self.platform.ninja, &self.depot_tools.dir());
        ExternalCommand::new(ninja, self.skia.dir())
            .args(["-C", self.config.out_dir()])
            .args(self.platform.ninja_targets(self.config))
    }
}
