use crate::build::Module;
use crate::result::{Result, SkiaccError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_COMMIT: &str = "master";
pub const DEFAULT_LLVM_WIN: &str = "C:\\Program Files\\LLVM";
pub const DEFAULTS_FILE: &str = "skiacc.toml";

// Leading character is alphanumeric so git never reads the commit as an option.
static COMMIT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/@^~{}+-]*$").expect("commit pattern is a valid regex")
});

/// Resolved build request. Built once per run and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub commit: SmolStr,
    pub shared: bool,
    pub debug: bool,
    pub modules: BTreeSet<Module>,
    pub extra_args: Option<String>,
    pub toolchain: ToolchainPaths,
    pub workspace: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    pub llvm_win: PathBuf,
}

impl Default for ToolchainPaths {
    fn default() -> Self {
        Self {
            llvm_win: PathBuf::from(DEFAULT_LLVM_WIN),
        }
    }
}

/// Per-run switches that never reach the cache record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub quiet: bool,
    pub force: bool,
    pub strict: bool,
    pub dry_run: bool,
    pub clean: bool,
}

/// Raw user input before validation.
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub commit: Option<String>,
    pub shared: bool,
    pub debug: bool,
    pub all_modules: bool,
    pub modules: Vec<String>,
    pub extra_args: Option<String>,
    pub llvm_win: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
}

/// Contents of an optional `skiacc.toml` in the workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsFile {
    pub build: Option<BuildDefaults>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildDefaults {
    pub commit: Option<SmolStr>,
    pub shared: Option<bool>,
    pub debug: Option<bool>,
    pub modules: Option<Vec<String>>,
    pub args: Option<String>,
    pub llvm_win: Option<PathBuf>,
}

impl DefaultsFile {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let defaults: DefaultsFile = toml::from_str(&content)?;

        Ok(defaults)
    }

    /// Loads `skiacc.toml` from the workspace, or returns empty defaults when absent.
    pub async fn load(workspace: &Path) -> Result<Self> {
        let path = workspace.join(DEFAULTS_FILE);

        if !path.exists() {
            return Ok(Self::default());
        }

        log::info!("Loading build defaults from {}", path.display());
        Self::from_file(&path).await
    }
}

impl BuildConfiguration {
    /// Turns raw input into a validated configuration. CLI values win over file defaults.
    pub fn resolve(request: &BuildRequest, defaults: &DefaultsFile) -> Result<Self> {
        let file = defaults.build.clone().unwrap_or_default();

        let shared = request.shared || file.shared.unwrap_or(false);

        if request.all_modules && shared {
            return Err(SkiaccError::IncompatibleFlags(
                SkiaccError::ALL_MODULES_SHARED.into(),
            ));
        }

        let commit: SmolStr = match &request.commit {
            Some(commit) => commit.as_str().into(),
            None => file.commit.unwrap_or_else(|| DEFAULT_COMMIT.into()),
        };
        validate_commit(&commit)?;

        let modules = if request.all_modules || !request.modules.is_empty() {
            let mut modules = parse_modules(&request.modules)?;
            if request.all_modules {
                modules.extend(Module::BUNDLE);
            }
            modules
        } else {
            parse_modules(file.modules.as_deref().unwrap_or_default())?
        };

        let extra_args = request
            .extra_args
            .clone()
            .or(file.args)
            .map(|args| args.trim().to_string())
            .filter(|args| !args.is_empty());

        let toolchain = ToolchainPaths {
            llvm_win: request
                .llvm_win
                .clone()
                .or(file.llvm_win)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LLVM_WIN)),
        };

        Ok(Self {
            commit,
            shared,
            debug: request.debug || file.debug.unwrap_or(false),
            modules,
            extra_args,
            toolchain,
            workspace: request
                .workspace
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn out_dir(&self) -> &'static str {
        if self.shared {
            "out/ReleaseShared"
        } else {
            "out/Release"
        }
    }

    pub fn skia_dir(&self) -> PathBuf {
        self.workspace.join("skia")
    }

    pub fn depot_tools_dir(&self) -> PathBuf {
        self.workspace.join("depot_tools")
    }

    pub fn module_list(&self) -> String {
        if self.modules.is_empty() {
            return "none".to_string();
        }

        self.modules
            .iter()
            .map(Module::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Parses every entry, failing on the first name outside the whitelist.
pub fn parse_modules<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<Module>> {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(str::parse::<Module>)
        .collect()
}

fn validate_commit(commit: &str) -> Result<()> {
    if COMMIT_PATTERN.is_match(commit) {
        Ok(())
    } else {
        Err(SkiaccError::config(format!(
            "Invalid commit '{}': expected a single revision name or SHA",
            commit
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildRequest {
        BuildRequest::default()
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let config = BuildConfiguration::resolve(&request(), &DefaultsFile::default()).unwrap();

        assert_eq!(config.commit, DEFAULT_COMMIT);
        assert!(!config.shared);
        assert!(!config.debug);
        assert!(config.modules.is_empty());
        assert_eq!(config.extra_args, None);
        assert_eq!(config.toolchain.llvm_win, PathBuf::from(DEFAULT_LLVM_WIN));
        assert_eq!(config.out_dir(), "out/Release");
    }

    #[test]
    fn every_valid_module_list_is_accepted() {
        let names: Vec<String> = Module::ALL.iter().map(|m| m.to_string()).collect();
        let req = BuildRequest {
            modules: names,
            ..request()
        };

        let config = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap();
        assert_eq!(config.modules.len(), Module::ALL.len());
    }

    #[test]
    fn one_unknown_module_rejects_the_whole_input() {
        let req = BuildRequest {
            modules: vec!["svg".into(), "opengl".into(), "skottie".into()],
            ..request()
        };

        let err = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap_err();
        assert!(err.to_string().contains("opengl"));
    }

    #[test]
    fn duplicate_modules_collapse() {
        let req = BuildRequest {
            modules: vec!["svg".into(), "svg".into()],
            ..request()
        };

        let config = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap();
        assert_eq!(config.modules.len(), 1);
    }

    #[test]
    fn all_modules_with_shared_is_rejected() {
        let req = BuildRequest {
            all_modules: true,
            shared: true,
            ..request()
        };

        let err = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap_err();
        assert!(matches!(err, SkiaccError::IncompatibleFlags(_)));
        assert!(err.to_string().contains("--all-modules"));
    }

    #[test]
    fn all_modules_expands_to_bundle() {
        let req = BuildRequest {
            all_modules: true,
            modules: vec!["canvaskit".into()],
            ..request()
        };

        let config = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap();
        assert!(config.modules.contains(&Module::CanvasKit));
        for module in Module::BUNDLE {
            assert!(config.modules.contains(&module));
        }
    }

    #[test]
    fn shared_build_uses_separate_out_dir() {
        let req = BuildRequest {
            shared: true,
            ..request()
        };

        let config = BuildConfiguration::resolve(&req, &DefaultsFile::default()).unwrap();
        assert_eq!(config.out_dir(), "out/ReleaseShared");
    }

    #[test]
    fn cli_values_override_file_defaults() {
        let defaults: DefaultsFile = toml::from_str(
            r#"
            [build]
            commit = "chrome/m120"
            debug = true
            modules = ["svg"]
            args = "skia_use_vulkan=true"
            "#,
        )
        .unwrap();

        let from_file = BuildConfiguration::resolve(&request(), &defaults).unwrap();
        assert_eq!(from_file.commit, "chrome/m120");
        assert!(from_file.debug);
        assert!(from_file.modules.contains(&Module::Svg));
        assert_eq!(from_file.extra_args.as_deref(), Some("skia_use_vulkan=true"));

        let req = BuildRequest {
            commit: Some("abc123".into()),
            modules: vec!["skottie".into()],
            extra_args: Some("  ".into()),
            ..request()
        };
        let overridden = BuildConfiguration::resolve(&req, &defaults).unwrap();
        assert_eq!(overridden.commit, "abc123");
        assert_eq!(
            overridden.modules,
            BTreeSet::from([Module::Skottie])
        );
        assert_eq!(overridden.extra_args, None);
    }

    #[test]
    fn invalid_module_in_file_is_rejected() {
        let defaults: DefaultsFile = toml::from_str("[build]\nmodules = [\"vulkan\"]\n").unwrap();
        let err = BuildConfiguration::resolve(&request(), &defaults).unwrap_err();
        assert!(err.to_string().contains("vulkan"));
    }

    #[test]
    fn shared_from_file_still_conflicts_with_all_modules() {
        let defaults: DefaultsFile = toml::from_str("[build]\nshared = true\n").unwrap();
        let req = BuildRequest {
            all_modules: true,
            ..request()
        };

        assert!(BuildConfiguration::resolve(&req, &defaults).is_err());
    }

    #[test]
    fn commit_must_be_a_single_revision_token() {
        for bad in ["", "two words", "line\nbreak", "--detach", "--orphan=x", "-q", ".hidden"] {
            let req = BuildRequest {
                commit: Some(bad.into()),
                ..request()
            };
            assert!(
                BuildConfiguration::resolve(&req, &DefaultsFile::default()).is_err(),
                "{bad:?} accepted"
            );
        }

        for good in ["HEAD~1", "chrome/m120", "a1b2c3d", "v1.2-rc+3"] {
            let req = BuildRequest {
                commit: Some(good.into()),
                ..request()
            };
            assert!(
                BuildConfiguration::resolve(&req, &DefaultsFile::default()).is_ok(),
                "{good:?} rejected"
            );
        }
    }

    #[tokio::test]
    async fn missing_defaults_file_yields_empty_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let defaults = DefaultsFile::load(dir.path()).await.unwrap();
        assert!(defaults.build.is_none());
    }

    #[tokio::test]
    async fn malformed_defaults_file_is_a_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(DEFAULTS_FILE), "[build\ncommit = ").unwrap();

        let err = DefaultsFile::load(dir.path()).await.unwrap_err();
        assert!(matches!(err, SkiaccError::TomlParse(_)));
        assert!(err.is_user_facing());
    }
}
