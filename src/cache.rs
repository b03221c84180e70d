use crate::build::{BuildConfiguration, Module};
use crate::result::{Result, SkiaccError};
use smol_str::SmolStr;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CACHE_FILE: &str = "skiacc_cache.txt";

/** Configuration applied by the last completed run
 *
 * The record file format is:
 * ```text
 * 0             <- shared flag
 * master        <- commit
 * 1             <- debug flag (optional, release when missing)
 * skottie       <- one module per remaining line
 * svg
 * ```
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDecision {
    pub shared: bool,
    pub commit: SmolStr,
    pub debug: bool,
    pub modules: BTreeSet<Module>,
}

impl CachedDecision {
    pub fn from_config(config: &BuildConfiguration) -> Self {
        Self {
            shared: config.shared,
            commit: config.commit.clone(),
            debug: config.debug,
            modules: config.modules.clone(),
        }
    }

    /** Parses a record file body
     *
     * # Errors
     * `InvalidCache` when fewer than 2 lines are present, a flag is not `0`/`1`,
     * the commit line is empty, or a module line is outside the whitelist.
     */
    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content.lines().collect();

        if lines.len() < 2 {
            return Err(SkiaccError::invalid_cache(format!(
                "expected at least 2 lines, found {}",
                lines.len()
            )));
        }

        let shared = parse_flag(lines[0], "shared")?;

        let commit = lines[1].trim();
        if commit.is_empty() {
            return Err(SkiaccError::invalid_cache("empty commit line"));
        }

        // Older two-line records predate the debug flag
        let debug = match lines.get(2) {
            Some(line) => parse_flag(line, "debug")?,
            None => false,
        };

        // Duplicate lines collapse into the set.
        let modules = lines
            .iter()
            .skip(3)
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.parse::<Module>().map_err(|_| {
                    SkiaccError::invalid_cache(format!("unknown module '{}'", line))
                })
            })
            .collect::<Result<BTreeSet<_>>>()?;

        Ok(Self {
            shared,
            commit: commit.into(),
            debug,
            modules,
        })
    }

    /// Serializes in the same field order `parse` reads.
    pub fn to_record(&self) -> String {
        let mut lines = vec![
            flag(self.shared).to_string(),
            self.commit.to_string(),
            flag(self.debug).to_string(),
        ];
        lines.extend(self.modules.iter().map(|m| m.as_str().to_string()));
        lines.join("\n")
    }

    // Module order never matters, both sides are sets
    pub fn matches(&self, config: &BuildConfiguration) -> bool {
        self.shared == config.shared
            && self.commit == config.commit
            && self.debug == config.debug
            && self.modules == config.modules
    }
}

fn parse_flag(line: &str, field: &str) -> Result<bool> {
    match line.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(SkiaccError::invalid_cache(format!(
            "{} flag must be 0 or 1, found '{}'",
            field, other
        ))),
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// True only when every compared field of the previous record equals the request.
pub fn should_skip(current: &BuildConfiguration, previous: Option<&CachedDecision>) -> bool {
    match previous {
        Some(previous) if previous.matches(current) => {
            log::info!("Cached options are equal, no rebuild needed");
            true
        }
        Some(previous) => {
            log::info!(
                "Cached options are different: cached {:?}, requested {:?}",
                previous,
                CachedDecision::from_config(current)
            );
            false
        }
        None => {
            log::info!("No usable cache record, rebuilding");
            false
        }
    }
}

/// Flat-file store for the single [`CachedDecision`] of a workspace.
pub struct RebuildCache {
    cache_file: PathBuf,
}

impl RebuildCache {
    /** Creates a cache rooted at `workspace`
     *
     * # Notes
     * - The record lives at `workspace/skiacc_cache.txt`
     * - Nothing is read or written until `load`/`persist`
     */
    pub fn new(workspace: &Path) -> Self {
        Self {
            cache_file: workspace.join(CACHE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_file
    }

    /** Reads the previous record
     *
     * # Returns
     * - `Ok(Some(record))` for a well-formed file
     * - `Ok(None)` when the file is missing or malformed (treated as stale)
     * - `Err` only for I/O failures other than a missing file
     */
    pub async fn load(&self) -> Result<Option<CachedDecision>> {
        if !self.cache_file.exists() {
            println!("No cache file found");
            log::info!("No cache file at {}", self.cache_file.display());
            return Ok(None);
        }

        println!("Cache file found");

        // Read errors other than absence still propagate
        let content = fs::read_to_string(&self.cache_file).await?;

        match CachedDecision::parse(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                println!("Invalid cache file");
                log::warn!("Ignoring {}: {}", self.cache_file.display(), e);
                Ok(None)
            }
        }
    }

    /** Overwrites the record with `config`
     *
     * # Notes
     * - Called only after the build step, never on a dry run
     * - The whole file is rewritten, never appended
     */
    pub async fn persist(&self, config: &BuildConfiguration) -> Result<()> {
        // Ensure cache directory exists
        if let Some(parent) = self.cache_file.parent() {
            fs::create_dir_all(parent).await?;
        }

        let record = CachedDecision::from_config(config).to_record();
        fs::write(&self.cache_file, record).await?;

        log::info!("Cache written to {}", self.cache_file.display());
        Ok(())
    }

    /// Removes the record so the next run always rebuilds (`--clean`).
    pub async fn clear(&self) -> Result<()> {
        if self.cache_file.exists() {
            fs::remove_file(&self.cache_file).await?;
            log::info!("Removed {}", self.cache_file.display());
        }
        Ok(())
    }
}

/*
 * Cache Design Considerations:
 *
 * 1. Format:
 *    - Plain text with one field per line, readable and editable by hand
 *    - Commits are validated upstream so they always fit on one line
 *
 * 2. Failure Handling:
 *    - A malformed record is never an error, only a reason to rebuild
 *    - The next successful run overwrites it
 */
