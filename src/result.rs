use std::borrow::Cow;
use thiserror::Error;

/** Main Result type alias for skiacc operations
 *
 * # Usage
 * ```no_run
 * use skiacc::result::Result;
 *
 * fn read_cache() -> Result<String> {
 *     // Function automatically propagates SkiaccError
 *     Ok(std::fs::read_to_string("skiacc_cache.txt")?)
 * }
 * ```
 */
pub type Result<T> = std::result::Result<T, SkiaccError>;

/** Error enumeration for skiacc
 *
 * # Error Categories
 * - **Io**: File system operations (cache file, checkouts, log file)
 * - **Process**: External command failures (only surfaced in strict mode)
 * - **Config**: Invalid defaults file or malformed values
 * - **InvalidModule**: Module name outside the whitelist
 * - **IncompatibleFlags**: Flag combinations Skia cannot build
 * - **UnsupportedPlatform**: Host without a toolchain table entry
 * - **InvalidCache**: Cache record that cannot be interpreted
 * - **TomlParse**: `skiacc.toml` parsing failures
 */
#[derive(Error, Debug)]
pub enum SkiaccError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process error: {0}")]
    Process(Cow<'static, str>),

    #[error("Config error: {0}")]
    Config(Cow<'static, str>),

    #[error("Invalid module '{0}'. Valid modules: {1}")]
    InvalidModule(String, &'static str),

    #[error("{0}")]
    IncompatibleFlags(Cow<'static, str>),

    #[error("Unsupported platform '{0}'")]
    UnsupportedPlatform(Cow<'static, str>),

    #[error("Invalid cache: {0}")]
    InvalidCache(Cow<'static, str>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SkiaccError {
    pub const ALL_MODULES_SHARED: &'static str = "Cannot build all modules as a shared library. \
         This configuration is unsupported by Skia. Either remove --shared or --all-modules/-m";

    pub fn process(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Process(msg.into())
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_cache(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidCache(msg.into())
    }

    /// Errors that end the run with a printed message and a zero exit status.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidModule(..)
                | Self::IncompatibleFlags(_)
                | Self::UnsupportedPlatform(_)
                | Self::Config(_)
                | Self::TomlParse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_module_message_names_the_entry() {
        let err = SkiaccError::InvalidModule("opengl".into(), "svg, skottie");
        let msg = err.to_string();
        assert!(msg.contains("'opengl'"));
        assert!(err.is_user_facing());
    }

    #[test]
    fn process_errors_are_not_user_facing() {
        assert!(!SkiaccError::process("ninja failed").is_user_facing());
        assert!(!SkiaccError::invalid_cache("short").is_user_facing());
    }
}
