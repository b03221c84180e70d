use crate::build::BuildConfiguration;
use crate::result::{Result, SkiaccError};

/// gn switches shared by every host.
const COMMON_GN_ARGS: &[&str] = &[
    "skia_enable_gpu=true",
    "skia_use_gl=true",
    "skia_use_system_expat=false",
    "skia_use_system_icu=false",
    "skia_use_system_libjpeg_turbo=false",
    "skia_use_system_libpng=false",
    "skia_use_system_libwebp=false",
    "skia_use_system_zlib=false",
];

/// Bundled font stack used on desktop hosts without system freetype/harfbuzz.
const BUNDLED_FONT_GN_ARGS: &[&str] = &[
    "skia_use_sfntly=false",
    "skia_use_freetype=true",
    "skia_use_harfbuzz=true",
    "skia_pdf_subset_harfbuzz=true",
    "skia_use_system_freetype2=false",
    "skia_use_system_harfbuzz=false",
    "target_cpu=\"x64\"",
];

pub const WIN_VC: &str = "C:\\Program Files (x86)\\Microsoft Visual Studio\\2019\\Community\\VC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    MacOs,
    Linux,
}

impl HostPlatform {
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(HostPlatform::Windows),
            "macos" => Ok(HostPlatform::MacOs),
            "linux" => Ok(HostPlatform::Linux),
            other => Err(SkiaccError::UnsupportedPlatform(other.to_string().into())),
        }
    }

    pub fn toolchain(&self) -> &'static PlatformToolchain {
        match self {
            HostPlatform::Windows => &WINDOWS,
            HostPlatform::MacOs => &MACOS,
            HostPlatform::Linux => &LINUX,
        }
    }
}

/// Per-host conventions for locating tools and composing gn arguments.
pub struct PlatformToolchain {
    pub name: &'static str,
    /// gn launcher file name inside the depot_tools checkout.
    pub gn: &'static str,
    pub gclient: &'static str,
    pub ninja: &'static str,
    pub python: &'static str,
    pub python_args: &'static [&'static str],
    pub bundled_fonts: bool,
    host_args: fn(&BuildConfiguration) -> Vec<String>,
}

static WINDOWS: PlatformToolchain = PlatformToolchain {
    name: "Win32",
    gn: "gn.bat",
    gclient: "gclient.bat",
    ninja: "ninja.exe",
    python: "py",
    python_args: &["-3"],
    bundled_fonts: true,
    host_args: windows_args,
};

static MACOS: PlatformToolchain = PlatformToolchain {
    name: "MacOS",
    gn: "gn",
    gclient: "gclient",
    ninja: "ninja",
    python: "python3",
    python_args: &[],
    bundled_fonts: true,
    host_args: macos_args,
};

static LINUX: PlatformToolchain = PlatformToolchain {
    name: "Linux",
    gn: "gn",
    gclient: "gclient",
    ninja: "ninja",
    python: "python3",
    python_args: &[],
    bundled_fonts: false,
    host_args: no_host_args,
};

/** Quotes a Windows directory as a gn string literal
 *
 * # Notes
 * - gn reads `\"` as an escaped quote, so trailing separators are dropped
 *   before the closing quote is added
 * - Inner backslashes are kept as-is
 */
fn gn_dir_literal(dir: &str) -> String {
    format!("\"{}\"", dir.trim_end_matches(['\\', '/']))
}

fn windows_args(config: &BuildConfiguration) -> Vec<String> {
    vec![
        format!(
            "clang_win={}",
            gn_dir_literal(&config.toolchain.llvm_win.to_string_lossy())
        ),
        format!("win_vc={}", gn_dir_literal(WIN_VC)),
        "extra_cflags=[\"-MD\"]".to_string(),
    ]
}

fn no_host_args(_config: &BuildConfiguration) -> Vec<String> {
    Vec::new()
}

fn macos_args(_config: &BuildConfiguration) -> Vec<String> {
    vec![
        "extra_cflags=[\"-stdlib=libc++\", \"-mmacosx-version-min=10.9\"]".to_string(),
        "extra_cflags_cc=[\"-frtti\"]".to_string(),
    ]
}

impl PlatformToolchain {
    /// Builds the value passed to `gn gen --args=`.
    pub fn gn_args(&self, config: &BuildConfiguration) -> String {
        let mut args = vec![
            format!("is_debug={}", config.debug),
            "is_official_build=true".to_string(),
        ];

        args.extend(
            config
                .modules
                .iter()
                .filter_map(|module| module.gn_arg())
                .map(str::to_string),
        );

        if config.shared {
            args.push("is_component_build=true".to_string());
        }

        if let Some(extra) = &config.extra_args {
            args.push(extra.clone());
        }

        args.extend(COMMON_GN_ARGS.iter().map(|arg| arg.to_string()));

        if self.bundled_fonts {
            args.extend(BUNDLED_FONT_GN_ARGS.iter().map(|arg| arg.to_string()));
        }

        args.extend((self.host_args)(config));
        args.join(" ")
    }

    /// `skia` plus one ninja target per selected module.
    pub fn ninja_targets(&self, config: &BuildConfiguration) -> Vec<String> {
        std::iter::once("skia".to_string())
            .chain(config.modules.iter().map(|m| m.ninja_target().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{BuildRequest, DefaultsFile};

    fn config(request: BuildRequest) -> BuildConfiguration {
        BuildConfiguration::resolve(&request, &DefaultsFile::default()).unwrap()
    }

    #[test]
    fn unknown_host_is_unsupported() {
        assert_eq!(HostPlatform::from_os("linux").unwrap(), HostPlatform::Linux);
        assert_eq!(HostPlatform::from_os("macos").unwrap(), HostPlatform::MacOs);
        assert_eq!(HostPlatform::from_os("windows").unwrap(), HostPlatform::Windows);

        let err = HostPlatform::from_os("freebsd").unwrap_err();
        assert!(matches!(err, SkiaccError::UnsupportedPlatform(_)));
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn linux_release_static_args() {
        let args = HostPlatform::Linux
            .toolchain()
            .gn_args(&config(BuildRequest::default()));

        assert!(args.starts_with("is_debug=false is_official_build=true skia_enable_gpu=true"));
        assert!(!args.contains("is_component_build"));
        assert!(!args.contains("target_cpu"));
        assert!(args.ends_with("skia_use_system_zlib=false"));
    }

    #[test]
    fn debug_shared_and_extra_args_are_forwarded() {
        let args = HostPlatform::Linux.toolchain().gn_args(&config(BuildRequest {
            debug: true,
            shared: true,
            extra_args: Some("skia_use_vulkan=true".into()),
            ..Default::default()
        }));

        assert!(args.contains("is_debug=true"));
        assert!(args.contains("is_component_build=true"));
        assert!(args.contains("skia_use_vulkan=true"));
    }

    #[test]
    fn module_switches_only_for_modules_that_have_them() {
        let args = HostPlatform::Linux.toolchain().gn_args(&config(BuildRequest {
            modules: vec!["svg".into(), "canvaskit".into()],
            ..Default::default()
        }));

        assert!(args.contains("skia_enable_svg=true"));
        assert!(!args.contains("canvaskit"));
    }

    #[test]
    fn windows_args_carry_llvm_and_vc_paths() {
        let args = HostPlatform::Windows.toolchain().gn_args(&config(BuildRequest {
            llvm_win: Some("D:\\LLVM".into()),
            ..Default::default()
        }));

        assert!(args.contains("clang_win=\"D:\\LLVM\""));
        assert!(args.contains("win_vc=\""));
        assert!(args.contains("target_cpu=\"x64\""));
        assert!(args.ends_with("extra_cflags=[\"-MD\"]"));
    }

    #[test]
    fn windows_dir_literals_close_their_quotes() {
        let args = HostPlatform::Windows
            .toolchain()
            .gn_args(&config(BuildRequest::default()));

        assert!(args.contains("\\VC\""));
        assert!(!args.contains("\\VC\\\""));

        let args = HostPlatform::Windows.toolchain().gn_args(&config(BuildRequest {
            llvm_win: Some("D:\\LLVM\\".into()),
            ..Default::default()
        }));

        assert!(args.contains("clang_win=\"D:\\LLVM\" "));
    }

    #[test]
    fn macos_args_use_libcxx() {
        let args = HostPlatform::MacOs
            .toolchain()
            .gn_args(&config(BuildRequest::default()));

        assert!(args.contains("-stdlib=libc++"));
        assert!(args.contains("extra_cflags_cc=[\"-frtti\"]"));
        assert!(!args.contains("clang_win"));
    }

    #[test]
    fn ninja_targets_start_with_skia() {
        let targets = HostPlatform::Linux.toolchain().ninja_targets(&config(BuildRequest {
            all_modules: true,
            ..Default::default()
        }));

        assert_eq!(
            targets,
            vec!["skia", "particles", "skottie", "skparagraph", "skshaper", "svg"]
        );
    }
}
