use crate::result::SkiaccError;
use std::fmt;
use std::str::FromStr;

/// Optional Skia extension component, restricted to a fixed whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Module {
    AudioPlayer,
    CanvasKit,
    Particles,
    PathKit,
    Skottie,
    SkParagraph,
    SkPlainTextEditor,
    SkResources,
    SkSg,
    SkShaper,
    Svg,
}

impl Module {
    pub const ALL: [Module; 11] = [
        Module::AudioPlayer,
        Module::CanvasKit,
        Module::Particles,
        Module::PathKit,
        Module::Skottie,
        Module::SkParagraph,
        Module::SkPlainTextEditor,
        Module::SkResources,
        Module::SkSg,
        Module::SkShaper,
        Module::Svg,
    ];

    /// Modules enabled by `--all-modules`.
    pub const BUNDLE: [Module; 5] = [
        Module::Particles,
        Module::Skottie,
        Module::SkParagraph,
        Module::SkShaper,
        Module::Svg,
    ];

    pub const NAMES: &'static str = "audioplayer, canvaskit, particles, pathkit, skottie, \
         skparagraph, skplaintexteditor, skresources, sksg, skshaper, svg";

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::AudioPlayer => "audioplayer",
            Module::CanvasKit => "canvaskit",
            Module::Particles => "particles",
            Module::PathKit => "pathkit",
            Module::Skottie => "skottie",
            Module::SkParagraph => "skparagraph",
            Module::SkPlainTextEditor => "skplaintexteditor",
            Module::SkResources => "skresources",
            Module::SkSg => "sksg",
            Module::SkShaper => "skshaper",
            Module::Svg => "svg",
        }
    }

    /// The `skia_enable_*` gn switch, for modules that have one.
    pub fn gn_arg(&self) -> Option<&'static str> {
        match self {
            Module::Particles => Some("skia_enable_particles=true"),
            Module::Skottie => Some("skia_enable_skottie=true"),
            Module::SkParagraph => Some("skia_enable_skparagraph=true"),
            Module::SkShaper => Some("skia_enable_skshaper=true"),
            Module::Svg => Some("skia_enable_svg=true"),
            _ => None,
        }
    }

    pub fn ninja_target(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for Module {
    type Err = SkiaccError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Module::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| SkiaccError::InvalidModule(name.to_string(), Module::NAMES))
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
