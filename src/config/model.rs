// src/config/model.rs

use serde::Deserialize;

/// Layout overrides as read from `Assetdag.toml`.
///
/// Every section is optional and defaults to the layout of the `bpy browse`
/// static asset tree:
///
/// ```toml
/// [layout]
/// css_sources = "less/*.less"
/// css_output_dir = "www/css"
/// templates_dir = "templates"
///
/// [[libs]]
/// pattern = "node_modules/jquery/dist/*"
/// dest = ["www/js"]
///
/// [watch]
/// debounce_ms = 100
/// ```
///
/// Declaring any `[[libs]]` entry replaces the default list entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub layout: LayoutSection,

    #[serde(default = "default_libs")]
    pub libs: Vec<LibSection>,

    #[serde(default)]
    pub watch: WatchSection,
}

impl Default for RawConfigFile {
    fn default() -> Self {
        Self {
            layout: LayoutSection::default(),
            libs: default_libs(),
            watch: WatchSection::default(),
        }
    }
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` or [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub layout: LayoutSection,
    pub libs: Vec<LibSection>,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        layout: LayoutSection,
        libs: Vec<LibSection>,
        watch: WatchSection,
    ) -> Self {
        Self {
            layout,
            libs,
            watch,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.layout, raw.libs, raw.watch)
    }
}

/// `[layout]` section. Relative paths are resolved against the project root.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    /// Glob selecting the LESS entry points compiled by the `css` task.
    #[serde(default = "default_css_sources")]
    pub css_sources: String,

    #[serde(default = "default_css_output_dir")]
    pub css_output_dir: String,

    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

fn default_css_sources() -> String {
    "less/*.less".to_string()
}

fn default_css_output_dir() -> String {
    "www/css".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            css_sources: default_css_sources(),
            css_output_dir: default_css_output_dir(),
            templates_dir: default_templates_dir(),
        }
    }
}

/// One `[[libs]]` entry: files matching `pattern` are copied into each
/// directory in `dest`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibSection {
    pub pattern: String,
    pub dest: Vec<String>,
}

fn default_libs() -> Vec<LibSection> {
    vec![
        LibSection {
            pattern: "node_modules/bootstrap/dist/fonts/*".to_string(),
            dest: vec!["www/fonts".to_string()],
        },
        LibSection {
            pattern: "node_modules/jquery/dist/*".to_string(),
            dest: vec!["www/js".to_string()],
        },
    ]
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Quiet period after the last filesystem event before a rebuild fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
