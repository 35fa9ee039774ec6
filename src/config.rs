// SPDX-License-Identifier: MIT
//
// Configuration for the tint binary.
//
// Three layers, later ones winning field by field:
//
//   defaults ─▶ TOML file (-c) ─▶ command-line flags
//
// The theme is resolved last: the builtin named by `theme` supplies the
// base colors, then any explicit `[colors]` entries replace single slots.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use tint_color::builtin::{builtin_names, builtin_theme};
use tint_color::Theme;
use tint_markup::{Mode, Options};

/// Highest ratio WCAG contrast can reach (white on black).
const MAX_CONTRAST_RATIO: f64 = 21.0;

// ─── Command line ───────────────────────────────────────────────────────────

/// Convert ANSI-styled terminal output into HTML.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tint")]
#[command(version)]
#[command(about = "Convert ANSI-styled terminal output into HTML markup", long_about = None)]
pub struct CliArgs {
    /// Input file; reads stdin when absent or `-`
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Write markup to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Builtin theme name (see --list-themes)
    #[arg(short, long, value_name = "NAME")]
    pub theme: Option<String>,

    /// Render styles inline or as CSS classes
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,

    /// Prefix for generated class names
    #[arg(long, value_name = "PREFIX")]
    pub class_prefix: Option<String>,

    /// Minimum foreground/background contrast ratio (1 disables)
    #[arg(long, value_name = "RATIO")]
    pub min_contrast: Option<f64>,

    /// Pass `< > & " '` through unescaped
    #[arg(long)]
    pub no_escape: bool,

    /// Print the builtin theme names and exit
    #[arg(long)]
    pub list_themes: bool,
}

impl CliArgs {
    /// The input path, with `-` folded into stdin.
    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|p| *p != Path::new("-"))
    }
}

/// `--mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Inline,
    Class,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Inline => Self::Inline,
            ModeArg::Class => Self::Class,
        }
    }
}

// ─── Errors ─────────────────────────────────────────────────────────────────

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub message: String,
    pub field: Option<String>,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), field: None }
    }

    fn field(field: &str, message: impl Into<String>) -> Self {
        Self { message: message.into(), field: Some(field.to_owned()) }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "config error in '{field}': {}", self.message),
            None => write!(f, "config error: {}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Config file ────────────────────────────────────────────────────────────

/// Settings as they appear in the TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    pub mode: Mode,
    pub class_prefix: String,
    pub minimum_contrast_ratio: f64,
    pub escape_html: bool,
    /// Builtin theme supplying the base colors.
    pub theme: String,
    /// Per-slot overrides applied on top of `theme`.
    pub colors: Theme,
}

impl Default for Config {
    fn default() -> Self {
        let options = Options::default();
        Self {
            mode: options.mode,
            class_prefix: options.class_prefix,
            minimum_contrast_ratio: options.minimum_contrast_ratio,
            escape_html: options.escape_html,
            theme: "default".to_owned(),
            colors: Theme::default(),
        }
    }
}

impl Config {
    /// Load configuration with precedence CLI > file > defaults.
    ///
    /// An explicitly named config file that cannot be read or parsed is an
    /// error.
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!("failed to read {}: {e}", path.display()))
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("failed to parse: {e}")))
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if let Some(mode) = args.mode {
            self.mode = mode.into();
        }
        if let Some(prefix) = &args.class_prefix {
            self.class_prefix.clone_from(prefix);
        }
        if let Some(ratio) = args.min_contrast {
            self.minimum_contrast_ratio = ratio;
        }
        if args.no_escape {
            self.escape_html = false;
        }
        if let Some(theme) = &args.theme {
            self.theme.clone_from(theme);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ratio = self.minimum_contrast_ratio;
        if !ratio.is_finite() || ratio > MAX_CONTRAST_RATIO {
            return Err(ConfigError::field(
                "minimum-contrast-ratio",
                format!("{ratio} is not a ratio between 0 and {MAX_CONTRAST_RATIO}"),
            ));
        }
        if self.class_prefix.chars().any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '&')) {
            return Err(ConfigError::field(
                "class-prefix",
                format!("{:?} contains characters not allowed in a class name", self.class_prefix),
            ));
        }
        if builtin_theme(&self.theme).is_none() {
            return Err(ConfigError::field(
                "theme",
                format!("unknown theme {:?} (available: {})", self.theme, builtin_names().join(", ")),
            ));
        }
        Ok(())
    }

    /// The named builtin theme with `[colors]` applied over it.
    pub fn resolved_theme(&self) -> Result<Theme, ConfigError> {
        builtin_theme(&self.theme)
            .map(|base| base.merged_with(&self.colors))
            .ok_or_else(|| ConfigError::field("theme", format!("unknown theme {:?}", self.theme)))
    }

    /// Converter options for this configuration.
    pub fn options(&self) -> Result<Options, ConfigError> {
        Ok(Options {
            mode: self.mode,
            class_prefix: self.class_prefix.clone(),
            minimum_contrast_ratio: self.minimum_contrast_ratio,
            escape_html: self.escape_html,
            theme: self.resolved_theme()?,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("tint").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_match_converter_defaults() {
        let options = Config::default().options().unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn toml_keys_are_kebab_case() {
        let config = Config::from_toml(
            r##"
            mode = "class"
            class-prefix = "term-"
            minimum-contrast-ratio = 4.5
            escape-html = false
            theme = "one-dark"

            [colors]
            red = "#ff0000"
            bright-blue = "rgb(0, 0, 255)"
            "##,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Class);
        assert_eq!(config.class_prefix, "term-");
        assert!((config.minimum_contrast_ratio - 4.5).abs() < f64::EPSILON);
        assert!(!config.escape_html);
        assert_eq!(config.theme, "one-dark");
        assert_eq!(config.colors.red.as_deref(), Some("#ff0000"));
        assert_eq!(config.colors.bright_blue.as_deref(), Some("rgb(0, 0, 255)"));
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let config = Config::from_toml("theme = \"xterm\"").unwrap();
        assert_eq!(config.mode, Mode::Inline);
        assert_eq!(config.class_prefix, "ansi-");
        assert!(config.escape_html);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Config::from_toml("colour = 1").is_err());
    }

    #[test]
    fn cli_overrides_file() {
        let mut config = Config::from_toml("mode = \"class\"\nminimum-contrast-ratio = 4.5").unwrap();
        config.apply_cli_args(&args(&["--mode", "inline", "--min-contrast", "1", "--no-escape"]));
        assert_eq!(config.mode, Mode::Inline);
        assert!((config.minimum_contrast_ratio - 1.0).abs() < f64::EPSILON);
        assert!(!config.escape_html);
    }

    #[test]
    fn absent_flags_leave_file_values() {
        let mut config = Config::from_toml("class-prefix = \"x-\"\ntheme = \"xterm\"").unwrap();
        config.apply_cli_args(&args(&[]));
        assert_eq!(config.class_prefix, "x-");
        assert_eq!(config.theme, "xterm");
    }

    #[test]
    fn colors_override_builtin_slot_by_slot() {
        let config = Config::from_toml(
            "theme = \"one-dark\"\n[colors]\nforeground = \"white\"",
        )
        .unwrap();
        let theme = config.resolved_theme().unwrap();
        let base = builtin_theme("one-dark").unwrap();
        assert_eq!(theme.foreground.as_deref(), Some("white"));
        assert_eq!(theme.background, base.background);
        assert_eq!(theme.red, base.red);
    }

    #[test]
    fn unknown_theme_names_the_field() {
        let err = Config::load_with_args(&args(&["-t", "nope"])).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("theme"));
        assert!(err.to_string().contains("one-dark"));
    }

    #[test]
    fn contrast_ratio_out_of_range() {
        for bad in ["22", "NaN", "inf"] {
            let err = Config::load_with_args(&args(&["--min-contrast", bad])).unwrap_err();
            assert_eq!(err.field.as_deref(), Some("minimum-contrast-ratio"), "{bad}");
        }
        assert!(Config::load_with_args(&args(&["--min-contrast", "0"])).is_ok());
    }

    #[test]
    fn class_prefix_rejects_markup_characters() {
        let err = Config::load_with_args(&args(&["--class-prefix", "a b"])).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("class-prefix"));
        assert!(Config::load_with_args(&args(&["--class-prefix", "t_"])).is_ok());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = Config::load_from_file(Path::new("/nonexistent/tint.toml")).unwrap_err();
        assert!(err.to_string().starts_with("config error: failed to read"));
    }

    #[test]
    fn dash_means_stdin() {
        assert_eq!(args(&["-"]).input_path(), None);
        assert_eq!(args(&[]).input_path(), None);
        assert_eq!(args(&["in.txt"]).input_path(), Some(Path::new("in.txt")));
    }
}
