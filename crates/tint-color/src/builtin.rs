//! Named preset themes.
//!
//! `default` is the bare palette with no explicit foreground or background,
//! which is what a caller gets without any configuration at all.

use crate::palette::Theme;

fn theme(foreground: &str, background: &str) -> Theme {
    Theme {
        foreground: Some(foreground.to_owned()),
        background: Some(background.to_owned()),
        ..Theme::default()
    }
}

fn xterm() -> Theme {
    let s = |v: &str| Some(v.to_owned());
    Theme {
        foreground: s("#000000"),
        background: s("#ffffff"),
        black: s("#000000"),
        red: s("#cd0000"),
        green: s("#00cd00"),
        yellow: s("#cdcd00"),
        blue: s("#0000ee"),
        magenta: s("#cd00cd"),
        cyan: s("#00cdcd"),
        white: s("#e5e5e5"),
        gray: s("#7f7f7f"),
        bright_red: s("#ff0000"),
        bright_green: s("#00ff00"),
        bright_yellow: s("#ffff00"),
        bright_blue: s("#5c5cff"),
        bright_magenta: s("#ff00ff"),
        bright_cyan: s("#00ffff"),
        bright_white: s("#ffffff"),
    }
}

/// Look up a builtin theme by name.
///
/// Returns `None` if the name is not recognized.
#[must_use]
pub fn builtin_theme(name: &str) -> Option<Theme> {
    Some(match name {
        "default" => Theme::default(),
        "one-dark" => theme("#abb2bf", "#23272e"),
        "xterm" => xterm(),
        _ => return None,
    })
}

/// List all available builtin theme names.
#[must_use]
pub const fn builtin_names() -> &'static [&'static str] {
    &["default", "one-dark", "xterm"]
}

// ─── Tests ───────────────────────────────────────────────────────────────────
