// SPDX-License-Identifier: MIT
//
// Renders a self-contained HTML showcase of everything the converter does.
//
//   cargo run -p tint-markup --example demo > demo.html
//   cargo run -p tint-markup --example demo -- class > demo.html

use std::fmt::Write as _;
use std::io::{self, Write};

use tint_markup::{Converter, Mode, Options, Theme};

const NAMES: [&str; 8] = ["black", "red", "green", "yellow", "blue", "magenta", "cyan", "white"];

fn sample() -> String {
    let mut s = String::new();

    s.push_str("\x1b[1mSGR attributes\x1b[m\n");
    for (code, name) in [(1, "bold"), (2, "dim"), (3, "italic"), (4, "underline"), (7, "inverse"), (8, "hidden"), (9, "strike")] {
        let _ = writeln!(s, "  \x1b[{code}m{name:<10}\x1b[m SGR {code}");
    }

    s.push_str("\n\x1b[1mANSI colors\x1b[m\n");
    for (i, name) in NAMES.iter().enumerate() {
        let _ = writeln!(
            s,
            "  \x1b[{}m{name:<8}\x1b[m \x1b[{}m{name:<8}\x1b[m \x1b[1;{}mbold\x1b[m \x1b[{}m  bg  \x1b[m \x1b[{}m  bright  \x1b[m",
            30 + i,
            90 + i,
            30 + i,
            40 + i,
            100 + i,
        );
    }

    s.push_str("\n\x1b[1m256-color cube\x1b[m\n");
    for row in 0..6 {
        s.push_str("  ");
        for col in 0..36 {
            let _ = write!(s, "\x1b[48;5;{}m ", 16 + row * 36 + col);
        }
        s.push_str("\x1b[m\n");
    }
    s.push_str("  ");
    for gray in 232..256 {
        let _ = write!(s, "\x1b[48;5;{gray}m  ");
    }
    s.push_str("\x1b[m\n");

    s.push_str("\n\x1b[1mTrue color\x1b[m\n  ");
    for step in 0..64u32 {
        let r = 255 - step * 4;
        let g = step * 4;
        let _ = write!(s, "\x1b[48;2;{r};{g};128m ");
    }
    s.push_str("\x1b[m\n");

    s.push_str("\n\x1b[1mContrast\x1b[m\n");
    s.push_str("  \x1b[31;41m red on red \x1b[m \x1b[92;107m green on white \x1b[m \x1b[30;40m black on black \x1b[m\n");

    s.push_str("\n\x1b[1mHyperlinks\x1b[m\n");
    s.push_str("  \x1b]8;id=docs;https://en.wikipedia.org/wiki/ANSI_escape_code\x1b\\\x1b[4;34mANSI escape codes\x1b[m\x1b]8;;\x1b\\\n");
    s.push_str("  \x1b]8;;https://example.com\x07<escaped> & \"quoted\"\x1b]8;;\x07\n");
    s
}

const CLASS_CSS: &str = "\
.ansi-bold { font-weight: bold; }
.ansi-dim { opacity: 0.5; }
.ansi-italic { font-style: italic; }
.ansi-underline { text-decoration: underline; }
.ansi-strike { text-decoration: line-through; }
.ansi-hidden { opacity: 0; }
.ansi-fg-inverse { color: #23272e; }
.ansi-bg-inverse { background-color: #abb2bf; }
";

fn class_colors(converter: &Converter) -> String {
    let mut css = String::new();
    for i in 0..converter.palette().len() {
        if let Some(rgb) = converter.palette().color(i) {
            let _ = writeln!(css, ".ansi-fg-{i} {{ color: {rgb}; }}");
            let _ = writeln!(css, ".ansi-bg-{i} {{ background-color: {rgb}; }}");
        }
    }
    css
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mode = match std::env::args().nth(1).as_deref() {
        Some("class") => Mode::Class,
        _ => Mode::Inline,
    };
    let mut converter = Converter::new(Options {
        mode,
        theme: Theme {
            foreground: Some("#abb2bf".into()),
            background: Some("#23272e".into()),
            ..Theme::default()
        },
        ..Options::default()
    })?;

    let body = converter.convert_str(&sample())?;
    let css = match mode {
        Mode::Class => format!("{CLASS_CSS}{}", class_colors(&converter)),
        Mode::Inline => String::new(),
    };

    let mut out = io::stdout().lock();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html><head><meta charset=\"utf-8\"><title>tint demo</title>")?;
    writeln!(
        out,
        "<style>body {{ background: #23272e; color: #abb2bf; }} pre {{ font-family: monospace; }}\n{css}</style>"
    )?;
    writeln!(out, "</head><body><pre>{body}</pre></body></html>")?;
    Ok(())
}
