// SPDX-License-Identifier: MIT
//
// tint: convert ANSI-styled terminal output into HTML markup.
//
// This is the binary that wires the two library crates to the outside
// world:
//
//   tint-color  → palettes, builtin themes, contrast math
//   tint-markup → the streaming converter
//
// Data flow:
//
//   file | stdin ─▶ Converter ─▶ BufWriter ─▶ file | stdout
//
// Ctrl-C trips the converter's cancel token; the partial output written so
// far is flushed and the process exits with status 1.

mod config;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process;

use clap::Parser;
use tint_color::builtin::builtin_names;
use tint_markup::{CancelToken, Converter};

use config::{CliArgs, Config};

// ─── Conversion ─────────────────────────────────────────────────────────────

/// Run one conversion from `src` to `dst` with the given configuration.
fn convert_stream<R: Read, W: Write>(
    config: &Config,
    src: R,
    dst: W,
    cancel: &CancelToken,
) -> Result<(), Box<dyn Error>> {
    let mut converter = Converter::new(config.options()?)?;
    converter.convert_with_cancel(src, dst, cancel)?;
    log::debug!("done, {} contrast adjustments cached", converter.cached_contrasts());
    Ok(())
}

fn open_input(args: &CliArgs) -> io::Result<Box<dyn Read>> {
    Ok(match args.input_path() {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    })
}

fn open_output(args: &CliArgs) -> io::Result<Box<dyn Write>> {
    Ok(match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    })
}

fn run(args: &CliArgs) -> Result<(), Box<dyn Error>> {
    if args.list_themes {
        let mut out = io::stdout().lock();
        for name in builtin_names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let config = Config::load_with_args(args)?;
    log::debug!("mode {:?}, theme {:?}", config.mode, config.theme);

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("cannot install Ctrl-C handler: {e}");
    }

    let src = open_input(args)?;
    let dst = BufWriter::new(open_output(args)?);
    convert_stream(&config, src, dst, &cancel)
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("tint: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(config: &Config, input: &str) -> Result<String, Box<dyn Error>> {
        let mut out = Vec::new();
        convert_stream(config, input.as_bytes(), &mut out, &CancelToken::new())?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn default_config_renders_inline() {
        let out = convert(&Config::default(), "\x1b[31mred\x1b[0m plain").unwrap();
        assert_eq!(out, "<span style=\"color:#e05561\">red</span> plain");
    }

    #[test]
    fn class_mode_from_toml() {
        let config = Config::from_toml("mode = \"class\"\nclass-prefix = \"t-\"").unwrap();
        let out = convert(&config, "\x1b[1mbold").unwrap();
        assert_eq!(out, "<span class=\"t-bold\">bold</span>");
    }

    #[test]
    fn escaping_follows_config() {
        let mut config = Config::default();
        assert_eq!(convert(&config, "a<b").unwrap(), "a&lt;b");
        config.escape_html = false;
        assert_eq!(convert(&config, "a<b").unwrap(), "a<b");
    }

    #[test]
    fn bad_theme_color_is_reported() {
        let config = Config::from_toml("[colors]\nred = \"not-a-color\"").unwrap();
        let err = convert(&config, "x").unwrap_err();
        assert!(err.to_string().contains("red"), "{err}");
    }

    #[test]
    fn cancelled_token_stops_conversion() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let err = convert_stream(&Config::default(), "abc".as_bytes(), &mut out, &cancel).unwrap_err();
        assert!(err.to_string().contains("cancel"), "{err}");
    }
}
