#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use datapackage_qmd::{OutputMode, RenderOptions, StyleOptions, Target};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "datapackage-qmd", version, about)]
struct Cli {
    /// Datapackage descriptor (`-` reads stdin)
    #[arg(value_name = "INPUT", default_value = "datapackage.json")]
    input: String,

    /// Output file (combined) or directory (per-resource)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[arg(long = "mode", value_enum, default_value_t = ModeArg::Combined)]
    mode: ModeArg,

    #[arg(long = "target", value_enum, default_value_t = TargetArg::Latex)]
    target: TargetArg,

    /// Brand key, emits `assets/<KEY>/header.png` as the page header
    #[arg(long = "identity", value_name = "KEY")]
    identity: Option<String>,

    #[arg(long = "project", value_name = "NAME")]
    project: Option<String>,

    #[arg(long = "include-in-header", value_name = "FILE")]
    include_in_header: Option<String>,

    #[arg(long = "font-size", value_name = "SIZE")]
    font_size: Option<String>,

    #[arg(long = "linestretch", value_name = "FACTOR")]
    linestretch: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Combined,
    PerResource,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    Latex,
    Markdown,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Combined => OutputMode::Combined,
            ModeArg::PerResource => OutputMode::PerResource,
        }
    }
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Latex => Target::Latex,
            TargetArg::Markdown => Target::Markdown,
        }
    }
}

fn read_input(path: &str) -> io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn default_output(mode: OutputMode) -> PathBuf {
    match mode {
        OutputMode::Combined => PathBuf::from("datapackage.qmd"),
        OutputMode::PerResource => PathBuf::from("."),
    }
}

fn style_options(cli: &Cli) -> StyleOptions {
    let mut style = StyleOptions::default();
    if let Some(file) = &cli.include_in_header {
        style.include_in_header = file.clone();
    }
    if let Some(size) = &cli.font_size {
        style.font_size = size.clone();
    }
    if let Some(stretch) = cli.linestretch {
        style.linestretch = stretch;
    }
    style
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "datapackage_qmd=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let input = read_input(&cli.input).with_context(|| format!("could not read {}", cli.input))?;

    let package = match input_kind(&cli.input) {
        InputKind::Json => datapackage_qmd::parse_json(&input),
        InputKind::Yaml => datapackage_qmd::parse_yaml(&input),
        InputKind::Auto => datapackage_qmd::parse_json(&input)
            .or_else(|_| datapackage_qmd::parse_yaml(&input)),
    }
    .with_context(|| format!("could not load {}", cli.input))?;

    let mode = OutputMode::from(cli.mode);
    let options = RenderOptions::new(cli.target.into(), cli.identity.clone(), cli.project.clone())
        .with_style(style_options(&cli));
    let output = cli.output.clone().unwrap_or_else(|| default_output(mode));

    let documents = datapackage_qmd::render_documents(&package, &options, mode, &output)
        .with_context(|| format!("nothing written for {}", cli.input))?;
    datapackage_qmd::write_documents(&documents, |path| {
        println!("Escribí: {}", path.display());
    })?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum InputKind {
    Json,
    Yaml,
    Auto,
}

fn input_kind(path: &str) -> InputKind {
    let lower = path.to_ascii_lowercase();
    if lower == "-" {
        return InputKind::Auto;
    }
    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        return InputKind::Yaml;
    }
    InputKind::Json
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_kind_detects_extensions() {
        assert!(matches!(input_kind("-"), InputKind::Auto));
        assert!(matches!(input_kind("datapackage.yaml"), InputKind::Yaml));
        assert!(matches!(input_kind("datapackage.YML"), InputKind::Yaml));
        assert!(matches!(input_kind("datapackage.json"), InputKind::Json));
        assert!(matches!(input_kind("descriptor"), InputKind::Json));
    }

    #[test]
    fn default_output_depends_on_mode() {
        assert_eq!(default_output(OutputMode::Combined), PathBuf::from("datapackage.qmd"));
        assert_eq!(default_output(OutputMode::PerResource), PathBuf::from("."));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "datapackage-qmd",
            "dp.json",
            "out",
            "--mode",
            "per-resource",
            "--target",
            "markdown",
            "--identity",
            "linea",
            "--linestretch",
            "1.5",
        ])
        .expect("parse");
        assert_eq!(cli.input, "dp.json");
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(matches!(cli.mode, ModeArg::PerResource));
        assert!(matches!(cli.target, TargetArg::Markdown));
        assert_eq!(style_options(&cli).linestretch, 1.5);
    }
}
