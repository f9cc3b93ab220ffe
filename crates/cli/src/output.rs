//! Terminal output for rbuild.
//!
//! Results go to stdout, progress and problems to stderr, so `--output json`
//! leaves stdout holding a single JSON document.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
  Success,
  Info,
  Step,
  Warning,
  Error,
}

impl Tone {
  fn symbol(self) -> &'static str {
    match self {
      Tone::Success => "✓",
      Tone::Info => "•",
      Tone::Step => "→",
      Tone::Warning => "⚠",
      Tone::Error => "✗",
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Tone::Success => AnsiColors::Green,
      Tone::Info => AnsiColors::Blue,
      Tone::Step => AnsiColors::Cyan,
      Tone::Warning => AnsiColors::Yellow,
      Tone::Error => AnsiColors::Red,
    }
  }

  fn on_stderr(self) -> bool {
    matches!(self, Tone::Step | Tone::Warning | Tone::Error)
  }
}

fn emit(tone: Tone, message: &str) {
  let stream = if tone.on_stderr() { Stream::Stderr } else { Stream::Stdout };
  let symbol_text = tone.symbol();
  let symbol = symbol_text.if_supports_color(stream, |s| s.color(tone.color()));
  let text = match tone {
    Tone::Warning | Tone::Error => message.if_supports_color(stream, |m| m.color(tone.color())).to_string(),
    Tone::Step => message.if_supports_color(stream, |m| m.bold()).to_string(),
    Tone::Success | Tone::Info => message.to_string(),
  };
  if tone.on_stderr() {
    eprintln!("{} {}", symbol, text);
  } else {
    println!("{} {}", symbol, text);
  }
}

pub fn print_success(message: &str) {
  emit(Tone::Success, message);
}

pub fn print_info(message: &str) {
  emit(Tone::Info, message);
}

/// Announces the start of a pipeline run, e.g. `→ Building 'production' from ./app`.
pub fn print_step(message: &str) {
  emit(Tone::Step, message);
}

pub fn print_warning(message: &str) {
  emit(Tone::Warning, message);
}

pub fn print_error(message: &str) {
  emit(Tone::Error, message);
}

/// Indented `label: value` line under a result.
pub fn print_field(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |l| l.dimmed()), value);
}

/// One archived path per line, as `rbuild package --list` shows them.
pub fn print_entries<'a>(entries: impl IntoIterator<Item = &'a String>) {
  for entry in entries {
    println!("    {}", entry);
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
  println!("{}", json);
  Ok(())
}

/// First 12 hex digits of an archive digest.
pub fn short_digest(digest: &str) -> &str {
  digest.get(..12).unwrap_or(digest)
}

/// Archive size with its file count, e.g. `2.4 MiB, 318 files`.
pub fn describe_archive(size: u64, files: usize) -> String {
  let noun = if files == 1 { "file" } else { "files" };
  format!("{}, {} {}", format_size(size), files, noun)
}

pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
  if bytes < 1024 {
    return format!("{} B", bytes);
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", value, UNITS[unit])
}

/// Wall time of a run, e.g. `12.3s` or `2m 05s`.
pub fn format_elapsed(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  if secs >= 60 {
    format!("{}m {:02}s", secs / 60, secs % 60)
  } else {
    format!("{:.1}s", elapsed.as_secs_f64())
  }
}
