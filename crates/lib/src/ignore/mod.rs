//! Exclusion patterns for packaging.
//!
//! The effective [`IgnoreSet`] is layered:
//!
//! 1. `.easignore` at the project root, if it exists, *replaces* the built-in defaults.
//! 2. Otherwise [`DEFAULT_PATTERNS`] apply.
//! 3. Caller-supplied patterns are appended to whichever base was chosen.
//!
//! Patterns are globs (`*`, `?`, `[..]`, `**`), matched case-sensitively against
//! `/`-separated paths relative to the project root. A pattern without an inner `/`
//! matches at any depth; a pattern with one is anchored at the root. A trailing `/`
//! restricts the pattern to directories and everything beneath them. Dot-prefixed
//! entries get no special treatment.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};

use crate::consts::IGNORE_FILENAME;

/// Built-in exclusions used when the project has no `.easignore`.
pub const DEFAULT_PATTERNS: &[&str] = &[
  // dependencies
  "node_modules/",
  // version control
  ".git/",
  ".hg/",
  ".svn/",
  // platform build output
  "android/build/",
  "android/app/build/",
  "android/.gradle/",
  "android/.cxx/",
  "ios/build/",
  "ios/Pods/",
  // logs
  "*.log",
  // editor metadata
  ".idea/",
  ".vscode/",
  ".DS_Store",
  "*.swp",
  // prebuild caches
  ".expo/",
  ".expo-shared/",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: true,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Where the base patterns of an [`IgnoreSet`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreSource {
  /// The project's own override file.
  ProjectFile(PathBuf),
  /// [`DEFAULT_PATTERNS`].
  Defaults,
}

#[derive(Debug, Clone)]
struct IgnoreRule {
  /// The pattern as written.
  raw: String,
  /// Compiled glob for the entry itself.
  entry: Pattern,
  /// Compiled `<entry>/**` for directory rules.
  beneath: Option<Pattern>,
}

impl IgnoreRule {
  fn parse(raw: &str) -> Result<Self, glob::PatternError> {
    let trimmed = raw.trim();
    let dir_only = trimmed.ends_with('/');
    let body = trimmed.trim_end_matches('/');

    // Anchored patterns start at the root; bare names may appear at any depth.
    let glob = match body.strip_prefix('/') {
      Some(anchored) => anchored.to_string(),
      None if body.contains('/') || body.starts_with("**") => body.to_string(),
      None => format!("**/{}", body),
    };

    let entry = Pattern::new(&glob)?;
    let beneath = if dir_only {
      Some(Pattern::new(&format!("{}/**", glob))?)
    } else {
      None
    };

    Ok(Self {
      raw: trimmed.to_string(),
      entry,
      beneath,
    })
  }

  fn matches(&self, rel: &str, is_dir: bool) -> bool {
    match &self.beneath {
      Some(beneath) => (is_dir && self.entry.matches_with(rel, MATCH_OPTIONS)) || beneath.matches_with(rel, MATCH_OPTIONS),
      None => self.entry.matches_with(rel, MATCH_OPTIONS),
    }
  }
}

/// Ordered exclusion patterns for one packaging run.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
  rules: Vec<IgnoreRule>,
  source: IgnoreSource,
}

impl IgnoreSet {
  /// Build a set from explicit patterns. Invalid globs are skipped with a warning.
  pub fn from_patterns<I, S>(patterns: I, source: IgnoreSource) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut set = Self { rules: Vec::new(), source };
    set.extend(patterns);
    set
  }

  /// The built-in default set.
  pub fn defaults() -> Self {
    Self::from_patterns(DEFAULT_PATTERNS.iter().copied(), IgnoreSource::Defaults)
  }

  /// Append patterns after the existing ones.
  pub fn extend<I, S>(&mut self, patterns: I)
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    for pattern in patterns {
      let pattern = pattern.as_ref();
      if pattern.trim().is_empty() {
        continue;
      }
      match IgnoreRule::parse(pattern) {
        Ok(rule) => self.rules.push(rule),
        Err(e) => warn!(pattern = %pattern, error = %e, "skipping invalid ignore pattern"),
      }
    }
  }

  pub fn source(&self) -> &IgnoreSource {
    &self.source
  }

  /// The patterns in priority order, as written.
  pub fn patterns(&self) -> Vec<&str> {
    self.rules.iter().map(|r| r.raw.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Whether `rel_path` (relative to the project root) is excluded.
  pub fn is_ignored(&self, rel_path: &Path, is_dir: bool) -> bool {
    let Some(rel) = normalize(rel_path) else {
      return false;
    };
    self.rules.iter().any(|rule| rule.matches(&rel, is_dir))
  }
}

/// Join the normal components of a relative path with `/`.
fn normalize(rel_path: &Path) -> Option<String> {
  let parts: Vec<String> = rel_path
    .components()
    .filter_map(|c| match c {
      Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
      _ => None,
    })
    .collect();

  if parts.is_empty() { None } else { Some(parts.join("/")) }
}

/// Parse the contents of an override file: one pattern per line, `#` comments and blank lines skipped.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
  content
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty() && !line.starts_with('#'))
    .map(str::to_string)
    .collect()
}

/// Resolve the effective ignore set for `project_root`.
///
/// Never fails: an unreadable override file is reported and the defaults are used.
pub fn resolve(project_root: &Path, caller_patterns: &[String]) -> IgnoreSet {
  let override_path = project_root.join(IGNORE_FILENAME);

  let mut set = match fs::read_to_string(&override_path) {
    Ok(content) => {
      let patterns = parse_ignore_file(&content);
      info!(path = %override_path.display(), count = patterns.len(), "using project ignore file");
      IgnoreSet::from_patterns(patterns, IgnoreSource::ProjectFile(override_path))
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!("no {} found, using default ignore patterns", IGNORE_FILENAME);
      IgnoreSet::defaults()
    }
    Err(e) => {
      warn!(path = %override_path.display(), error = %e, "could not read ignore file, using defaults");
      IgnoreSet::defaults()
    }
  };

  set.extend(caller_patterns);
  set
}
