//! # Interface Scanner
//!
//! Walks a Go source tree and collects `type Name interface { ... }`
//! declarations. This is a line scanner, not a Go parser: it recognizes
//! standalone declarations, generic ones (`type Repo[T any] interface {`)
//! and members of grouped `type ( ... )` blocks.
//!
//! Skipped while walking:
//! - hidden directories, `vendor/` and `testdata/`
//! - `_test.go` files
//! - files carrying the `Code generated ... DO NOT EDIT.` marker, so mocks
//!   written by a previous run are not rediscovered

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

static STANDALONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*type\s+([A-Za-z_][A-Za-z0-9_]*)(?:\[[^\]]*\])?\s+interface\s*\{")
        .expect("valid standalone interface regex")
});

static GROUP_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*type\s*\(\s*$").expect("valid type group regex"));

static GROUP_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)(?:\[[^\]]*\])?\s+interface\s*\{")
        .expect("valid group member regex")
});

static GENERATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^// Code generated .* DO NOT EDIT\.\r?$")
        .expect("valid generated marker regex")
});

const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("search directory {path} does not exist")]
    Missing { path: PathBuf },
    #[error("search path {path} is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("cannot read search directory {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Finds interfaces under a root directory.
pub trait Scanner {
    /// Interface name -> source file. Fails if the root cannot be read.
    fn scan(&self, root: &Path) -> Result<BTreeMap<String, PathBuf>, ScanError>;
}

/// Scanner for Go source trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoScanner;

impl Scanner for GoScanner {
    fn scan(&self, root: &Path) -> Result<BTreeMap<String, PathBuf>, ScanError> {
        let metadata = fs::metadata(root).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ScanError::Missing {
                    path: root.to_path_buf(),
                }
            } else {
                ScanError::Unreadable {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        fs::read_dir(root).map_err(|source| ScanError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut found: BTreeMap<String, PathBuf> = BTreeMap::new();
        let mut files_scanned = 0usize;

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_go_source(entry.path()) {
                continue;
            }

            let contents = match fs::read_to_string(entry.path()) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            if GENERATED.is_match(&contents) {
                debug!("Skipping generated file {}", entry.path().display());
                continue;
            }

            files_scanned += 1;
            for name in interface_names(&contents) {
                if let Some(existing) = found.get(&name) {
                    warn!(
                        "Interface {} in {} shadowed by earlier declaration in {}",
                        name,
                        entry.path().display(),
                        existing.display()
                    );
                    continue;
                }
                found.insert(name, entry.path().to_path_buf());
            }
        }

        info!(
            "Scanned {} Go files under {}, found {} interfaces",
            files_scanned,
            root.display(),
            found.len()
        );
        Ok(found)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Interface names declared at package level in one Go source file, in
/// declaration order.
///
/// Only depth 0 counts: interface types nested in structs, declared inside
/// function bodies, or sitting in comments and string literals are ignored.
/// Members of a `type ( ... )` group are accepted at depth 1 of the group.
pub fn interface_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut lexer = LineLexer::default();
    let mut depth = 0usize;
    let mut in_group = false;

    for raw in source.lines() {
        let line = lexer.code(raw);

        if in_group && depth == 1 {
            if let Some(caps) = GROUP_MEMBER.captures(&line) {
                names.push(caps[1].to_string());
            }
        } else if depth == 0 {
            if GROUP_START.is_match(&line) {
                in_group = true;
            } else if let Some(caps) = STANDALONE.captures(&line) {
                names.push(caps[1].to_string());
            }
        }

        for c in line.chars() {
            match c {
                '{' | '(' | '[' => depth += 1,
                '}' | ')' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if depth == 0 {
            in_group = false;
        }
    }

    names
}

/// Strips comments and literal contents from Go source, one line at a time.
/// Block comments and raw strings may span lines.
#[derive(Debug, Default)]
struct LineLexer {
    in_block_comment: bool,
    in_raw_string: bool,
}

impl LineLexer {
    /// The code on `line`, with comments removed and literals emptied.
    fn code(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                    out.push(' ');
                }
                continue;
            }
            if self.in_raw_string {
                if c == '`' {
                    self.in_raw_string = false;
                    out.push('`');
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'/') => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                }
                '`' => {
                    self.in_raw_string = true;
                    out.push('`');
                }
                '"' | '\'' => {
                    out.push(c);
                    while let Some(next) = chars.next() {
                        if next == '\\' {
                            chars.next();
                        } else if next == c {
                            out.push(c);
                            break;
                        }
                    }
                }
                _ => out.push(c),
            }
        }
        out
    }
}
