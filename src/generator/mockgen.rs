//! # mockgen Emitter
//!
//! Runs `mockgen` in source mode for one interface at a time. Source mode
//! mocks every interface in a file, so the file's other interfaces are
//! passed through `-exclude_interfaces`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use thiserror::Error;

use crate::generator::scanner::interface_names;

const FALLBACK_PACKAGE: &str = "mocks";

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("{binary} exited with {status}: {stderr}")]
    Failed {
        binary: String,
        status: String,
        stderr: String,
    },
}

/// Writes the mock for one interface.
pub trait Emitter: Send + Sync {
    fn emit(&self, name: &str, source: &Path, destination: &Path) -> Result<(), EmitError>;
}

pub struct MockgenEmitter {
    binary: String,
    package: Option<String>,
}

impl MockgenEmitter {
    pub fn new(binary: impl Into<String>, package: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            package,
        }
    }

    /// Full argument list for one invocation.
    pub fn arguments(&self, name: &str, source: &Path, source_text: &str, destination: &Path) -> Vec<String> {
        let package = self
            .package
            .clone()
            .unwrap_or_else(|| package_for(destination));

        let mut args = vec![
            format!("-source={}", source.display()),
            format!("-destination={}", destination.display()),
            format!("-package={package}"),
        ];

        let siblings: Vec<String> = interface_names(source_text)
            .into_iter()
            .filter(|other| other != name)
            .collect();
        if !siblings.is_empty() {
            args.push(format!("-exclude_interfaces={}", siblings.join(",")));
        }
        args
    }
}

impl Emitter for MockgenEmitter {
    fn emit(&self, name: &str, source: &Path, destination: &Path) -> Result<(), EmitError> {
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let source_text = fs::read_to_string(source).map_err(|e| EmitError::ReadSource {
            path: source.to_path_buf(),
            source: e,
        })?;
        let args = self.arguments(name, source, &source_text, destination);
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|source| EmitError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EmitError::Failed {
                binary: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!("Generated mock for {} at {}", name, destination.display());
        Ok(())
    }
}

/// Go package name for a destination file: its directory name, sanitized.
pub fn package_for(destination: &Path) -> String {
    let dir_name = destination
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();

    match sanitized.chars().next() {
        Some(first) if !first.is_ascii_digit() => sanitized,
        _ => FALLBACK_PACKAGE.to_string(),
    }
}
