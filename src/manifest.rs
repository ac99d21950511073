//! Resource archive manifest and version selection
//!
//! The engine is configured by an immutable, versioned binary bundle loaded
//! once at initialization. Which bundle is active is recorded in a small
//! JSON manifest document with at minimum a `version` field; the archive
//! file itself is named `<channel>-<version>.<ext>` next to the manifest.
//! The binding only selects and loads the bytes -- the engine validates the
//! archive contents itself, accepting or rejecting it wholesale at `init`.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BindingError, Result};

/// Release channel used when the manifest does not name one
pub const DEFAULT_CHANNEL: &str = "release";

/// Conventional file extension of resource archives
pub const ARCHIVE_EXT: &str = "cpack";

/// The archive selection manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Semantic version of the active archive, e.g. `"1.4.0"`
    pub version: String,

    /// Release channel the archive belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Source branch the archive was produced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Manifest {
    /// Parse a manifest from JSON bytes, validating the version field
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let manifest: Manifest = serde_json::from_slice(bytes)
            .map_err(|e| BindingError::Manifest(format!("invalid manifest document: {}", e)))?;
        manifest.parsed_version()?;
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_json(&bytes)
    }

    /// The semantic version as a `(major, minor, patch)` triple
    pub fn parsed_version(&self) -> Result<(u32, u32, u32)> {
        let bad = || {
            BindingError::Manifest(format!(
                "version {:?} is not of the form MAJOR.MINOR.PATCH",
                self.version
            ))
        };
        let mut parts = self.version.split('.');
        let mut next = || -> Result<u32> {
            parts
                .next()
                .and_then(|p| if p.is_empty() { None } else { p.parse().ok() })
                .ok_or_else(|| bad())
        };
        let triple = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(triple)
    }

    /// Channel of the active archive
    pub fn channel(&self) -> &str {
        self.channel.as_deref().unwrap_or(DEFAULT_CHANNEL)
    }

    /// File name of the active archive: `<channel>-<version>.<ext>`
    pub fn archive_file_name(&self, ext: &str) -> String {
        format!("{}-{}.{}", self.channel(), self.version, ext)
    }

    /// Resolve the archive path next to `dir`, verifying it exists
    pub fn locate_archive(&self, dir: &Path, ext: &str) -> Result<PathBuf> {
        let path = dir.join(self.archive_file_name(ext));
        if !path.is_file() {
            return Err(BindingError::Io(format!(
                "archive {} not found in {}",
                self.archive_file_name(ext),
                dir.display()
            )));
        }
        Ok(path)
    }

    /// Load the active archive's bytes from `dir`
    pub fn load_archive(&self, dir: &Path, ext: &str) -> Result<Vec<u8>> {
        let path = self.locate_archive(dir, ext)?;
        debug!("loading resource archive {}", path.display());
        Ok(fs::read(path)?)
    }
}
