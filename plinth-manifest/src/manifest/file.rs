use std::path::{Path, PathBuf};

use super::{Manifest, parse::parse_manifest};
use crate::{Error, Result};

/// Represents a plinth.toml file with both raw content and parsed manifest.
pub struct StackToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl StackToml {
    /// Open and parse a plinth.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        let manifest = parse_manifest(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Write new content to `path` after checking that it parses.
    pub fn create(path: impl AsRef<Path>, content: String) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let manifest = parse_manifest(&content, &path.display().to_string())?;
        let file = Self {
            path,
            content,
            manifest,
        };
        file.save()?;
        Ok(file)
    }

    /// Save the current content to disk.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, &self.content).map_err(|e| {
            Box::new(Error::Io {
                path: self.path.clone(),
                source: e,
            })
        })?;
        Ok(())
    }
}
