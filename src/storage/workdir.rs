use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// @module: Ephemeral working filesystem wrapper

/// A working directory on the ephemeral filesystem.
///
/// All live database files and backup snapshots live directly under this
/// directory; names are plain filenames, never nested paths.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    // @creates: Working directory, including parents if needed
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create working directory: {:?}", root))?;
        Ok(Self { root })
    }

    /// The root of the working directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a named file inside the working directory
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    // @checks: File existence
    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Read a named file to bytes
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name);
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    /// Write bytes to a named file
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_of(name);
        fs::write(&path, bytes).with_context(|| format!("Failed to write file: {:?}", path))
    }

    /// Delete a named file
    pub fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.path_of(name);
        fs::remove_file(&path).with_context(|| format!("Failed to delete file: {:?}", path))
    }

    /// List the plain filenames currently present in the working directory
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list working directory: {:?}", self.root))?
        {
            let entry = entry.context("Failed to read directory entry")?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
