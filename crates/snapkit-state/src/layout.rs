use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    prefix: PathBuf,
}

impl StateLayout {
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.prefix.join("state")
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join("state.json")
    }

    pub fn declarations_dir(&self) -> PathBuf {
        self.state_dir().join("declarations")
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.bin_dir(), self.state_dir(), self.declarations_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_user_prefix() -> Result<PathBuf> {
    user_prefix_from(std::env::var_os("SNAPKIT_PREFIX"), std::env::var_os("HOME"))
}

/// Resolves the user prefix from the `SNAPKIT_PREFIX` and `HOME` values.
/// An empty override is ignored.
pub fn user_prefix_from(prefix: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(prefix) = prefix.filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(prefix));
    }

    let home = home
        .filter(|value| !value.is_empty())
        .context("HOME is not set; cannot resolve user prefix")?;
    Ok(PathBuf::from(home).join(".snapkit"))
}
