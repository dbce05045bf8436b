use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One alias link: `name` in the bin directory pointing at the `target`
/// command (`snap` or `snap.app`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alias {
    pub name: String,
    pub target: String,
}

/// Performs alias link changes on disk. Implementations must tolerate
/// re-issued operations.
pub trait AliasBackend {
    fn update_aliases(&self, add: &[Alias], remove: &[Alias]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymlinkBackend {
    bin_dir: PathBuf,
}

impl SymlinkBackend {
    pub fn new(bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }
}

impl AliasBackend for SymlinkBackend {
    fn update_aliases(&self, add: &[Alias], remove: &[Alias]) -> Result<()> {
        for alias in remove {
            remove_alias_entry(&self.bin_dir, alias)?;
        }
        if !add.is_empty() {
            fs::create_dir_all(&self.bin_dir)
                .with_context(|| format!("failed to create {}", self.bin_dir.display()))?;
        }
        for alias in add {
            create_alias_entry(&self.bin_dir, alias)?;
        }
        Ok(())
    }
}

pub fn alias_path(bin_dir: &Path, alias_name: &str) -> PathBuf {
    let mut file_name = alias_name.to_string();
    if cfg!(windows) {
        file_name.push_str(".cmd");
    }
    bin_dir.join(file_name)
}

fn remove_alias_entry(bin_dir: &Path, alias: &Alias) -> Result<()> {
    let destination = alias_path(bin_dir, &alias.name);
    match fs::symlink_metadata(&destination) {
        Ok(metadata) if metadata.file_type().is_symlink() || cfg!(windows) => {
            if !entry_points_at(&destination, &alias.target) {
                debug!(
                    alias = %alias.name,
                    target = %alias.target,
                    "alias points elsewhere, leaving it"
                );
                return Ok(());
            }
        }
        Ok(_) => {
            return Err(anyhow!(
                "cannot remove alias '{}': {} exists and is not an alias",
                alias.name,
                destination.display()
            ));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to inspect alias: {}", destination.display()));
        }
    }

    match fs::remove_file(&destination) {
        Ok(()) => {
            debug!(alias = %alias.name, target = %alias.target, "removed alias");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to remove alias: {}", destination.display())),
    }
}

fn create_alias_entry(bin_dir: &Path, alias: &Alias) -> Result<()> {
    let destination = alias_path(bin_dir, &alias.name);
    match fs::symlink_metadata(&destination) {
        Ok(metadata) if metadata.file_type().is_symlink() || cfg!(windows) => {
            if entry_points_at(&destination, &alias.target) {
                return Ok(());
            }
            fs::remove_file(&destination).with_context(|| {
                format!("failed to replace existing alias: {}", destination.display())
            })?;
        }
        Ok(_) => {
            return Err(anyhow!(
                "cannot create alias '{}': {} exists and is not an alias",
                alias.name,
                destination.display()
            ));
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to inspect alias: {}", destination.display()));
        }
    }

    write_alias_entry(&alias.target, &destination)?;
    debug!(alias = %alias.name, target = %alias.target, "created alias");
    Ok(())
}

#[cfg(unix)]
fn entry_points_at(destination: &Path, target: &str) -> bool {
    fs::read_link(destination)
        .map(|current| current == Path::new(target))
        .unwrap_or(false)
}

#[cfg(windows)]
fn entry_points_at(destination: &Path, target: &str) -> bool {
    fs::read_to_string(destination)
        .map(|current| current == windows_shim(target))
        .unwrap_or(false)
}

#[cfg(windows)]
fn windows_shim(target: &str) -> String {
    format!("@echo off\r\n\"%~dp0{target}.cmd\" %*\r\n")
}

fn write_alias_entry(target: &str, destination: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, destination).with_context(|| {
            format!(
                "failed to create symlink {} -> {}",
                destination.display(),
                target
            )
        })
    }

    #[cfg(windows)]
    {
        fs::write(destination, windows_shim(target).as_bytes())
            .with_context(|| format!("failed to write shim: {}", destination.display()))
    }
}
