use anyhow::{anyhow, Context, Result};
use snapkit_core::{SnapDeclaration, SnapInfo};
use snapkit_state::StateLayout;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Resolves the automatic aliases currently granted to a snap, as alias
/// name to app name.
pub trait AutoAliasesSource {
    fn auto_aliases(&self, info: &SnapInfo) -> Result<BTreeMap<String, String>>;
}

/// Snap declarations kept as `<snap>.toml` files in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationStore {
    dir: PathBuf,
}

impl DeclarationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_layout(layout: &StateLayout) -> Self {
        Self::new(layout.declarations_dir())
    }

    pub fn declaration_path(&self, snap_name: &str) -> PathBuf {
        self.dir.join(format!("{snap_name}.toml"))
    }

    pub fn read_declaration(&self, snap_name: &str) -> Result<Option<SnapDeclaration>> {
        let path = self.declaration_path(snap_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed reading snap declaration: {}", path.display())
                });
            }
        };

        let declaration = SnapDeclaration::from_toml_str(&content)
            .with_context(|| format!("failed parsing snap declaration: {}", path.display()))?;
        if declaration.snap_name != snap_name {
            return Err(anyhow!(
                "snap declaration {} is for '{}', expected '{}'",
                path.display(),
                declaration.snap_name,
                snap_name
            ));
        }
        Ok(Some(declaration))
    }

    pub fn write_declaration(&self, declaration: &SnapDeclaration) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        let path = self.declaration_path(&declaration.snap_name);
        let content = toml::to_string(declaration).with_context(|| {
            format!(
                "failed serializing snap declaration for '{}'",
                declaration.snap_name
            )
        })?;
        fs::write(&path, content)
            .with_context(|| format!("failed writing snap declaration: {}", path.display()))?;
        Ok(path)
    }
}

impl AutoAliasesSource for DeclarationStore {
    fn auto_aliases(&self, info: &SnapInfo) -> Result<BTreeMap<String, String>> {
        Ok(self
            .read_declaration(&info.name)?
            .map(|declaration| declaration.auto_aliases())
            .unwrap_or_default())
    }
}
