use std::collections::{BTreeMap, HashSet};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::naming::{validate_alias_name, validate_app_name, validate_snap_name};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclaredAlias {
    pub name: String,
    pub target: String,
}

/// Policy document granting a snap its automatic aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct SnapDeclaration {
    pub snap_name: String,
    #[serde(default)]
    pub aliases: Vec<DeclaredAlias>,
}

impl SnapDeclaration {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let declaration: Self =
            toml::from_str(input).context("failed to parse snap declaration")?;
        validate_snap_name(&declaration.snap_name)?;

        let mut seen = HashSet::new();
        for alias in &declaration.aliases {
            validate_alias_name(&alias.name).with_context(|| {
                format!(
                    "snap declaration for '{}' has an invalid alias",
                    declaration.snap_name
                )
            })?;
            validate_app_name(&alias.target).with_context(|| {
                format!(
                    "alias '{}' of snap declaration '{}' has an invalid target",
                    alias.name, declaration.snap_name
                )
            })?;
            if !seen.insert(alias.name.as_str()) {
                return Err(anyhow!(
                    "duplicate alias '{}' in snap declaration for '{}'",
                    alias.name,
                    declaration.snap_name
                ));
            }
        }
        Ok(declaration)
    }

    /// Declared automatic aliases as alias name to app name.
    pub fn auto_aliases(&self) -> BTreeMap<String, String> {
        self.aliases
            .iter()
            .map(|alias| (alias.name.clone(), alias.target.clone()))
            .collect()
    }
}
