use std::collections::BTreeMap;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::naming::{validate_app_name, validate_snap_name};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInfo {
    pub command: String,
}

/// Metadata of one installed revision of a snap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapInfo {
    pub name: String,
    pub revision: u32,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub apps: BTreeMap<String, AppInfo>,
}

impl SnapInfo {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let info: Self = toml::from_str(input).context("failed to parse snap metadata")?;
        info.validate()?;
        Ok(info)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        validate_snap_name(&self.name)?;
        for (app_name, app) in &self.apps {
            validate_app_name(app_name)
                .with_context(|| format!("snap '{}' declares an invalid app", self.name))?;
            if app.command.trim().is_empty() {
                return Err(anyhow!(
                    "app '{}' of snap '{}' must declare a command",
                    app_name,
                    self.name
                ));
            }
        }
        Ok(())
    }

    pub fn has_app(&self, app_name: &str) -> bool {
        self.apps.contains_key(app_name)
    }
}
