use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use snapkit_core::{AliasMap, AliasesStatus, SnapInfo};

/// Persisted record of one installed snap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapState {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sequence: Vec<SnapInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(default, skip_serializing_if = "AliasMap::is_empty")]
    pub aliases: AliasMap,
    #[serde(default, rename = "aliases-status", alias = "aliasesStatus")]
    pub aliases_status: AliasesStatus,
}

impl SnapState {
    /// A state with `info` as its only and current revision.
    pub fn with_current(info: SnapInfo) -> Self {
        Self {
            current: Some(info.revision),
            sequence: vec![info],
            ..Self::default()
        }
    }

    pub fn current_info(&self) -> Result<&SnapInfo> {
        let revision = self
            .current
            .ok_or_else(|| anyhow!("snap has no current revision"))?;
        self.sequence
            .iter()
            .find(|info| info.revision == revision)
            .ok_or_else(|| anyhow!("current revision {revision} is missing from the sequence"))
    }
}
