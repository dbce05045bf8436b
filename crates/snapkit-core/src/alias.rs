use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::naming::validate_app_name;

/// Alias name to target, scoped to one snap.
pub type AliasMap = BTreeMap<String, AliasTarget>;

/// Gates all automatic aliases of a snap at once. Manual aliases ignore it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AliasesStatus {
    #[default]
    Enabled,
    Disabled,
}

impl AliasesStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

/// The application(s) an alias of a snap is bound to.
///
/// A manual target is set by the user and is always active while present.
/// An automatic target comes from the snap declaration and is active only
/// when the snap's [`AliasesStatus`] is enabled. When both exist the manual
/// one wins.
///
/// Targets are built through [`AliasTarget::new`] and the helpers on top of
/// it, which hold every app name to [`validate_app_name`]. Records read from
/// disk go through the same check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "AliasTargetRecord", into = "AliasTargetRecord")]
pub enum AliasTarget {
    #[non_exhaustive]
    Manual(String),
    #[non_exhaustive]
    Auto(String),
    #[non_exhaustive]
    ManualOverAuto { manual: String, auto: String },
}

impl AliasTarget {
    /// Builds a target from its optional manual and automatic apps. At least
    /// one must be present.
    pub fn new(manual: Option<String>, auto: Option<String>) -> Result<Self> {
        for app in manual.iter().chain(auto.iter()) {
            validate_app_name(app).context("invalid alias target")?;
        }
        match (manual, auto) {
            (Some(manual), Some(auto)) => Ok(Self::ManualOverAuto { manual, auto }),
            (Some(manual), None) => Ok(Self::Manual(manual)),
            (None, Some(auto)) => Ok(Self::Auto(auto)),
            (None, None) => Err(anyhow!(
                "alias target must have a manual or an auto application"
            )),
        }
    }

    pub fn manual(app: impl Into<String>) -> Result<Self> {
        Self::new(Some(app.into()), None)
    }

    pub fn auto(app: impl Into<String>) -> Result<Self> {
        Self::new(None, Some(app.into()))
    }

    pub fn manual_app(&self) -> Option<&str> {
        match self {
            Self::Manual(manual) | Self::ManualOverAuto { manual, .. } => Some(manual),
            Self::Auto(_) => None,
        }
    }

    pub fn auto_app(&self) -> Option<&str> {
        match self {
            Self::Auto(auto) | Self::ManualOverAuto { auto, .. } => Some(auto),
            Self::Manual(_) => None,
        }
    }

    /// Returns the app this alias resolves to under `status`, or `None` when
    /// the alias is inactive.
    pub fn effective(&self, status: AliasesStatus) -> Option<&str> {
        if let Some(manual) = self.manual_app() {
            return Some(manual);
        }
        match status {
            AliasesStatus::Enabled => self.auto_app(),
            AliasesStatus::Disabled => None,
        }
    }

    /// Sets the manual target, keeping any automatic one underneath.
    pub fn with_manual(self, app: impl Into<String>) -> Result<Self> {
        let auto = self.auto_app().map(str::to_string);
        Self::new(Some(app.into()), auto)
    }

    /// Sets the automatic target, keeping any manual one on top.
    pub fn with_auto(self, app: impl Into<String>) -> Result<Self> {
        let manual = self.manual_app().map(str::to_string);
        Self::new(manual, Some(app.into()))
    }

    /// Drops the manual target. `None` means nothing is left of the alias.
    pub fn without_manual(self) -> Option<Self> {
        match self {
            Self::Manual(_) => None,
            Self::Auto(auto) | Self::ManualOverAuto { auto, .. } => Some(Self::Auto(auto)),
        }
    }

    /// Drops the automatic target. `None` means nothing is left of the alias.
    pub fn without_auto(self) -> Option<Self> {
        match self {
            Self::Auto(_) => None,
            Self::Manual(manual) | Self::ManualOverAuto { manual, .. } => {
                Some(Self::Manual(manual))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AliasTargetRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto: Option<String>,
}

impl TryFrom<AliasTargetRecord> for AliasTarget {
    type Error = anyhow::Error;

    fn try_from(record: AliasTargetRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.manual.filter(|value| !value.is_empty()),
            record.auto.filter(|value| !value.is_empty()),
        )
    }
}

impl From<AliasTarget> for AliasTargetRecord {
    fn from(target: AliasTarget) -> Self {
        match target {
            AliasTarget::Manual(manual) => Self {
                manual: Some(manual),
                auto: None,
            },
            AliasTarget::Auto(auto) => Self {
                manual: None,
                auto: Some(auto),
            },
            AliasTarget::ManualOverAuto { manual, auto } => Self {
                manual: Some(manual),
                auto: Some(auto),
            },
        }
    }
}
