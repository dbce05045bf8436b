use anyhow::{anyhow, Result};
use snapkit_state::SnapState;
use std::collections::BTreeMap;
use tracing::warn;

use crate::source::AutoAliasesSource;

/// Automatic aliases that differ from what the snap declarations now say,
/// by snap name.
#[derive(Debug, Default)]
pub struct AutoAliasesDelta {
    /// Newly declared aliases, or declared with a different app.
    pub changed: BTreeMap<String, Vec<String>>,
    /// Recorded automatic aliases no longer declared at all.
    pub dropped: BTreeMap<String, Vec<String>>,
    /// Snaps that could not be scanned, in scan order.
    pub errors: Vec<(String, anyhow::Error)>,
}

impl AutoAliasesDelta {
    pub fn first_error(&self) -> Option<&anyhow::Error> {
        self.errors.first().map(|(_, err)| err)
    }

    /// Snaps with changed or dropped aliases, sorted and deduplicated.
    pub fn affected_snaps(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .changed
            .keys()
            .chain(self.dropped.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Fails with the first per-snap error, if any.
    pub fn into_result(
        self,
    ) -> Result<(BTreeMap<String, Vec<String>>, BTreeMap<String, Vec<String>>)> {
        if let Some((_, err)) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok((self.changed, self.dropped))
    }
}

/// Compares the recorded automatic aliases of the snaps named in `names`
/// (all of `snaps` when empty) with their current declarations.
///
/// A name missing from `snaps` fails the whole scan. Failures to resolve a
/// snap's info or declaration are collected and the scan moves on.
pub fn auto_aliases_delta(
    snaps: &BTreeMap<String, SnapState>,
    names: &[String],
    source: &dyn AutoAliasesSource,
) -> Result<AutoAliasesDelta> {
    let targets: Vec<(&str, &SnapState)> = if names.is_empty() {
        snaps
            .iter()
            .map(|(name, snapst)| (name.as_str(), snapst))
            .collect()
    } else {
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            let snapst = snaps
                .get(name)
                .ok_or_else(|| anyhow!("snap '{name}' is not installed"))?;
            targets.push((name.as_str(), snapst));
        }
        targets
    };

    let mut delta = AutoAliasesDelta::default();
    for (snap_name, snapst) in targets {
        let declared = match snapst
            .current_info()
            .and_then(|info| source.auto_aliases(info))
        {
            Ok(declared) => declared,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(snap = %snap_name, error = %reason, "cannot scan automatic aliases");
                delta.errors.push((snap_name.to_string(), err));
                continue;
            }
        };

        let changed: Vec<String> = declared
            .iter()
            .filter(|(alias, app)| {
                snapst
                    .aliases
                    .get(alias.as_str())
                    .and_then(|target| target.auto_app())
                    != Some(app.as_str())
            })
            .map(|(alias, _)| alias.clone())
            .collect();
        let dropped: Vec<String> = snapst
            .aliases
            .iter()
            .filter(|(alias, target)| {
                target.auto_app().is_some() && !declared.contains_key(alias.as_str())
            })
            .map(|(alias, _)| alias.clone())
            .collect();

        if !changed.is_empty() {
            delta.changed.insert(snap_name.to_string(), changed);
        }
        if !dropped.is_empty() {
            delta.dropped.insert(snap_name.to_string(), dropped);
        }
    }

    Ok(delta)
}
