use anyhow::{Context, Result};
use snapkit_core::{AliasMap, AliasTarget, SnapInfo};
use std::collections::BTreeMap;
use tracing::debug;

use crate::source::AutoAliasesSource;

/// Produces the new alias map of a snap from its currently declared
/// automatic aliases, carrying over manual aliases.
pub fn refresh_aliases(
    source: &dyn AutoAliasesSource,
    info: &SnapInfo,
    current: &AliasMap,
) -> Result<AliasMap> {
    let declared = source
        .auto_aliases(info)
        .with_context(|| format!("cannot resolve automatic aliases of snap '{}'", info.name))?;
    Ok(merge_auto_aliases(info, &declared, current))
}

/// Merges `declared` automatic aliases with the manual ones in `current`.
/// Aliases pointing at apps `info` does not have are dropped.
pub fn merge_auto_aliases(
    info: &SnapInfo,
    declared: &BTreeMap<String, String>,
    current: &AliasMap,
) -> AliasMap {
    let mut aliases: AliasMap = declared
        .iter()
        .filter(|(_, app)| info.has_app(app))
        .filter_map(|(alias, app)| match AliasTarget::auto(app.as_str()) {
            Ok(target) => Some((alias.clone(), target)),
            Err(err) => {
                debug!(
                    snap = %info.name,
                    alias = %alias,
                    error = %err,
                    "skipping declared alias"
                );
                None
            }
        })
        .collect();

    for (alias, target) in current {
        let Some(manual) = target.manual_app() else {
            continue;
        };
        if !info.has_app(manual) {
            continue;
        }
        let auto = aliases
            .get(alias)
            .and_then(AliasTarget::auto_app)
            .map(str::to_string);
        match AliasTarget::new(Some(manual.to_string()), auto) {
            Ok(merged) => {
                aliases.insert(alias.clone(), merged);
            }
            Err(err) => {
                debug!(
                    snap = %info.name,
                    alias = %alias,
                    error = %err,
                    "skipping manual alias"
                );
            }
        }
    }

    aliases
}
