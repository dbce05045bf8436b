use anyhow::{anyhow, Context, Result};
use snapkit_core::{validate_alias_name, AliasMap, AliasTarget, AliasesStatus};
use snapkit_state::{SnapState, StateData};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::backend::AliasBackend;
use crate::conflict::{check_alias_collisions, check_alias_namespaces};
use crate::delta::apply_aliases_change;
use crate::refresh::refresh_aliases;
use crate::scan::auto_aliases_delta;
use crate::source::AutoAliasesSource;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkRefreshOutcome {
    pub refreshed: Vec<String>,
    /// Snap name to failure message.
    pub failed: BTreeMap<String, String>,
}

/// Re-derives the aliases of `snap_name` from its current declaration and
/// commits them.
pub fn refresh_snap_aliases(
    st: &mut StateData,
    snap_name: &str,
    source: &dyn AutoAliasesSource,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let snapst = st.snap(snap_name)?;
    let info = snapst
        .current_info()
        .with_context(|| format!("cannot refresh aliases of snap '{snap_name}'"))?;
    let new_aliases = refresh_aliases(source, info, &snapst.aliases)?;
    let status = snapst.aliases_status;
    commit_aliases(st, snap_name, snapst, status, new_aliases, backend)?;
    info!(snap = %snap_name, "refreshed aliases");
    Ok(())
}

/// Refreshes every snap in `names` (all snaps when empty) whose automatic
/// aliases no longer match its declaration. One snap failing does not stop
/// the others.
pub fn refresh_changed_aliases(
    st: &mut StateData,
    names: &[String],
    source: &dyn AutoAliasesSource,
    backend: &dyn AliasBackend,
) -> Result<BulkRefreshOutcome> {
    let snaps = st.all_snaps()?;
    let delta = auto_aliases_delta(&snaps, names, source)?;

    let mut outcome = BulkRefreshOutcome::default();
    for (snap_name, err) in &delta.errors {
        outcome.failed.insert(snap_name.clone(), format!("{err:#}"));
    }

    for snap_name in delta.affected_snaps() {
        match refresh_snap_aliases(st, &snap_name, source, backend) {
            Ok(()) => outcome.refreshed.push(snap_name),
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(snap = %snap_name, error = %reason, "alias refresh failed");
                outcome.failed.insert(snap_name, reason);
            }
        }
    }
    Ok(outcome)
}

/// Enables the automatic aliases of `snap_name`.
pub fn enable_aliases(
    st: &mut StateData,
    snap_name: &str,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let snapst = st.snap(snap_name)?;
    let aliases = snapst.aliases.clone();
    commit_aliases(st, snap_name, snapst, AliasesStatus::Enabled, aliases, backend)?;
    info!(snap = %snap_name, "enabled automatic aliases");
    Ok(())
}

/// Disables the automatic aliases of `snap_name` and removes its manual
/// aliases, which have no disabled state.
pub fn disable_all_aliases(
    st: &mut StateData,
    snap_name: &str,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let snapst = st.snap(snap_name)?;
    let aliases: AliasMap = snapst
        .aliases
        .iter()
        .filter_map(|(alias, target)| {
            target
                .clone()
                .without_manual()
                .map(|target| (alias.clone(), target))
        })
        .collect();
    commit_aliases(st, snap_name, snapst, AliasesStatus::Disabled, aliases, backend)?;
    info!(snap = %snap_name, "disabled all aliases");
    Ok(())
}

/// Creates or retargets the manual alias `alias` of `snap_name` to `app`.
pub fn manual_alias(
    st: &mut StateData,
    snap_name: &str,
    app: &str,
    alias: &str,
    backend: &dyn AliasBackend,
) -> Result<()> {
    validate_alias_name(alias)?;
    let snapst = st.snap(snap_name)?;
    let info = snapst
        .current_info()
        .with_context(|| format!("cannot enable alias '{alias}' for snap '{snap_name}'"))?;
    if !info.has_app(app) {
        return Err(anyhow!(
            "cannot enable alias '{alias}' for '{snap_name}', target application '{app}' does not exist"
        ));
    }

    let mut aliases = snapst.aliases.clone();
    let target = match aliases.remove(alias) {
        Some(existing) => existing.with_manual(app)?,
        None => AliasTarget::manual(app)?,
    };
    aliases.insert(alias.to_string(), target);

    let status = snapst.aliases_status;
    commit_aliases(st, snap_name, snapst, status, aliases, backend)?;
    info!(snap = %snap_name, alias = %alias, app = %app, "enabled manual alias");
    Ok(())
}

/// Removes the manual alias `alias` from whichever snap has it, leaving an
/// automatic alias of the same name in place. Returns that snap's name.
pub fn manual_unalias(
    st: &mut StateData,
    alias: &str,
    backend: &dyn AliasBackend,
) -> Result<String> {
    let snaps = st.all_snaps()?;
    let Some((snap_name, snapst)) = snaps.into_iter().find(|(_, snapst)| {
        snapst
            .aliases
            .get(alias)
            .and_then(AliasTarget::manual_app)
            .is_some()
    }) else {
        return Err(anyhow!("cannot find manual alias '{alias}' in any snap"));
    };

    let mut aliases = snapst.aliases.clone();
    if let Some(remaining) = aliases.remove(alias).and_then(AliasTarget::without_manual) {
        aliases.insert(alias.to_string(), remaining);
    }

    let status = snapst.aliases_status;
    commit_aliases(st, &snap_name, snapst, status, aliases, backend)?;
    info!(snap = %snap_name, alias = %alias, "removed manual alias");
    Ok(snap_name)
}

/// Drops the automatic part of the named aliases of `snap_name`.
pub fn prune_auto_aliases(
    st: &mut StateData,
    snap_name: &str,
    aliases: &[String],
    backend: &dyn AliasBackend,
) -> Result<()> {
    let snapst = st.snap(snap_name)?;
    let mut new_aliases = snapst.aliases.clone();
    for alias in aliases {
        if let Some(remaining) = new_aliases.remove(alias).and_then(AliasTarget::without_auto) {
            new_aliases.insert(alias.clone(), remaining);
        }
    }

    let status = snapst.aliases_status;
    commit_aliases(st, snap_name, snapst, status, new_aliases, backend)?;
    info!(snap = %snap_name, pruned = aliases.len(), "pruned automatic aliases");
    Ok(())
}

/// Removes every alias of `snap_name` from disk and from its state, as done
/// before the snap itself is removed.
pub fn remove_snap_aliases(
    st: &mut StateData,
    snap_name: &str,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let snapst = st.snap(snap_name)?;
    let status = snapst.aliases_status;
    commit_aliases(st, snap_name, snapst, status, AliasMap::new(), backend)?;
    info!(snap = %snap_name, "removed all aliases");
    Ok(())
}

fn commit_aliases(
    st: &mut StateData,
    snap_name: &str,
    mut snapst: SnapState,
    new_status: AliasesStatus,
    new_aliases: AliasMap,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let installed = st.installed_snap_names();
    check_alias_namespaces(&installed, snap_name, new_status, &new_aliases)?;
    let snaps = st.all_snaps()?;
    check_alias_collisions(&snaps, snap_name, new_status, &new_aliases)?;
    apply_aliases_change(
        snap_name,
        snapst.aliases_status,
        &snapst.aliases,
        new_status,
        &new_aliases,
        backend,
    )?;

    snapst.aliases = new_aliases;
    snapst.aliases_status = new_status;
    st.set_snap(snap_name, Some(&snapst))?;
    st.checkpoint()
}
