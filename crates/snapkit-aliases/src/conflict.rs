use snapkit_core::{alias_namespace, AliasMap, AliasesStatus};
use snapkit_state::SnapState;
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasConflictError {
    /// An alias of `snap` would shadow the commands of installed snap
    /// `namespace`.
    #[error(
        "cannot enable alias {alias:?} for {snap:?}, it conflicts with the command namespace of installed snap {namespace:?}"
    )]
    Namespace {
        snap: String,
        alias: String,
        namespace: String,
    },

    /// Aliases of `snap` are already enabled for other snaps, keyed by the
    /// other snap's name.
    #[error("{}", describe_alias_conflicts(.snap, .conflicts))]
    Aliases {
        snap: String,
        conflicts: BTreeMap<String, Vec<String>>,
    },

    /// The name `snap` would take is the namespace of an enabled alias of
    /// `owner`.
    #[error("snap {snap:?} command namespace conflicts with alias {alias:?} for {owner:?} snap")]
    SnapNamespace {
        snap: String,
        alias: String,
        owner: String,
    },
}

fn describe_alias_conflicts(snap: &str, conflicts: &BTreeMap<String, Vec<String>>) -> String {
    let mut parts = vec!["cannot enable".to_string()];
    for (index, (other_snap, aliases)) in conflicts.iter().enumerate() {
        if index > 0 {
            parts.push("nor".to_string());
        }
        match aliases.as_slice() {
            [alias] => parts.push(format!("alias {alias:?}")),
            _ => parts.push(format!("aliases {}", quoted(aliases))),
        }
        if index == 0 {
            parts.push(format!("for {snap:?},"));
        }
        parts.push(format!("already enabled for {other_snap:?}"));
    }
    parts.join(" ")
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("{value:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks `candidate` aliases of `snap_name` under `status` against the
/// installed snaps in `snaps`.
///
/// The keys of `snaps` are the installed snap names and act as reserved
/// command namespaces; a namespace hit is reported alone and before any
/// alias collision. Otherwise every other snap's effective aliases are
/// checked and all collisions are reported together.
pub fn check_aliases_conflicts(
    snaps: &BTreeMap<String, SnapState>,
    snap_name: &str,
    status: AliasesStatus,
    candidate: &AliasMap,
) -> Result<(), AliasConflictError> {
    let installed: BTreeSet<&str> = snaps.keys().map(String::as_str).collect();
    check_alias_namespaces(&installed, snap_name, status, candidate)?;
    check_alias_collisions(snaps, snap_name, status, candidate)
}

/// Fails on the first active alias of `candidate` whose namespace is one of
/// the `installed` snap names.
pub fn check_alias_namespaces<S: Borrow<str> + Ord>(
    installed: &BTreeSet<S>,
    snap_name: &str,
    status: AliasesStatus,
    candidate: &AliasMap,
) -> Result<(), AliasConflictError> {
    for (alias, target) in candidate {
        if target.effective(status).is_none() {
            continue;
        }
        let namespace = alias_namespace(alias);
        if installed.contains(namespace) {
            return Err(AliasConflictError::Namespace {
                snap: snap_name.to_string(),
                alias: alias.clone(),
                namespace: namespace.to_string(),
            });
        }
    }
    Ok(())
}

/// Reports every active alias of `candidate` that another snap in `snaps`
/// already has active. Namespaces are not checked here.
pub fn check_alias_collisions(
    snaps: &BTreeMap<String, SnapState>,
    snap_name: &str,
    status: AliasesStatus,
    candidate: &AliasMap,
) -> Result<(), AliasConflictError> {
    let enabled: BTreeSet<&str> = candidate
        .iter()
        .filter(|(_, target)| target.effective(status).is_some())
        .map(|(alias, _)| alias.as_str())
        .collect();

    let conflicts = enabled_alias_conflicts(snaps, snap_name, &enabled);
    if conflicts.is_empty() {
        return Ok(());
    }
    Err(AliasConflictError::Aliases {
        snap: snap_name.to_string(),
        conflicts,
    })
}

fn enabled_alias_conflicts(
    snaps: &BTreeMap<String, SnapState>,
    skip_snap: &str,
    enabled: &BTreeSet<&str>,
) -> BTreeMap<String, Vec<String>> {
    let mut conflicts = BTreeMap::new();
    if enabled.is_empty() {
        return conflicts;
    }

    for (other_snap, snapst) in snaps {
        if other_snap == skip_snap {
            continue;
        }
        let status = snapst.aliases_status;
        let collisions: Vec<String> = if snapst.aliases.len() < enabled.len() {
            snapst
                .aliases
                .iter()
                .filter(|(alias, target)| {
                    enabled.contains(alias.as_str()) && target.effective(status).is_some()
                })
                .map(|(alias, _)| alias.clone())
                .collect()
        } else {
            enabled
                .iter()
                .filter(|alias| {
                    snapst
                        .aliases
                        .get(**alias)
                        .and_then(|target| target.effective(status))
                        .is_some()
                })
                .map(|alias| alias.to_string())
                .collect()
        };
        if !collisions.is_empty() {
            conflicts.insert(other_snap.clone(), collisions);
        }
    }
    conflicts
}

/// Checks that no other installed snap has an enabled alias in the command
/// namespace `snap_name` would claim.
pub fn check_snap_alias_conflict(
    snaps: &BTreeMap<String, SnapState>,
    snap_name: &str,
) -> Result<(), AliasConflictError> {
    for (other_snap, snapst) in snaps {
        if other_snap == snap_name {
            continue;
        }
        for (alias, target) in &snapst.aliases {
            if alias_namespace(alias) != snap_name {
                continue;
            }
            if target.effective(snapst.aliases_status).is_some() {
                return Err(AliasConflictError::SnapNamespace {
                    snap: snap_name.to_string(),
                    alias: alias.clone(),
                    owner: other_snap.clone(),
                });
            }
        }
    }
    Ok(())
}
