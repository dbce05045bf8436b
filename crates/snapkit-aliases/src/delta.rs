use anyhow::Result;
use snapkit_core::{compose_target, AliasMap, AliasesStatus};
use tracing::debug;

use crate::backend::{Alias, AliasBackend};

/// Link operations needed to move a snap from one alias state to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasesDelta {
    pub add: Vec<Alias>,
    pub remove: Vec<Alias>,
}

impl AliasesDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Computes the minimal link changes to go from `prev_aliases` under
/// `prev_status` to `new_aliases` under `new_status` for `snap_name`.
///
/// An alias whose effective target is unchanged produces nothing; a changed
/// target produces one remove and one add.
pub fn aliases_delta(
    snap_name: &str,
    prev_status: AliasesStatus,
    prev_aliases: &AliasMap,
    new_status: AliasesStatus,
    new_aliases: &AliasMap,
) -> AliasesDelta {
    let mut delta = AliasesDelta::default();

    for (alias, prev_target) in prev_aliases {
        if new_aliases.contains_key(alias) {
            continue;
        }
        // gone
        if let Some(app) = prev_target.effective(prev_status) {
            delta.remove.push(link(snap_name, alias, app));
        }
    }

    for (alias, new_target) in new_aliases {
        let prev_app = prev_aliases
            .get(alias)
            .and_then(|target| target.effective(prev_status));
        let new_app = new_target.effective(new_status);
        if prev_app == new_app {
            continue;
        }
        if let Some(app) = prev_app {
            delta.remove.push(link(snap_name, alias, app));
        }
        if let Some(app) = new_app {
            delta.add.push(link(snap_name, alias, app));
        }
    }

    delta
}

/// Applies the link changes between two alias states of `snap_name` through
/// `backend`. Conflicts must have been checked already. Backend errors are
/// returned unchanged.
///
/// The backend is called at most once, with all adds and removes together,
/// and not at all when nothing changes.
pub fn apply_aliases_change(
    snap_name: &str,
    prev_status: AliasesStatus,
    prev_aliases: &AliasMap,
    new_status: AliasesStatus,
    new_aliases: &AliasMap,
    backend: &dyn AliasBackend,
) -> Result<()> {
    let delta = aliases_delta(snap_name, prev_status, prev_aliases, new_status, new_aliases);
    if delta.is_empty() {
        debug!(snap = %snap_name, "aliases unchanged on disk");
        return Ok(());
    }

    debug!(
        snap = %snap_name,
        add = delta.add.len(),
        remove = delta.remove.len(),
        "updating aliases"
    );
    backend.update_aliases(&delta.add, &delta.remove)
}

fn link(snap_name: &str, alias: &str, app: &str) -> Alias {
    Alias {
        name: alias.to_string(),
        target: compose_target(snap_name, app),
    }
}
