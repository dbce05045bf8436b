//! Alias reconciliation for installed snaps: deciding the authoritative
//! alias set of a snap, detecting conflicts with other snaps, and bringing
//! the on-disk alias links in line with that decision.

mod backend;
mod conflict;
mod delta;
mod ops;
mod refresh;
mod scan;
mod source;

pub use backend::{alias_path, Alias, AliasBackend, SymlinkBackend};
pub use conflict::{
    check_alias_collisions, check_alias_namespaces, check_aliases_conflicts,
    check_snap_alias_conflict, AliasConflictError,
};
pub use delta::{aliases_delta, apply_aliases_change, AliasesDelta};
pub use ops::{
    disable_all_aliases, enable_aliases, manual_alias, manual_unalias, prune_auto_aliases,
    refresh_changed_aliases, refresh_snap_aliases, remove_snap_aliases, BulkRefreshOutcome,
};
pub use refresh::{merge_auto_aliases, refresh_aliases};
pub use scan::{auto_aliases_delta, AutoAliasesDelta};
pub use source::{AutoAliasesSource, DeclarationStore};
