mod alias;
mod declaration;
mod info;
mod naming;

pub use alias::{AliasMap, AliasTarget, AliasesStatus};
pub use declaration::{DeclaredAlias, SnapDeclaration};
pub use info::{AppInfo, SnapInfo};
pub use naming::{
    alias_namespace, compose_target, validate_alias_name, validate_app_name, validate_snap_name,
};
