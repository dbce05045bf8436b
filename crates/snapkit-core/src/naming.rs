use anyhow::anyhow;

const SNAP_NAME_MAX_LEN: usize = 40;

/// Snap names are lowercase ASCII letters, digits and single hyphens, with
/// at least one letter and no leading or trailing hyphen.
pub fn validate_snap_name(name: &str) -> anyhow::Result<()> {
    if name.len() < 2 || name.len() > SNAP_NAME_MAX_LEN {
        return Err(anyhow!(
            "invalid snap name '{name}': must be between 2 and {SNAP_NAME_MAX_LEN} characters"
        ));
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
    {
        return Err(anyhow!("invalid snap name '{name}'"));
    }
    if !name.chars().any(|ch| ch.is_ascii_lowercase()) {
        return Err(anyhow!(
            "invalid snap name '{name}': must contain at least one letter"
        ));
    }
    if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
        return Err(anyhow!("invalid snap name '{name}'"));
    }
    Ok(())
}

pub fn validate_app_name(name: &str) -> anyhow::Result<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(anyhow!("app name must not be empty"));
    };
    if !first.is_ascii_alphanumeric() {
        return Err(anyhow!("invalid app name '{name}'"));
    }
    if name.ends_with('-') || name.contains("--") {
        return Err(anyhow!("invalid app name '{name}'"));
    }
    if chars.any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-')) {
        return Err(anyhow!("invalid app name '{name}'"));
    }
    Ok(())
}

pub fn validate_alias_name(alias: &str) -> anyhow::Result<()> {
    let mut chars = alias.chars();
    let Some(first) = chars.next() else {
        return Err(anyhow!("alias name must not be empty"));
    };
    if !first.is_ascii_alphanumeric() {
        return Err(anyhow!("invalid alias name '{alias}'"));
    }
    if chars.any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.')) {
        return Err(anyhow!("invalid alias name '{alias}'"));
    }
    Ok(())
}

/// Builds the command an alias points at: `snap` for the snap's own app,
/// `snap.app` otherwise.
pub fn compose_target(snap_name: &str, app_name: &str) -> String {
    if app_name == snap_name {
        return app_name.to_string();
    }
    format!("{snap_name}.{app_name}")
}

/// The part of an alias before its first `.`, checked against installed
/// snap names.
pub fn alias_namespace(alias: &str) -> &str {
    match alias.split_once('.') {
        Some((namespace, _)) => namespace,
        None => alias,
    }
}
