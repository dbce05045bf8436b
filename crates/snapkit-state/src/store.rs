use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::SnapState;

const SNAPS_KEY: &str = "snaps";

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default = "state_file_version")]
    version: u32,
    #[serde(default)]
    data: BTreeMap<String, Value>,
}

fn state_file_version() -> u32 {
    1
}

/// Lock-protected key/value state shared by every operation.
///
/// Callers hold the guard returned by [`State::lock`] for a whole
/// read-decide-write cycle and call [`StateData::checkpoint`] before
/// releasing it.
#[derive(Debug, Default)]
pub struct State {
    data: Mutex<StateData>,
}

impl State {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the state backed by `path`. A missing file is an empty state.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => {
                let file: StateFile = serde_json::from_str(&content)
                    .with_context(|| format!("failed parsing state: {}", path.display()))?;
                if file.version != state_file_version() {
                    return Err(anyhow!(
                        "unsupported state version {} (expected {}): {}",
                        file.version,
                        state_file_version(),
                        path.display()
                    ));
                }
                file.data
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed reading state: {}", path.display()));
            }
        };

        Ok(Self {
            data: Mutex::new(StateData {
                entries,
                path: Some(path),
            }),
        })
    }

    pub fn lock(&self) -> MutexGuard<'_, StateData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
pub struct StateData {
    entries: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl StateData {
    /// Reads `key`. An absent key is `Ok(None)`, not an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.entries.get(key) else {
            return Ok(None);
        };
        let parsed = T::deserialize(value)
            .with_context(|| format!("failed decoding state entry '{key}'"))?;
        Ok(Some(parsed))
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("failed encoding state entry '{key}'"))?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn all_snaps(&self) -> Result<BTreeMap<String, SnapState>> {
        Ok(self.get(SNAPS_KEY)?.unwrap_or_default())
    }

    pub fn snap(&self, name: &str) -> Result<SnapState> {
        let Some(raw) = self.snap_entries().and_then(|snaps| snaps.get(name)) else {
            return Err(anyhow!("snap '{name}' is not installed"));
        };
        SnapState::deserialize(raw)
            .with_context(|| format!("failed decoding state of snap '{name}'"))
    }

    /// Names of all installed snaps, without decoding their records.
    pub fn installed_snap_names(&self) -> BTreeSet<String> {
        self.snap_entries()
            .map(|snaps| snaps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Stores `state` for `name`, or forgets the snap when `state` is `None`.
    pub fn set_snap(&mut self, name: &str, state: Option<&SnapState>) -> Result<()> {
        let entry = self
            .entries
            .entry(SNAPS_KEY.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        let Value::Object(snaps) = entry else {
            return Err(anyhow!("state entry '{SNAPS_KEY}' is not an object"));
        };
        match state {
            Some(state) => {
                let value = serde_json::to_value(state)
                    .with_context(|| format!("failed encoding state of snap '{name}'"))?;
                snaps.insert(name.to_string(), value);
            }
            None => {
                snaps.remove(name);
            }
        }
        Ok(())
    }

    /// Writes the state to its backing file, if any, replacing it atomically.
    pub fn checkpoint(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        write_state_file(path, &self.entries)?;
        debug!(path = %path.display(), entries = self.entries.len(), "state checkpointed");
        Ok(())
    }

    fn snap_entries(&self) -> Option<&serde_json::Map<String, Value>> {
        self.entries.get(SNAPS_KEY).and_then(Value::as_object)
    }
}

fn write_state_file(path: &Path, entries: &BTreeMap<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let file = StateFile {
        version: state_file_version(),
        data: entries.clone(),
    };
    let content = serde_json::to_string_pretty(&file)
        .with_context(|| format!("failed serializing state: {}", path.display()))?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)
        .with_context(|| format!("failed writing state: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "failed replacing state {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })
}
