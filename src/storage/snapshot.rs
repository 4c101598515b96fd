use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{StoreError, StoreResult};
use super::model::{Item, ItemId, Match, MatchId, User, UserId};

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

const TEMP_EXTENSION: &str = "json.tmp";

#[derive(Debug, Clone, Default)]
/// Live store contents.
pub struct StoreState {
    pub users: BTreeMap<UserId, User>,
    pub items: BTreeMap<ItemId, Item>,
    pub matches: BTreeMap<MatchId, Match>,
    pub next_user_id: u64,
    pub next_item_id: u64,
    pub next_match_id: u64,
}

impl StoreState {
    pub fn empty() -> Self {
        Self {
            next_user_id: 1,
            next_item_id: 1,
            next_match_id: 1,
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    next_user_id: u64,
    next_item_id: u64,
    next_match_id: u64,
    users: Vec<User>,
    items: Vec<Item>,
    matches: Vec<Match>,
}

/// Serialises `state` into the on-disk snapshot layout.
pub fn encode_snapshot(state: &StoreState) -> StoreResult<Vec<u8>> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        next_user_id: state.next_user_id,
        next_item_id: state.next_item_id,
        next_match_id: state.next_match_id,
        users: state.users.values().cloned().collect(),
        items: state.items.values().cloned().collect(),
        matches: state.matches.values().cloned().collect(),
    };
    Ok(serde_json::to_vec(&snapshot)?)
}

/// Writes encoded snapshot `bytes` to `path` atomically (temp file, fsync, rename).
///
/// Blocking; async callers run it on the blocking pool.
pub fn write_snapshot_bytes(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path(path);
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    debug!(path = %path.display(), bytes = bytes.len(), "Snapshot written");
    Ok(())
}

/// Loads a snapshot, returning `None` if `path` does not exist.
pub fn read_snapshot(path: &Path) -> StoreResult<Option<StoreState>> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path)?;
    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;

    let corrupt = |reason: String| StoreError::CorruptSnapshot {
        path: path.to_path_buf(),
        reason,
    };

    if snapshot.version != SNAPSHOT_VERSION {
        return Err(corrupt(format!(
            "unsupported version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }

    let mut state = StoreState {
        next_user_id: snapshot.next_user_id,
        next_item_id: snapshot.next_item_id,
        next_match_id: snapshot.next_match_id,
        ..Default::default()
    };

    for user in snapshot.users {
        if user.id.0 >= state.next_user_id {
            return Err(corrupt(format!("user id {} not below next id", user.id)));
        }
        if state.users.insert(user.id, user).is_some() {
            return Err(corrupt("duplicate user id".to_string()));
        }
    }
    for item in snapshot.items {
        if item.id.0 >= state.next_item_id {
            return Err(corrupt(format!("item id {} not below next id", item.id)));
        }
        if !state.users.contains_key(&item.user_id) {
            return Err(corrupt(format!("item {} has unknown owner", item.id)));
        }
        if state.items.insert(item.id, item).is_some() {
            return Err(corrupt("duplicate item id".to_string()));
        }
    }
    for m in snapshot.matches {
        if m.id.0 >= state.next_match_id {
            return Err(corrupt(format!("match id {} not below next id", m.id)));
        }
        if !state.items.contains_key(&m.lost_item_id) || !state.items.contains_key(&m.found_item_id)
        {
            return Err(corrupt(format!("match {} references unknown item", m.id)));
        }
        if state.matches.insert(m.id, m).is_some() {
            return Err(corrupt("duplicate match id".to_string()));
        }
    }

    Ok(Some(state))
}

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension(TEMP_EXTENSION)
}
