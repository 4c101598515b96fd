use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::model::{
    Item, ItemId, ItemStatus, ItemType, Match, MatchId, MatchStatus, NewItem, NewMatch, NewUser,
    User, UserId,
};
use super::snapshot::{StoreState, encode_snapshot, read_snapshot, write_snapshot_bytes};
use super::{Store, UnitOfWork};

/// Store holding all state in memory, optionally mirrored to a JSON snapshot.
///
/// One unit of work is open at a time; [`Store::begin`] waits for the
/// previous one to commit or drop.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty, non-persistent store.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::empty()),
            snapshot_path: None,
        }
    }

    /// Opens a store persisted at `snapshot_path`, loading it if present.
    pub fn open<P: Into<PathBuf>>(snapshot_path: P) -> StoreResult<Self> {
        let snapshot_path = snapshot_path.into();
        let state = match read_snapshot(&snapshot_path)? {
            Some(state) => {
                info!(
                    path = %snapshot_path.display(),
                    users = state.users.len(),
                    items = state.items.len(),
                    matches = state.matches.len(),
                    "Loaded store snapshot"
                );
                state
            }
            None => {
                info!(path = %snapshot_path.display(), "No snapshot found, starting empty");
                StoreState::empty()
            }
        };

        Ok(Self {
            state: Mutex::new(state),
            snapshot_path: Some(snapshot_path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }
}

impl Store for MemoryStore {
    type Tx<'a> = MemoryTransaction<'a>;

    async fn begin(&self) -> StoreResult<MemoryTransaction<'_>> {
        let guard = self.state.lock().await;
        let working = guard.clone();
        Ok(MemoryTransaction {
            guard,
            working,
            snapshot_path: self.snapshot_path.as_deref(),
        })
    }
}

/// Unit of work over a [`MemoryStore`].
///
/// Holds the store lock for its lifetime and writes to a private copy of the
/// state; dropping it without committing discards every write.
pub struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, StoreState>,
    working: StoreState,
    snapshot_path: Option<&'a Path>,
}

impl std::fmt::Debug for MemoryTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("users", &self.working.users.len())
            .field("items", &self.working.items.len())
            .field("matches", &self.working.matches.len())
            .finish()
    }
}

impl MemoryTransaction<'_> {
    fn item_mut(&mut self, id: ItemId) -> StoreResult<&mut Item> {
        self.working
            .items
            .get_mut(&id)
            .ok_or(StoreError::ItemNotFound(id))
    }
}

impl UnitOfWork for MemoryTransaction<'_> {
    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        Ok(self.working.users.values().cloned().collect())
    }

    fn item(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.working.items.get(&id).cloned())
    }

    fn items_by_type_and_status(
        &self,
        item_type: ItemType,
        status: ItemStatus,
    ) -> StoreResult<Vec<Item>> {
        Ok(self
            .working
            .items
            .values()
            .filter(|i| i.item_type == item_type && i.status == status)
            .cloned()
            .collect())
    }

    fn items_for_user(&self, user: UserId, status: ItemStatus) -> StoreResult<Vec<Item>> {
        Ok(self
            .working
            .items
            .values()
            .filter(|i| i.user_id == user && i.status == status)
            .cloned()
            .collect())
    }

    fn match_record(&self, id: MatchId) -> StoreResult<Option<Match>> {
        Ok(self.working.matches.get(&id).cloned())
    }

    fn matches_for_lost_items(
        &self,
        lost_item_ids: &[ItemId],
        status: MatchStatus,
    ) -> StoreResult<Vec<Match>> {
        Ok(self
            .working
            .matches
            .values()
            .filter(|m| m.status == status && lost_item_ids.contains(&m.lost_item_id))
            .cloned()
            .collect())
    }

    fn match_exists(&self, lost: ItemId, found: ItemId) -> StoreResult<bool> {
        Ok(self
            .working
            .matches
            .values()
            .any(|m| m.lost_item_id == lost && m.found_item_id == found))
    }

    fn insert_user(&mut self, user: NewUser) -> StoreResult<User> {
        if self.user_by_username(&user.username)?.is_some() {
            return Err(StoreError::UsernameTaken(user.username));
        }

        let id = UserId(self.working.next_user_id);
        self.working.next_user_id += 1;

        let record = User {
            id,
            username: user.username,
            phone_number: user.phone_number,
            is_admin: user.is_admin,
            coins: 0,
        };
        self.working.users.insert(id, record.clone());
        Ok(record)
    }

    fn insert_item(&mut self, item: NewItem) -> StoreResult<Item> {
        if !self.working.users.contains_key(&item.user_id) {
            return Err(StoreError::UserNotFound(item.user_id));
        }

        let id = ItemId(self.working.next_item_id);
        self.working.next_item_id += 1;

        let record = Item {
            id,
            user_id: item.user_id,
            item_type: item.item_type,
            status: ItemStatus::Active,
            title: item.title,
            description: item.description,
            image_file: item.image_file,
            location: item.location,
            location_landmark: item.location_landmark,
            created_at: Utc::now(),
            image_embedding: item.image_embedding,
            text_embedding: item.text_embedding,
        };
        self.working.items.insert(id, record.clone());
        Ok(record)
    }

    fn insert_match(&mut self, new_match: NewMatch) -> StoreResult<Match> {
        for item_id in [new_match.lost_item_id, new_match.found_item_id] {
            if !self.working.items.contains_key(&item_id) {
                return Err(StoreError::ItemNotFound(item_id));
            }
        }

        let id = MatchId(self.working.next_match_id);
        self.working.next_match_id += 1;

        let record = Match {
            id,
            lost_item_id: new_match.lost_item_id,
            found_item_id: new_match.found_item_id,
            similarity_score: new_match.similarity_score,
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        };
        self.working.matches.insert(id, record.clone());
        Ok(record)
    }

    fn transition_match(
        &mut self,
        id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    ) -> StoreResult<bool> {
        let record = self
            .working
            .matches
            .get_mut(&id)
            .ok_or(StoreError::MatchNotFound(id))?;

        if record.status != from {
            return Ok(false);
        }
        record.status = to;
        Ok(true)
    }

    fn set_item_status(&mut self, id: ItemId, status: ItemStatus) -> StoreResult<()> {
        self.item_mut(id)?.status = status;
        Ok(())
    }

    fn credit_coins(&mut self, user: UserId, amount: u64) -> StoreResult<u64> {
        let record = self
            .working
            .users
            .get_mut(&user)
            .ok_or(StoreError::UserNotFound(user))?;

        record.coins = record
            .coins
            .checked_add(amount)
            .ok_or(StoreError::CoinOverflow(user))?;
        Ok(record.coins)
    }

    async fn commit(self) -> StoreResult<()> {
        let MemoryTransaction {
            mut guard,
            working,
            snapshot_path,
        } = self;

        // Lock held until the snapshot is durable.
        if let Some(path) = snapshot_path {
            let bytes = encode_snapshot(&working)?;
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || write_snapshot_bytes(&path, &bytes))
                .await
                .map_err(|e| StoreError::Unavailable {
                    reason: format!("snapshot writer task failed: {}", e),
                })??;
        }

        debug!(
            users = working.users.len(),
            items = working.items.len(),
            matches = working.matches.len(),
            "Unit of work committed"
        );
        *guard = working;
        Ok(())
    }
}
