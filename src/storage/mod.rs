//! Persistence: the domain model, unit-of-work traits and the in-memory store.
//!
//! Every logical operation (report, matching pass, return confirmation) runs
//! inside one [`UnitOfWork`]. Changes become visible only when
//! [`UnitOfWork::commit`] succeeds; dropping a unit of work discards them.

pub mod error;
/// In-memory store with optional JSON snapshot.
pub mod memory;
mod model;
/// On-disk snapshot format.
pub mod snapshot;


pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, MemoryTransaction};
pub use model::{
    GeoPoint, Item, ItemId, ItemStatus, ItemType, Match, MatchId, MatchStatus, NewItem, NewMatch,
    NewUser, User, UserId,
};

use std::future::Future;

/// A single atomic batch of reads and writes.
///
/// Reads observe earlier writes made through the same unit of work.
pub trait UnitOfWork: Send {
    fn user(&self, id: UserId) -> StoreResult<Option<User>>;

    fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// All users, ordered by id.
    fn users(&self) -> StoreResult<Vec<User>>;

    fn item(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Items of `item_type` with `status`, ordered by id.
    fn items_by_type_and_status(
        &self,
        item_type: ItemType,
        status: ItemStatus,
    ) -> StoreResult<Vec<Item>>;

    /// Items owned by `user` with `status`, ordered by id.
    fn items_for_user(&self, user: UserId, status: ItemStatus) -> StoreResult<Vec<Item>>;

    fn match_record(&self, id: MatchId) -> StoreResult<Option<Match>>;

    /// Matches with `status` whose lost item is in `lost_item_ids`, ordered by id.
    fn matches_for_lost_items(
        &self,
        lost_item_ids: &[ItemId],
        status: MatchStatus,
    ) -> StoreResult<Vec<Match>>;

    /// Returns `true` if any match (in any status) links `lost` to `found`.
    fn match_exists(&self, lost: ItemId, found: ItemId) -> StoreResult<bool>;

    /// Fails with [`StoreError::UsernameTaken`] on a duplicate username.
    fn insert_user(&mut self, user: NewUser) -> StoreResult<User>;

    fn insert_item(&mut self, item: NewItem) -> StoreResult<Item>;

    fn insert_match(&mut self, new_match: NewMatch) -> StoreResult<Match>;

    /// Moves a match from `from` to `to`.
    ///
    /// Returns `false` (and changes nothing) if the match is not in `from`.
    fn transition_match(
        &mut self,
        id: MatchId,
        from: MatchStatus,
        to: MatchStatus,
    ) -> StoreResult<bool>;

    fn set_item_status(&mut self, id: ItemId, status: ItemStatus) -> StoreResult<()>;

    /// Adds `amount` coins to `user` and returns the new balance.
    fn credit_coins(&mut self, user: UserId, amount: u64) -> StoreResult<u64>;

    /// Makes every write visible at once, or none of them.
    ///
    /// Durable writes happen off the async runtime; the store stays locked
    /// until they finish.
    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send
    where
        Self: Sized;
}

/// Source of units of work. Implementations serialise writers.
pub trait Store: Send + Sync {
    type Tx<'a>: UnitOfWork
    where
        Self: 'a;

    fn begin(&self) -> impl Future<Output = StoreResult<Self::Tx<'_>>> + Send;
}
