use std::sync::Arc;

use minesweeper_core::UserGame;

use crate::StoreResult;

pub use document::*;
pub use memory::*;

mod document;
mod memory;

/// Keyed collection of per-user game lists.
///
/// Every backend must behave identically: `get` returns `None` for unknown
/// users, `upsert` replaces the whole `games` list, and writers are serialized.
pub trait GameStore: Send + Sync {
    fn get(&self, user_id: &str) -> StoreResult<Option<UserGame>>;

    /// Snapshot of every record, in no particular order.
    fn get_all(&self) -> StoreResult<Vec<UserGame>>;

    fn upsert(&self, user_game: UserGame) -> StoreResult<()>;

    fn delete_all(&self) -> StoreResult<()>;

    /// Runs `mutate` on the record for `user_id` while holding the writer lock.
    ///
    /// Unknown users are handed an empty record. The record is written back
    /// only when `mutate` returns `true`.
    fn update(&self, user_id: &str, mutate: &mut dyn FnMut(&mut UserGame) -> bool)
    -> StoreResult<()>;
}

impl<T: GameStore + ?Sized> GameStore for Box<T> {
    fn get(&self, user_id: &str) -> StoreResult<Option<UserGame>> {
        (**self).get(user_id)
    }

    fn get_all(&self) -> StoreResult<Vec<UserGame>> {
        (**self).get_all()
    }

    fn upsert(&self, user_game: UserGame) -> StoreResult<()> {
        (**self).upsert(user_game)
    }

    fn delete_all(&self) -> StoreResult<()> {
        (**self).delete_all()
    }

    fn update(
        &self,
        user_id: &str,
        mutate: &mut dyn FnMut(&mut UserGame) -> bool,
    ) -> StoreResult<()> {
        (**self).update(user_id, mutate)
    }
}

impl<T: GameStore + ?Sized> GameStore for Arc<T> {
    fn get(&self, user_id: &str) -> StoreResult<Option<UserGame>> {
        (**self).get(user_id)
    }

    fn get_all(&self) -> StoreResult<Vec<UserGame>> {
        (**self).get_all()
    }

    fn upsert(&self, user_game: UserGame) -> StoreResult<()> {
        (**self).upsert(user_game)
    }

    fn delete_all(&self) -> StoreResult<()> {
        (**self).delete_all()
    }

    fn update(
        &self,
        user_id: &str,
        mutate: &mut dyn FnMut(&mut UserGame) -> bool,
    ) -> StoreResult<()> {
        (**self).update(user_id, mutate)
    }
}
