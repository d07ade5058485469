use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use minesweeper_core::UserGame;

use super::GameStore;
use crate::StoreResult;

/// Process-local store; one lock guards the whole collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserGame>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // records are only ever replaced whole, so a poisoned lock still guards consistent data
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, UserGame>> {
        self.users.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, UserGame>> {
        self.users.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GameStore for MemoryStore {
    fn get(&self, user_id: &str) -> StoreResult<Option<UserGame>> {
        Ok(self.read().get(user_id).cloned())
    }

    fn get_all(&self) -> StoreResult<Vec<UserGame>> {
        Ok(self.read().values().cloned().collect())
    }

    fn upsert(&self, user_game: UserGame) -> StoreResult<()> {
        log::trace!("Upserting {} game(s) for {}", user_game.games.len(), user_game.user_id);
        self.write().insert(user_game.user_id.clone(), user_game);
        Ok(())
    }

    fn delete_all(&self) -> StoreResult<()> {
        let mut users = self.write();
        log::debug!("Deleting {} user record(s)", users.len());
        users.clear();
        Ok(())
    }

    fn update(
        &self,
        user_id: &str,
        mutate: &mut dyn FnMut(&mut UserGame) -> bool,
    ) -> StoreResult<()> {
        let mut users = self.write();
        let mut record = users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserGame::new(user_id));
        if mutate(&mut record) {
            users.insert(user_id.to_owned(), record);
        }
        Ok(())
    }
}
