use minesweeper_core::*;

use crate::store::GameStore;
use crate::{GameIdGenerator, Result, ServiceError};

/// Entry point for front ends: creates games and applies moves to them.
///
/// Moves run inside [`GameStore::update`], so the read, the engine mutation
/// and the write happen under one writer lock and concurrent moves on the
/// same user's games cannot overwrite each other.
#[derive(Debug)]
pub struct GameService<S> {
    store: S,
    ids: GameIdGenerator,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: GameIdGenerator::new(),
        }
    }

    /// Creates a game and appends it to the user's list.
    ///
    /// The game id doubles as the board seed, so a board can be regenerated from its id.
    pub fn create_game(
        &self,
        user_id: &str,
        rows: Coord,
        columns: Coord,
        mines: CellCount,
    ) -> Result<Game> {
        let config = GameConfig::new((rows, columns), mines)?;
        let mut game = self.new_game(config);

        self.store.update(user_id, &mut |user_game| {
            // another generator sharing the store may have issued the same id
            while user_game.game(game.game_id()).is_some() {
                log::warn!("Game id {} already taken for {}", game.game_id(), user_id);
                game = self.new_game(config);
            }
            user_game.push(game.clone())
        })?;

        log::debug!(
            "Created game {} for {}: {}x{} with {} mines",
            game.game_id(),
            user_id,
            rows,
            columns,
            mines
        );
        Ok(game)
    }

    fn new_game(&self, config: GameConfig) -> Game {
        let game_id = self.ids.next_id();
        let board = RandomBoardGenerator::new(game_id as u64).generate(config);
        Game::new(game_id, board)
    }

    pub fn reveal_cell(&self, user_id: &str, game_id: GameId, coords: Coord2) -> Result<Game> {
        self.play(user_id, game_id, |game| {
            let outcome = game.reveal(coords)?;
            log::debug!("Reveal {:?} in game {}: {:?}", coords, game_id, outcome);
            Ok(outcome.has_update())
        })
    }

    pub fn flag_cell(
        &self,
        user_id: &str,
        game_id: GameId,
        coords: Coord2,
        marker: Flag,
    ) -> Result<Game> {
        self.play(user_id, game_id, |game| {
            let outcome = game.flag(coords, marker)?;
            log::debug!(
                "Flag {:?} with {} in game {}: {:?}",
                coords,
                marker,
                game_id,
                outcome
            );
            Ok(outcome.has_update())
        })
    }

    /// `None` when the user or the game does not exist.
    pub fn game(&self, user_id: &str, game_id: GameId) -> Result<Option<Game>> {
        Ok(self
            .store
            .get(user_id)?
            .and_then(|user_game| user_game.game(game_id).cloned()))
    }

    pub fn games_for_user(&self, user_id: &str) -> Result<Option<UserGame>> {
        Ok(self.store.get(user_id)?)
    }

    pub fn all_users(&self) -> Result<Vec<UserGame>> {
        Ok(self.store.get_all()?)
    }

    pub fn delete_all(&self) -> Result<()> {
        log::debug!("Deleting every stored game");
        Ok(self.store.delete_all()?)
    }

    pub fn show_solution(&self, user_id: &str, game_id: GameId) -> Result<Option<String>> {
        Ok(self.game(user_id, game_id)?.as_ref().map(render_solution))
    }

    pub fn show_status(&self, user_id: &str, game_id: GameId) -> Result<Option<String>> {
        Ok(self.game(user_id, game_id)?.as_ref().map(render_status))
    }

    /// Applies `action` to one game under the store's writer lock.
    ///
    /// `action` reports whether it changed the game; unchanged games are not written back.
    fn play<F>(&self, user_id: &str, game_id: GameId, mut action: F) -> Result<Game>
    where
        F: FnMut(&mut Game) -> minesweeper_core::Result<bool>,
    {
        let mut result = Err(ServiceError::GameNotFound);
        self.store.update(user_id, &mut |user_game| {
            let Some(game) = user_game.game_mut(game_id) else {
                result = Err(ServiceError::GameNotFound);
                return false;
            };
            match action(game) {
                Ok(changed) => {
                    result = Ok(game.clone());
                    changed
                }
                Err(err) => {
                    result = Err(err.into());
                    false
                }
            }
        })?;
        result
    }
}
