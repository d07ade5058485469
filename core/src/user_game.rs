use serde::{Deserialize, Serialize};

use crate::*;

/// All games owned by one user, in creation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserGame {
    pub user_id: String,
    pub games: Vec<Game>,
}

impl UserGame {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            games: Vec::new(),
        }
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.games.iter().find(|game| game.game_id() == game_id)
    }

    pub fn game_mut(&mut self, game_id: GameId) -> Option<&mut Game> {
        self.games.iter_mut().find(|game| game.game_id() == game_id)
    }

    /// Appends a game, refusing ids that are already present.
    pub fn push(&mut self, game: Game) -> bool {
        if self.game(game.game_id()).is_some() {
            log::warn!(
                "User {} already owns game {}, not adding it again",
                self.user_id,
                game.game_id()
            );
            return false;
        }
        self.games.push(game);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(game_id: GameId) -> Game {
        Game::new(game_id, Board::from_mine_coords((2, 2), &[(0, 0)]).unwrap())
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut user_game = UserGame::new("alice");
        assert!(user_game.push(game(3)));
        assert!(user_game.push(game(1)));
        assert!(user_game.push(game(2)));

        let ids: Vec<_> = user_game.games.iter().map(Game::game_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut user_game = UserGame::new("alice");
        assert!(user_game.push(game(1)));
        assert!(!user_game.push(game(1)));

        assert_eq!(user_game.games.len(), 1);
    }

    #[test]
    fn lookup_by_id() {
        let mut user_game = UserGame::new("alice");
        user_game.push(game(10));
        user_game.push(game(20));

        assert_eq!(user_game.game(20).map(Game::game_id), Some(20));
        assert!(user_game.game(30).is_none());
        user_game.game_mut(10).unwrap().reveal((1, 1)).unwrap();
        assert!(user_game.game(10).unwrap().cell_at((1, 1)).is_revealed);
    }
}
