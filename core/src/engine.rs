use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - OnGoing -> Won
/// - OnGoing -> Lost
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    OnGoing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnGoing => "on_going",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

/// One played instance, from creation until it is won or lost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    game_id: GameId,
    rows: Coord,
    columns: Coord,
    mines: CellCount,
    start: DateTime<Utc>,
    finish: Option<DateTime<Utc>>,
    cells_revealed: CellCount,
    status: GameStatus,
    board: Board,
}

impl Game {
    pub fn new(game_id: GameId, board: Board) -> Self {
        let (rows, columns) = board.size();
        let start = Utc::now();
        log::debug!("Game {} started at {}", game_id, start);
        Self {
            game_id,
            rows,
            columns,
            mines: board.mine_count(),
            start,
            finish: None,
            cells_revealed: board.revealed_count(),
            status: GameStatus::OnGoing,
            board,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn size(&self) -> Coord2 {
        (self.rows, self.columns)
    }

    pub fn total_mines(&self) -> CellCount {
        self.mines
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn finish(&self) -> Option<DateTime<Utc>> {
        self.finish
    }

    pub fn cells_revealed(&self) -> CellCount {
        self.cells_revealed
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board[coords]
    }

    /// How many mines have not been red-flagged yet
    pub fn mines_left(&self) -> i64 {
        i64::from(self.mines) - i64::from(self.board.red_flag_count())
    }

    /// Reveals a cell, flood-filling through cells without adjacent mines.
    ///
    /// Revealing a mine loses the game on the spot. Revealing an already
    /// revealed cell changes nothing.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.check_on_going()?;
        let coords = self.board.validate_coords(coords)?;

        let cell = self.board[coords];
        if cell.is_revealed {
            return Ok(RevealOutcome::NoChange);
        }

        if cell.has_mine {
            let target = &mut self.board[coords];
            target.is_revealed = true;
            target.flag = Flag::None;
            self.cells_revealed += 1;
            log::debug!("Game {} hit mine at {:?}", self.game_id, coords);
            self.end_game(false);
            return Ok(RevealOutcome::HitMine);
        }

        let opened = self.flood_reveal(coords);
        log::debug!(
            "Game {} revealed {} cell(s) from {:?}",
            self.game_id,
            opened,
            coords
        );

        if self.board.is_won() {
            self.end_game(true);
            Ok(RevealOutcome::Won)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    /// Toggles `marker` on an unrevealed cell.
    ///
    /// Applying the marker the cell already carries clears it; applying a
    /// different marker replaces it. Revealed cells are left alone.
    pub fn flag(&mut self, coords: Coord2, marker: Flag) -> Result<MarkOutcome> {
        self.check_on_going()?;
        let coords = self.board.validate_coords(coords)?;
        if !marker.is_marked() {
            return Err(GameError::InvalidMarker);
        }

        let cell = &mut self.board[coords];
        if cell.is_revealed {
            return Ok(MarkOutcome::NoChange);
        }

        cell.flag = if cell.flag == marker { Flag::None } else { marker };
        log::debug!(
            "Game {} marked {:?} as {}",
            self.game_id,
            coords,
            cell.flag
        );

        if self.board.is_won() {
            self.end_game(true);
            Ok(MarkOutcome::Won)
        } else {
            Ok(MarkOutcome::Changed)
        }
    }

    /// Worklist flood-fill, using `is_revealed` as the visited mark.
    ///
    /// Mines and marked cells are never queued, so they stop the fill.
    fn flood_reveal(&mut self, start: Coord2) -> CellCount {
        let mut opened = 0;
        let mut to_visit = vec![start];

        while let Some(visit_coords) = to_visit.pop() {
            let cell = &mut self.board[visit_coords];
            if cell.is_revealed {
                continue;
            }
            cell.is_revealed = true;
            cell.flag = Flag::None;
            let surrounded_by = cell.surrounded_by;
            opened += 1;
            log::trace!(
                "Flood opened cell at {:?}, mine count: {}",
                visit_coords,
                surrounded_by
            );

            if surrounded_by == 0 {
                let board = &self.board;
                to_visit.extend(board.iter_neighbors(visit_coords).filter(|&pos| {
                    let neighbor = board[pos];
                    !neighbor.is_revealed && !neighbor.has_mine && !neighbor.flag.is_marked()
                }));
            }
        }

        self.cells_revealed += opened;
        opened
    }

    fn end_game(&mut self, won: bool) {
        if self.status.is_finished() {
            return;
        }

        self.status = if won {
            GameStatus::Won
        } else {
            GameStatus::Lost
        };
        let now = Utc::now();
        self.finish = Some(now);
        log::debug!("Game {} {} at {}", self.game_id, self.status.as_str(), now);
    }

    fn check_on_going(&self) -> Result<()> {
        if self.status.is_finished() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }
}
