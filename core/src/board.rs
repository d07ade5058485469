use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

fn to_coord(len: usize) -> Coord {
    Coord::try_from(len).unwrap_or(Coord::MAX)
}

/// Rectangular grid of cells, indexed by `(row, column)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// Builds a board from a mine mask, computing every neighbor count once.
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let cells = Array2::from_shape_fn(mine_mask.dim(), |(row, column)| {
            let coords = (to_coord(row), to_coord(column));
            let surrounded_by = mine_mask
                .iter_neighbors(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count() as u8;
            Cell {
                has_mine: mine_mask[[row, column]],
                surrounded_by,
                ..Default::default()
            }
        });
        Self { cells }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::OutOfBounds);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(&mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (to_coord(rows), to_coord(columns))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_cells(|cell| cell.has_mine)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.count_cells(|cell| cell.is_revealed)
    }

    pub fn red_flag_count(&self) -> CellCount {
        self.count_cells(|cell| cell.flag == Flag::RedFlag)
    }

    /// Every safe cell revealed and every mine red-flagged.
    ///
    /// Recomputed from scratch on every call.
    pub fn is_won(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_settled())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Board rows in order, each yielding its cells left to right.
    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = &Cell>> {
        self.cells.outer_iter().map(|row| row.into_iter())
    }

    fn count_cells(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        self.cells.iter().filter(|cell| predicate(cell)).count() as CellCount
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbor_counts_are_clipped_at_edges() {
        // * . .
        // . . .
        // . . *
        let board = Board::from_mine_coords((3, 3), &[(0, 0), (2, 2)]).unwrap();

        assert_eq!(board[(0, 1)].surrounded_by, 1);
        assert_eq!(board[(1, 1)].surrounded_by, 2);
        assert_eq!(board[(2, 0)].surrounded_by, 0);
        assert_eq!(board[(0, 2)].surrounded_by, 0);
        assert_eq!(board[(2, 1)].surrounded_by, 1);
        assert_eq!(board.mine_count(), 2);
    }

    #[test]
    fn mines_count_their_mined_neighbors() {
        let board = Board::from_mine_coords((1, 3), &[(0, 0), (0, 1)]).unwrap();

        assert_eq!(board[(0, 0)].surrounded_by, 1);
        assert_eq!(board[(0, 1)].surrounded_by, 1);
        assert_eq!(board[(0, 2)].surrounded_by, 1);
    }

    #[test]
    fn rejects_mines_outside_the_grid() {
        assert_eq!(
            Board::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            Board::from_mine_coords((0, 2), &[]),
            Err(GameError::InvalidDimensions)
        );
    }

    #[test]
    fn validate_coords_checks_both_axes() {
        let board = Board::from_mine_coords((2, 3), &[(0, 0)]).unwrap();

        assert_eq!(board.validate_coords((1, 2)), Ok((1, 2)));
        assert_eq!(board.validate_coords((2, 0)), Err(GameError::OutOfBounds));
        assert_eq!(board.validate_coords((0, 3)), Err(GameError::OutOfBounds));
    }

    #[test]
    fn win_needs_safe_cells_revealed_and_mines_red_flagged() {
        let mut board = Board::from_mine_coords((2, 2), &[(1, 1)]).unwrap();
        for coords in [(0, 0), (0, 1), (1, 0)] {
            board[coords].is_revealed = true;
        }
        assert!(!board.is_won());

        board[(1, 1)].flag = Flag::RedFlag;
        assert!(board.is_won());

        board[(1, 1)].flag = Flag::QuestionMark;
        assert!(!board.is_won());

        board[(1, 1)].flag = Flag::RedFlag;
        board[(0, 1)].is_revealed = false;
        assert!(!board.is_won());
    }

    #[test]
    fn rows_follow_row_major_order() {
        let board = Board::from_mine_coords((2, 3), &[(1, 2)]).unwrap();

        let lengths: Vec<_> = board.rows().map(|row| row.count()).collect();
        assert_eq!(lengths, vec![3, 3]);
        let last = board.rows().last().unwrap().last().unwrap();
        assert!(last.has_mine);
    }
}
