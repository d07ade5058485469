use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::*;

/// Places mines by rejection sampling: draw a uniformly random cell and mine it
/// unless it already holds a mine, until the requested count is reached.
///
/// The random source is owned by the generator, so concurrent generation never
/// shares state and the same seed always yields the same board.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Board {
        let (rows, columns) = config.size;
        let total_cells = config.total_cells();

        // never loop forever on a board that cannot hold the mines
        let mines = if config.mines >= total_cells {
            log::warn!(
                "Requested {} mines but board only has {} cells, leaving one safe cell",
                config.mines,
                total_cells
            );
            total_cells.saturating_sub(1)
        } else {
            config.mines
        };

        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut mines_placed = 0;
        let mut draws: u64 = 0;

        while mines_placed < mines {
            let coords: Coord2 = (rng.random_range(0..rows), rng.random_range(0..columns));
            draws += 1;
            let tile = &mut mine_mask[coords.to_nd_index()];
            if !*tile {
                *tile = true;
                mines_placed += 1;
            }
        }

        log::trace!(
            "Placed {} mines on {}x{} board in {} draws (seed {})",
            mines_placed,
            rows,
            columns,
            draws,
            self.seed
        );
        Board::from_mine_mask(&mine_mask)
    }
}
