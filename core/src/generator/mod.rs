use crate::*;
pub use random::*;

mod random;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Board;
}

/// Validates the dimensions and mine count, then places mines with a generator seeded by `seed`.
pub fn generate(size: Coord2, mines: CellCount, seed: u64) -> Result<Board> {
    let config = GameConfig::new(size, mines)?;
    Ok(RandomBoardGenerator::new(seed).generate(config))
}
