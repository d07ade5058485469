use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Marker a player can put on an unrevealed cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    #[default]
    None,
    RedFlag,
    QuestionMark,
}

impl Flag {
    pub const fn is_marked(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RedFlag => "red_flag",
            Self::QuestionMark => "question_mark",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "red_flag" => Ok(Self::RedFlag),
            "question_mark" => Ok(Self::QuestionMark),
            _ => Err(GameError::InvalidMarker),
        }
    }
}

/// One square of the board.
///
/// `has_mine` and `surrounded_by` are fixed when the board is generated; only
/// `is_revealed` and `flag` change during play.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_revealed: bool,
    pub has_mine: bool,
    pub surrounded_by: u8,
    pub flag: Flag,
}

impl Cell {
    /// Whether this cell is in its winning state: safe cells revealed, mines red-flagged.
    pub const fn is_settled(self) -> bool {
        if self.has_mine {
            matches!(self.flag, Flag::RedFlag)
        } else {
            self.is_revealed
        }
    }

    /// Glyph showing what lies under the cell, regardless of play state.
    pub fn solution_glyph(self) -> Glyph {
        if self.has_mine {
            Glyph::Mine
        } else if self.surrounded_by == 0 {
            Glyph::Empty
        } else {
            Glyph::Count(self.surrounded_by)
        }
    }

    /// Glyph showing what the player currently sees.
    pub fn status_glyph(self) -> Glyph {
        if self.is_revealed {
            return self.solution_glyph();
        }
        match self.flag {
            Flag::RedFlag => Glyph::RedFlag,
            Flag::QuestionMark => Glyph::Question,
            Flag::None => Glyph::Hidden,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Glyph {
    Mine,
    Empty,
    Count(u8),
    RedFlag,
    Question,
    Hidden,
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mine => f.write_str(" * "),
            Self::Empty => f.write_str(" _ "),
            Self::Count(count) => write!(f, " {count} "),
            Self::RedFlag => f.write_str(" F "),
            Self::Question => f.write_str(" ? "),
            Self::Hidden => f.write_str(" □ "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parses_known_markers() {
        assert_eq!("red_flag".parse(), Ok(Flag::RedFlag));
        assert_eq!("question_mark".parse(), Ok(Flag::QuestionMark));
        assert_eq!("none".parse(), Ok(Flag::None));
    }

    #[test]
    fn flag_rejects_unknown_marker() {
        assert_eq!("flag".parse::<Flag>(), Err(GameError::InvalidMarker));
        assert_eq!("RED_FLAG".parse::<Flag>(), Err(GameError::InvalidMarker));
    }

    #[test]
    fn status_glyph_hides_unrevealed_contents() {
        let mine = Cell {
            has_mine: true,
            ..Default::default()
        };
        assert_eq!(mine.status_glyph(), Glyph::Hidden);
        assert_eq!(mine.solution_glyph(), Glyph::Mine);

        let flagged = Cell {
            flag: Flag::QuestionMark,
            surrounded_by: 2,
            ..Default::default()
        };
        assert_eq!(flagged.status_glyph(), Glyph::Question);
        assert_eq!(flagged.solution_glyph(), Glyph::Count(2));
    }

    #[test]
    fn settled_requires_red_flag_on_mines() {
        let mut mine = Cell {
            has_mine: true,
            flag: Flag::QuestionMark,
            ..Default::default()
        };
        assert!(!mine.is_settled());
        mine.flag = Flag::RedFlag;
        assert!(mine.is_settled());
    }
}
