//! Errors raised while building or querying a level.

use crate::level::CharacterId;
use crate::point::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// A level needs at least one room.
    EmptyGrid,
    /// The wall cap is a percentage and cannot exceed 100.
    WallPercentOutOfRange { percent: u8 },
    /// Portals must take at least one tick to charge.
    ZeroPortalDuration,
    /// Grids of size 0 or 1 have no internal edges to generate.
    NoInternalEdges { size: usize },
    OutOfBounds { point: Point, size: usize },
    UnknownCharacter(CharacterId),
    UnplacedCharacter(CharacterId),
    DuplicateCharacter(String),
    /// Characters are told apart and drawn by name, so it cannot be blank.
    EmptyCharacterName,
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::EmptyGrid => write!(f, "Level size must be at least 1"),
            LevelError::WallPercentOutOfRange { percent } => {
                write!(f, "Wall cap {}% is out of range (0-100)", percent)
            }
            LevelError::ZeroPortalDuration => write!(f, "Portal duration must be at least 1 tick"),
            LevelError::NoInternalEdges { size } => {
                write!(f, "A {}x{} grid has no internal edges", size, size)
            }
            LevelError::OutOfBounds { point, size } => {
                write!(f, "Point {} is outside the {}x{} grid", point, size, size)
            }
            LevelError::UnknownCharacter(id) => write!(f, "Unknown character {}", id),
            LevelError::UnplacedCharacter(id) => {
                write!(f, "Character {} has not been placed in a room", id)
            }
            LevelError::DuplicateCharacter(name) => {
                write!(f, "Character name '{}' is already taken", name)
            }
            LevelError::EmptyCharacterName => write!(f, "Character name must not be blank"),
        }
    }
}

impl std::error::Error for LevelError {}
