//! Rooms, the cells of the grid.
//!
//! A room knows its coordinates and which boundary sits in each of its four
//! slots. Boundaries live in the level's arena; rooms refer to them by
//! [`BoundaryId`], so two neighbouring rooms hold the same handle for the
//! boundary between them.

use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::boundary::{Boundary, Passage};
use crate::level::CharacterId;
use crate::point::{Direction, Point};

/// Stable handle of a room inside a [`Level`](crate::level::Level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(usize);

impl RoomId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Stable handle of a boundary inside a [`Level`](crate::level::Level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoundaryId(usize);

impl BoundaryId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    location: Point,
    /// up, right, down, left
    slots: [Option<BoundaryId>; 4],
    /// Boundary each character in this room tried last.
    last_attempts: Vec<(CharacterId, BoundaryId)>,
}

impl Room {
    pub fn new(id: RoomId, location: Point) -> Self {
        Self {
            id,
            location,
            slots: [None; 4],
            last_attempts: Vec::new(),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn x(&self) -> usize {
        self.location.x
    }

    pub fn y(&self) -> usize {
        self.location.y
    }

    pub fn boundary(&self, direction: Direction) -> Option<BoundaryId> {
        self.slots[direction.slot()]
    }

    pub fn set_boundary(&mut self, direction: Direction, boundary: BoundaryId) {
        self.slots[direction.slot()] = Some(boundary);
    }

    /// Slots paired with their direction, in up/right/down/left order.
    pub fn slots(&self) -> impl Iterator<Item = (Direction, Option<BoundaryId>)> + '_ {
        Direction::ALL.into_iter().map(move |d| (d, self.boundary(d)))
    }

    /// All four slots are populated.
    pub fn is_enclosed(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The boundary `character` attempted last from this room, if any.
    pub fn last_attempt(&self, character: CharacterId) -> Option<BoundaryId> {
        self.last_attempts
            .iter()
            .find(|(c, _)| *c == character)
            .map(|&(_, b)| b)
    }

    /// Route a move request to the boundary in `direction`.
    ///
    /// If `character` last tried a different boundary from this room, that
    /// boundary is told the character is gone before the new attempt runs.
    /// An empty slot is a no-op.
    pub fn release_towards(
        &mut self,
        direction: Direction,
        character: CharacterId,
        boundaries: &mut [Boundary],
    ) -> Passage {
        let Some(target) = self.boundary(direction) else {
            warn!(
                "{} at {} has no {direction} boundary",
                self.id, self.location
            );
            return Passage::Blocked;
        };

        if let Some(previous) = self.record_attempt(character, target) {
            if let Some(boundary) = boundaries.get_mut(previous.index()) {
                boundary.character_is_gone(character);
            }
        }

        match boundaries.get_mut(target.index()) {
            Some(boundary) => boundary.attempt_passage(character, self.id),
            None => {
                error!(
                    "{} references missing boundary #{}",
                    self.id,
                    target.index()
                );
                Passage::Blocked
            }
        }
    }

    /// Forget `character`'s attempts; called when it leaves the room.
    /// Returns the boundary it had been attempting.
    pub fn forget(&mut self, character: CharacterId) -> Option<BoundaryId> {
        let index = self.last_attempts.iter().position(|(c, _)| *c == character)?;
        Some(self.last_attempts.swap_remove(index).1)
    }

    /// Remember `target` as `character`'s latest attempt. Returns the
    /// previous boundary if it differs.
    fn record_attempt(&mut self, character: CharacterId, target: BoundaryId) -> Option<BoundaryId> {
        match self.last_attempts.iter_mut().find(|(c, _)| *c == character) {
            Some(entry) if entry.1 == target => None,
            Some(entry) => Some(std::mem::replace(&mut entry.1, target)),
            None => {
                self.last_attempts.push((character, target));
                None
            }
        }
    }
}
