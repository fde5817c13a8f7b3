//! Random boundaries for internal edges.
//!
//! External edges are always walls and are built by the level directly.
//! Internal edges draw uniformly from wall/door/portal, except that walls
//! are capped at `max_walls_percent` of all internal edges; a wall drawn
//! past the cap is rejected and the draw repeats.

use rand::Rng;

use crate::boundary::{Boundary, BoundaryKind, BoundaryPosition, BoundaryVariant, Portal};
use crate::config::LevelConfig;
use crate::error::LevelError;
use crate::room::RoomId;

const KINDS: [BoundaryKind; 3] = [BoundaryKind::Wall, BoundaryKind::Door, BoundaryKind::Portal];

#[derive(Debug, Clone)]
pub struct BoundaryGenerator {
    max_walls_percent: u8,
    portal_duration: u32,
    internal_boundaries_amount: usize,
    internal_walls_amount: usize,
}

impl BoundaryGenerator {
    /// Generator for a `size × size` grid. Grids without internal edges
    /// (size 0 or 1) are rejected.
    pub fn new(size: usize, max_walls_percent: u8, portal_duration: u32) -> Result<Self, LevelError> {
        let internal_boundaries_amount = Self::internal_boundaries_amount(size);
        if internal_boundaries_amount == 0 {
            return Err(LevelError::NoInternalEdges { size });
        }
        Ok(Self {
            max_walls_percent,
            portal_duration,
            internal_boundaries_amount,
            internal_walls_amount: 0,
        })
    }

    pub fn from_config(config: &LevelConfig) -> Result<Self, LevelError> {
        Self::new(config.size, config.max_wall_percent, config.portal_duration)
    }

    /// Edges between horizontally adjacent rooms plus edges between
    /// vertically adjacent rooms: `2·size·(size−1)`.
    pub fn internal_boundaries_amount(size: usize) -> usize {
        2 * size * size.saturating_sub(1)
    }

    /// Outward-facing slots of the edge rooms: `4·size`.
    pub fn external_boundaries_amount(size: usize) -> usize {
        4 * size
    }

    pub fn walls_generated(&self) -> usize {
        self.internal_walls_amount
    }

    pub fn walls_percent(&self) -> f32 {
        self.internal_walls_amount as f32 * 100.0 / self.internal_boundaries_amount as f32
    }

    fn wall_allowed(&self) -> bool {
        (self.internal_walls_amount + 1) * 100
            <= self.max_walls_percent as usize * self.internal_boundaries_amount
    }

    /// Draw the behaviour of the next internal boundary.
    pub fn next_variant(&mut self, rng: &mut impl Rng) -> BoundaryVariant {
        loop {
            match KINDS[rng.gen_range(0..KINDS.len())] {
                BoundaryKind::Wall if !self.wall_allowed() => continue,
                BoundaryKind::Wall => {
                    self.internal_walls_amount += 1;
                    return BoundaryVariant::Wall;
                }
                BoundaryKind::Door => return BoundaryVariant::Door,
                BoundaryKind::Portal => {
                    return BoundaryVariant::Portal(Portal::new(self.portal_duration))
                }
            }
        }
    }

    /// A random boundary between `room_1` and `room_2`.
    pub fn get_boundary(
        &mut self,
        position: BoundaryPosition,
        room_1: RoomId,
        room_2: RoomId,
        rng: &mut impl Rng,
    ) -> Boundary {
        Boundary::new(self.next_variant(rng), position, room_1, Some(room_2))
    }
}
