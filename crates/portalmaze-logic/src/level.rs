//! The level: a `size × size` grid of rooms, the boundaries between them,
//! and the characters walking through it.
//!
//! Rooms and boundaries live in two arenas owned by the level and refer to
//! each other by [`RoomId`] / [`BoundaryId`]. Rooms are stored row-major,
//! so the room at `(x, y)` has index `y * size + x`.
//!
//! Generation:
//! 1. Allocate rooms with their coordinates
//! 2. Put a one-sided wall on every outward-facing slot of the edge rooms
//! 3. For each pair of horizontally adjacent rooms, draw one boundary and
//!    wire it as `right` of the left room and `left` of the right room
//! 4. Same for vertically adjacent rooms (`down` / `up`)
//! 5. Place the characters according to the [`StartPolicy`]

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::boundary::{Boundary, BoundaryKind, BoundaryPosition, Passage};
use crate::config::{LevelConfig, StartPolicy};
use crate::error::LevelError;
use crate::generator::BoundaryGenerator;
use crate::point::{Direction, Point};
use crate::room::{BoundaryId, Room, RoomId};

/// Stable handle of a character inside a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(usize);

impl CharacterId {
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

/// A named walker. The level decides which room it is in.
#[derive(Debug, Clone)]
pub struct Character {
    name: String,
    room: Option<RoomId>,
}

impl Character {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }
}

/// Boundary counts of a level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub internal_walls: usize,
    pub internal_doors: usize,
    pub internal_portals: usize,
    /// One-sided walls on the outer edge.
    pub external_walls: usize,
}

impl LevelStats {
    pub fn internal_total(&self) -> usize {
        self.internal_walls + self.internal_doors + self.internal_portals
    }

    pub fn wall_percent(&self) -> f32 {
        let total = self.internal_total();
        if total == 0 {
            0.0
        } else {
            self.internal_walls as f32 * 100.0 / total as f32
        }
    }
}

#[derive(Debug, Clone)]
pub struct Level {
    size: usize,
    rooms: Vec<Room>,
    boundaries: Vec<Boundary>,
    characters: Vec<Character>,
}

impl Level {
    /// Generate a level and place one character per name.
    pub fn build(
        config: &LevelConfig,
        names: &[&str],
        rng: &mut impl Rng,
    ) -> Result<Self, LevelError> {
        let mut level = Self::generate(config, rng)?;

        for name in names {
            let character = level.add_character(name)?;
            match config.start_policy {
                StartPolicy::Corner => level.place(character, Point::new(0, 0))?,
                StartPolicy::Random => level.place_randomly(character, rng)?,
            };
        }

        let stats = level.stats();
        info!(
            "Built {}x{} level: {} walls, {} doors, {} portals inside ({:.1}% walls), {} characters",
            level.size,
            level.size,
            stats.internal_walls,
            stats.internal_doors,
            stats.internal_portals,
            stats.wall_percent(),
            level.characters.len()
        );

        Ok(level)
    }

    /// Generate rooms and boundaries without any characters.
    pub fn generate(config: &LevelConfig, rng: &mut impl Rng) -> Result<Self, LevelError> {
        config.validate()?;

        let mut level = Self::arrange_rooms(config.size);
        level.arrange_external_boundaries();

        // A single room has nothing to connect
        if config.size > 1 {
            let mut generator = BoundaryGenerator::from_config(config)?;
            level.arrange_vertical_boundaries(&mut generator, rng);
            level.arrange_horizontal_boundaries(&mut generator, rng);
        }

        Ok(level)
    }

    fn arrange_rooms(size: usize) -> Self {
        let rooms = (0..size)
            .flat_map(|y| (0..size).map(move |x| Point::new(x, y)))
            .enumerate()
            .map(|(index, point)| Room::new(RoomId::from_index(index), point))
            .collect();

        Self {
            size,
            rooms,
            boundaries: Vec::new(),
            characters: Vec::new(),
        }
    }

    fn push_boundary(&mut self, boundary: Boundary) -> BoundaryId {
        self.boundaries.push(boundary);
        BoundaryId::from_index(self.boundaries.len() - 1)
    }

    fn arrange_external_boundaries(&mut self) {
        let last = self.size - 1;
        for index in 0..self.rooms.len() {
            let location = self.rooms[index].location();
            let room = self.rooms[index].id();

            let outward = [
                (location.y == 0, Direction::Up, BoundaryPosition::Horizontal),
                (location.x == last, Direction::Right, BoundaryPosition::Vertical),
                (location.y == last, Direction::Down, BoundaryPosition::Horizontal),
                (location.x == 0, Direction::Left, BoundaryPosition::Vertical),
            ];
            for (on_edge, direction, position) in outward {
                if on_edge {
                    let id = self.push_boundary(Boundary::outer_wall(position, room));
                    self.rooms[index].set_boundary(direction, id);
                }
            }
        }
    }

    /// Vertical boundaries between horizontally adjacent rooms.
    fn arrange_vertical_boundaries(&mut self, generator: &mut BoundaryGenerator, rng: &mut impl Rng) {
        for y in 0..self.size {
            for x in 0..self.size - 1 {
                let left = self.index_of(Point::new(x, y));
                let right = self.index_of(Point::new(x + 1, y));
                let boundary = generator.get_boundary(
                    BoundaryPosition::Vertical,
                    RoomId::from_index(left),
                    RoomId::from_index(right),
                    rng,
                );
                let id = self.push_boundary(boundary);
                self.rooms[left].set_boundary(Direction::Right, id);
                self.rooms[right].set_boundary(Direction::Left, id);
            }
        }
    }

    /// Horizontal boundaries between vertically adjacent rooms.
    fn arrange_horizontal_boundaries(
        &mut self,
        generator: &mut BoundaryGenerator,
        rng: &mut impl Rng,
    ) {
        for y in 0..self.size - 1 {
            for x in 0..self.size {
                let upper = self.index_of(Point::new(x, y));
                let lower = self.index_of(Point::new(x, y + 1));
                let boundary = generator.get_boundary(
                    BoundaryPosition::Horizontal,
                    RoomId::from_index(upper),
                    RoomId::from_index(lower),
                    rng,
                );
                let id = self.push_boundary(boundary);
                self.rooms[upper].set_boundary(Direction::Down, id);
                self.rooms[lower].set_boundary(Direction::Up, id);
            }
        }
    }

    fn index_of(&self, point: Point) -> usize {
        point.y * self.size + point.x
    }

    // ── Grid queries ────────────────────────────────────────────────────

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Rooms row by row, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Room]> {
        self.rooms.chunks(self.size)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.index())
    }

    pub fn room_id_at(&self, point: Point) -> Option<RoomId> {
        if point.x < self.size && point.y < self.size {
            Some(RoomId::from_index(self.index_of(point)))
        } else {
            None
        }
    }

    pub fn room_at(&self, point: Point) -> Option<&Room> {
        self.room_id_at(point).and_then(|id| self.room(id))
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn boundary(&self, id: BoundaryId) -> Option<&Boundary> {
        self.boundaries.get(id.index())
    }

    /// The boundary in `room`'s `direction` slot.
    pub fn boundary_towards(&self, room: RoomId, direction: Direction) -> Option<&Boundary> {
        self.room(room)
            .and_then(|r| r.boundary(direction))
            .and_then(|id| self.boundary(id))
    }

    pub fn stats(&self) -> LevelStats {
        let mut stats = LevelStats::default();
        for boundary in &self.boundaries {
            match (boundary.is_one_sided(), boundary.kind()) {
                (true, _) => stats.external_walls += 1,
                (false, BoundaryKind::Wall) => stats.internal_walls += 1,
                (false, BoundaryKind::Door) => stats.internal_doors += 1,
                (false, BoundaryKind::Portal) => stats.internal_portals += 1,
            }
        }
        stats
    }

    // ── Characters ──────────────────────────────────────────────────────

    /// Register a character without placing it.
    pub fn add_character(&mut self, name: &str) -> Result<CharacterId, LevelError> {
        if name.trim().is_empty() {
            return Err(LevelError::EmptyCharacterName);
        }
        if self.character_id(name).is_some() {
            return Err(LevelError::DuplicateCharacter(name.to_string()));
        }
        self.characters.push(Character {
            name: name.to_string(),
            room: None,
        });
        Ok(CharacterId::from_index(self.characters.len() - 1))
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id.index())
    }

    pub fn character_id(&self, name: &str) -> Option<CharacterId> {
        self.characters
            .iter()
            .position(|c| c.name == name)
            .map(CharacterId::from_index)
    }

    pub fn characters(&self) -> impl Iterator<Item = (CharacterId, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .map(|(index, c)| (CharacterId::from_index(index), c))
    }

    /// Put `character` into the room at `point`, wherever it was before.
    pub fn place(&mut self, character: CharacterId, point: Point) -> Result<RoomId, LevelError> {
        let room = self.room_id_at(point).ok_or(LevelError::OutOfBounds {
            point,
            size: self.size,
        })?;
        self.relocate(character, room)?;
        Ok(room)
    }

    /// Put `character` into a uniformly random room. Sharing is allowed.
    pub fn place_randomly(
        &mut self,
        character: CharacterId,
        rng: &mut impl Rng,
    ) -> Result<RoomId, LevelError> {
        let point = Point::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size));
        self.place(character, point)
    }

    fn relocate(&mut self, character: CharacterId, to: RoomId) -> Result<(), LevelError> {
        let from = self
            .character(character)
            .ok_or(LevelError::UnknownCharacter(character))?
            .room;
        if let Some(from) = from {
            self.leave(character, from);
        }
        self.characters[character.index()].room = Some(to);
        Ok(())
    }

    /// Drop `character`'s pending attempt in `from`, abandoning any charge.
    fn leave(&mut self, character: CharacterId, from: RoomId) {
        let Some(room) = self.rooms.get_mut(from.index()) else {
            return;
        };
        if let Some(previous) = room.forget(character) {
            if let Some(boundary) = self.boundaries.get_mut(previous.index()) {
                boundary.character_is_gone(character);
            }
        }
    }

    pub fn room_of(&self, character: CharacterId) -> Option<RoomId> {
        self.character(character).and_then(|c| c.room)
    }

    pub fn point_of(&self, character: CharacterId) -> Option<Point> {
        self.room_of(character)
            .and_then(|id| self.room(id))
            .map(|r| r.location())
    }

    /// First character standing in `room`, if any.
    pub fn character_at(&self, room: RoomId) -> Option<CharacterId> {
        self.characters_at(room).next()
    }

    pub fn characters_at(&self, room: RoomId) -> impl Iterator<Item = CharacterId> + '_ {
        self.characters()
            .filter(move |(_, c)| c.room == Some(room))
            .map(|(id, _)| id)
    }

    // ── Movement ────────────────────────────────────────────────────────

    /// Ask `character`'s room to release it in `direction`.
    pub fn try_go(
        &mut self,
        character: CharacterId,
        direction: Direction,
    ) -> Result<Passage, LevelError> {
        let from = self
            .character(character)
            .ok_or(LevelError::UnknownCharacter(character))?
            .room
            .ok_or(LevelError::UnplacedCharacter(character))?;

        let passage =
            self.rooms[from.index()].release_towards(direction, character, &mut self.boundaries);

        if let Passage::Crossed { to } = passage {
            self.leave(character, from);
            self.characters[character.index()].room = Some(to);
        }

        debug!(
            "{} went {direction} from {}: {:?}",
            self.characters[character.index()].name,
            self.rooms[from.index()].location(),
            passage
        );
        Ok(passage)
    }

    pub fn try_go_up(&mut self, character: CharacterId) -> Result<Passage, LevelError> {
        self.try_go(character, Direction::Up)
    }

    pub fn try_go_right(&mut self, character: CharacterId) -> Result<Passage, LevelError> {
        self.try_go(character, Direction::Right)
    }

    pub fn try_go_down(&mut self, character: CharacterId) -> Result<Passage, LevelError> {
        self.try_go(character, Direction::Down)
    }

    pub fn try_go_left(&mut self, character: CharacterId) -> Result<Passage, LevelError> {
        self.try_go(character, Direction::Left)
    }

    /// One game round: every charging portal gains a tick.
    pub fn tick(&mut self) {
        for boundary in &mut self.boundaries {
            boundary.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(size: usize) -> LevelConfig {
        LevelConfig {
            size,
            seed: Some(42),
            ..LevelConfig::default()
        }
    }

    fn level(size: usize) -> Level {
        let config = config(size);
        Level::generate(&config, &mut config.rng()).unwrap()
    }

    #[test]
    fn test_rooms_row_major() {
        let level = level(3);
        assert_eq!(level.rooms().len(), 9);
        for (y, row) in level.rows().enumerate() {
            assert_eq!(row.len(), 3);
            for (x, room) in row.iter().enumerate() {
                assert_eq!(room.location(), Point::new(x, y));
                assert_eq!(level.room_id_at(Point::new(x, y)), Some(room.id()));
            }
        }
        assert_eq!(level.room_id_at(Point::new(3, 0)), None);
    }

    #[test]
    fn test_every_room_enclosed() {
        for size in 1..6 {
            let level = level(size);
            assert!(level.rooms().iter().all(Room::is_enclosed), "size {size}");
        }
    }

    #[test]
    fn test_boundary_counts() {
        for size in 1..8 {
            let stats = level(size).stats();
            assert_eq!(
                stats.internal_total(),
                BoundaryGenerator::internal_boundaries_amount(size)
            );
            assert_eq!(
                stats.external_walls,
                BoundaryGenerator::external_boundaries_amount(size)
            );
        }
    }

    #[test]
    fn test_single_room_is_walled_in() {
        let level = level(1);
        let stats = level.stats();
        assert_eq!(stats.external_walls, 4);
        assert_eq!(stats.internal_total(), 0);
    }

    #[test]
    fn test_shared_boundaries_point_back() {
        let level = level(5);
        for room in level.rooms() {
            for (direction, slot) in room.slots() {
                let id = slot.unwrap();
                let boundary = level.boundary(id).unwrap();
                assert!(boundary.touches(room.id()));

                match boundary.other_side(room.id()) {
                    Some(other) => {
                        let neighbour = room.location().step(direction).unwrap();
                        assert_eq!(level.room_id_at(neighbour), Some(other));
                        let back = level.room(other).unwrap().boundary(direction.opposite());
                        assert_eq!(back, Some(id), "neighbour must hold the same boundary");
                    }
                    None => {
                        let outside = room
                            .location()
                            .step(direction)
                            .and_then(|p| level.room_id_at(p));
                        assert_eq!(outside, None, "one-sided boundary inside the grid");
                        assert_eq!(boundary.kind(), BoundaryKind::Wall);
                    }
                }
            }
        }
    }

    #[test]
    fn test_orientation_matches_slot() {
        let level = level(4);
        for room in level.rooms() {
            for (direction, slot) in room.slots() {
                let position = level.boundary(slot.unwrap()).unwrap().position();
                let expected = match direction {
                    Direction::Up | Direction::Down => BoundaryPosition::Horizontal,
                    Direction::Left | Direction::Right => BoundaryPosition::Vertical,
                };
                assert_eq!(position, expected);
            }
        }
    }

    #[test]
    fn test_corner_policy_places_everyone_at_origin() {
        let config = LevelConfig {
            start_policy: StartPolicy::Corner,
            ..config(4)
        };
        let level = Level::build(&config, &["a", "b"], &mut config.rng()).unwrap();
        let origin = level.room_id_at(Point::new(0, 0)).unwrap();
        assert_eq!(level.characters_at(origin).count(), 2);
    }

    #[test]
    fn test_random_policy_places_everyone() {
        let config = config(6);
        let level = Level::build(&config, &["a", "b", "c"], &mut config.rng()).unwrap();
        for (id, _) in level.characters() {
            let room = level.room_of(id).unwrap();
            assert!(level.characters_at(room).any(|c| c == id));
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let config = config(3);
        let err = Level::build(&config, &["a", "a"], &mut config.rng()).unwrap_err();
        assert_eq!(err, LevelError::DuplicateCharacter("a".into()));
    }

    #[test]
    fn test_blank_names_rejected() {
        let mut level = level(2);
        assert_eq!(level.add_character(""), Err(LevelError::EmptyCharacterName));
        assert_eq!(level.add_character("  "), Err(LevelError::EmptyCharacterName));
        assert_eq!(level.characters().count(), 0);

        let config = config(2);
        let err = Level::build(&config, &["hero", ""], &mut config.rng()).unwrap_err();
        assert_eq!(err, LevelError::EmptyCharacterName);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LevelConfig {
            size: 0,
            ..LevelConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Level::build(&config, &[], &mut rng).unwrap_err(),
            LevelError::EmptyGrid
        );
    }

    #[test]
    fn test_place_out_of_bounds() {
        let mut level = level(3);
        let hero = level.add_character("hero").unwrap();
        let err = level.place(hero, Point::new(3, 1)).unwrap_err();
        assert_eq!(
            err,
            LevelError::OutOfBounds {
                point: Point::new(3, 1),
                size: 3
            }
        );
        assert_eq!(level.room_of(hero), None);
    }

    #[test]
    fn test_move_errors() {
        let mut level = level(3);
        let ghost = CharacterId::from_index(7);
        assert_eq!(
            level.try_go_up(ghost),
            Err(LevelError::UnknownCharacter(ghost))
        );
        let hero = level.add_character("hero").unwrap();
        assert_eq!(
            level.try_go_up(hero),
            Err(LevelError::UnplacedCharacter(hero))
        );
    }

    #[test]
    fn test_outer_walls_hold() {
        let mut level = level(3);
        let hero = level.add_character("hero").unwrap();
        let origin = level.place(hero, Point::new(0, 0)).unwrap();
        assert_eq!(level.try_go_up(hero), Ok(Passage::Blocked));
        assert_eq!(level.try_go_left(hero), Ok(Passage::Blocked));
        assert_eq!(level.room_of(hero), Some(origin));
    }

    #[test]
    fn test_crossing_moves_character() {
        // Find a door in a seeded level and walk through it both ways
        let mut level = level(5);
        let (room, direction) = level
            .rooms()
            .iter()
            .flat_map(|r| Direction::ALL.map(|d| (r.id(), d)))
            .find(|&(r, d)| {
                level
                    .boundary_towards(r, d)
                    .map_or(false, |b| b.kind() == BoundaryKind::Door)
            })
            .expect("seeded 5x5 level has a door");
        let start = level.room(room).unwrap().location();
        let target = start.step(direction).unwrap();

        let hero = level.add_character("hero").unwrap();
        level.place(hero, start).unwrap();
        assert!(level.try_go(hero, direction).unwrap().crossed());
        assert_eq!(level.point_of(hero), Some(target));
        assert!(level.try_go(hero, direction.opposite()).unwrap().crossed());
        assert_eq!(level.point_of(hero), Some(start));
    }

    #[test]
    fn test_teleport_abandons_portal_charge() {
        let config = LevelConfig {
            portal_duration: 3,
            ..config(5)
        };
        let mut level = Level::generate(&config, &mut config.rng()).unwrap();
        let (room, direction, portal) = level
            .rooms()
            .iter()
            .flat_map(|r| Direction::ALL.map(|d| (r, d)))
            .find_map(|(r, d)| {
                let id = r.boundary(d)?;
                (level.boundary(id)?.kind() == BoundaryKind::Portal).then_some((r.id(), d, id))
            })
            .expect("seeded 5x5 level has a portal");
        let start = level.room(room).unwrap().location();

        let hero = level.add_character("hero").unwrap();
        level.place(hero, start).unwrap();
        level.try_go(hero, direction).unwrap();
        assert_eq!(
            level.boundary(portal).unwrap().portal().unwrap().pending(),
            Some(hero)
        );

        level.place(hero, Point::new(0, 0)).unwrap();
        assert_eq!(
            level.boundary(portal).unwrap().portal().unwrap().pending(),
            None
        );
    }
}
