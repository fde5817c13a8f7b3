//! Grid coordinates and movement directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate on the grid. `x` grows to the right, `y` grows down.
///
/// No bounds checking happens here; the [`Level`](crate::level::Level)
/// decides whether a point is on its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The neighbouring point in `direction`, or `None` when it would leave
    /// the non-negative quadrant.
    pub fn step(self, direction: Direction) -> Option<Point> {
        match direction {
            Direction::Up => self.y.checked_sub(1).map(|y| Point::new(self.x, y)),
            Direction::Right => Some(Point::new(self.x + 1, self.y)),
            Direction::Down => Some(Point::new(self.x, self.y + 1)),
            Direction::Left => self.x.checked_sub(1).map(|x| Point::new(x, self.y)),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four directions a character can try to move in. Diagonals are not
/// part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in slot order (up, right, down, left).
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Index of this direction's slot in a room.
    pub(crate) fn slot(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_inside_quadrant() {
        let p = Point::new(2, 3);
        assert_eq!(p.step(Direction::Up), Some(Point::new(2, 2)));
        assert_eq!(p.step(Direction::Right), Some(Point::new(3, 3)));
        assert_eq!(p.step(Direction::Down), Some(Point::new(2, 4)));
        assert_eq!(p.step(Direction::Left), Some(Point::new(1, 3)));
    }

    #[test]
    fn test_step_off_origin() {
        let origin = Point::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
    }

    #[test]
    fn test_opposite_is_involution() {
        for d in Direction::ALL {
            assert_ne!(d, d.opposite());
            assert_eq!(d, d.opposite().opposite());
        }
    }

    #[test]
    fn test_slots_are_distinct() {
        let mut slots: Vec<usize> = Direction::ALL.iter().map(|d| d.slot()).collect();
        slots.sort();
        assert_eq!(slots, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(json, "\"left\"");
    }
}
