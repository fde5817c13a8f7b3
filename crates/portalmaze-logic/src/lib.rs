//! Pure maze model for PortalMaze.
//!
//! This crate contains the room/boundary graph and nothing else: no input
//! loop, no rendering, no win/lose rules. Functions take plain data and an
//! explicit random generator, which keeps every generation path
//! reproducible under test.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`boundary`] | Wall / Door / Portal edges and the portal charge state machine |
//! | [`config`] | Level configuration (size, wall cap, portal duration, start policy) |
//! | [`error`] | `LevelError` for construction and lookup failures |
//! | [`generator`] | Random internal boundaries under a wall-density cap |
//! | [`level`] | Room arena, boundary wiring, character placement and movement |
//! | [`point`] | Grid coordinates and the four movement directions |
//! | [`room`] | Grid cell with four boundary slots |
//! | [`timer`] | Tick counter used by portals |
//!
//! ```
//! use portalmaze_logic::config::{LevelConfig, StartPolicy};
//! use portalmaze_logic::level::Level;
//! use portalmaze_logic::point::Point;
//!
//! let config = LevelConfig {
//!     size: 4,
//!     start_policy: StartPolicy::Corner,
//!     seed: Some(7),
//!     ..LevelConfig::default()
//! };
//! let mut rng = config.rng();
//! let level = Level::build(&config, &["hero"], &mut rng).unwrap();
//! let hero = level.character_id("hero").unwrap();
//! assert_eq!(level.point_of(hero), Some(Point::new(0, 0)));
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod generator;
pub mod level;
pub mod point;
pub mod room;
pub mod timer;

pub use boundary::{Boundary, BoundaryKind, BoundaryPosition, Passage};
pub use config::{LevelConfig, StartPolicy};
pub use error::LevelError;
pub use level::{CharacterId, Level, LevelStats};
pub use point::{Direction, Point};
pub use room::{BoundaryId, Room, RoomId};
