//! Boundaries between rooms: walls, doors and portals.
//!
//! A boundary sits on one side of a room and decides whether a character
//! standing in that room may cross to the room on the other side. Internal
//! boundaries are shared by the two rooms they separate; boundaries on the
//! outer edge of the grid belong to a single room and have no second side.
//!
//! | Kind | Passage |
//! |------|---------|
//! | Wall | Never |
//! | Door | Always, immediately |
//! | Portal | After `duration` consecutive attempts by the same character |
//!
//! # Portal charge
//!
//! ```text
//!            attempt(C)                 attempt(C), elapsed < duration
//!   Idle ──────────────────▶ Charging(C) ◀──────┐
//!    ▲                          │  │  └─────────┘
//!    │   elapsed ≥ duration     │  │ gone(C) / attempt(C') / one-sided
//!    └──── cross + reset ◀──────┘  └────────▶ reset ─▶ Idle (or Charging(C'))
//! ```

use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::level::CharacterId;
use crate::room::RoomId;
use crate::timer::Timer;

/// Orientation of a boundary on screen. Purely cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPosition {
    /// Runs left–right; sits in a room's up or down slot.
    Horizontal,
    /// Runs top–bottom; sits in a room's left or right slot.
    Vertical,
}

/// Which variant a boundary is, without its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    Wall,
    Door,
    Portal,
}

/// Outcome of a single passage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Passage {
    /// The character stays where it is.
    Blocked,
    /// A portal is charging for this character.
    Charging { elapsed: u32, required: u32 },
    /// The character crossed into `to`.
    Crossed { to: RoomId },
}

impl Passage {
    pub fn crossed(&self) -> bool {
        matches!(self, Passage::Crossed { .. })
    }
}

/// Charge state of a portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalState {
    Idle,
    Charging { character: CharacterId },
}

/// Result of feeding one attempt into a portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charge {
    Pending { elapsed: u32, required: u32 },
    Ready,
}

/// A time-gated boundary. Each portal owns its own timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    timer: Timer,
    state: PortalState,
}

impl Portal {
    pub fn new(duration: u32) -> Self {
        Self {
            timer: Timer::new(duration),
            state: PortalState::Idle,
        }
    }

    pub fn state(&self) -> PortalState {
        self.state
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// The character currently charging this portal, if any.
    pub fn pending(&self) -> Option<CharacterId> {
        match self.state {
            PortalState::Idle => None,
            PortalState::Charging { character } => Some(character),
        }
    }

    fn charge(&mut self, character: CharacterId) -> Charge {
        match self.state {
            PortalState::Charging { character: pending } if pending == character => {}
            PortalState::Charging { character: pending } => {
                debug!("portal charge of {pending} abandoned: {character} stepped in");
                self.begin(character);
            }
            PortalState::Idle => self.begin(character),
        }

        self.timer.update();
        if self.timer.is_times_up() {
            Charge::Ready
        } else {
            Charge::Pending {
                elapsed: self.timer.current_time(),
                required: self.timer.end_time(),
            }
        }
    }

    fn begin(&mut self, character: CharacterId) {
        self.state = PortalState::Charging { character };
        self.timer.start();
    }

    /// Consume the finished charge. Returns the passenger that earned it.
    fn complete(&mut self) -> Option<CharacterId> {
        let pending = self.pending();
        self.reset();
        pending
    }

    /// Drop `character`'s charge. A charge held by someone else is kept.
    fn abandon(&mut self, character: CharacterId) -> bool {
        if self.pending() == Some(character) {
            self.reset();
            true
        } else {
            false
        }
    }

    fn tick(&mut self) {
        if self.pending().is_some() {
            self.timer.update();
        }
    }

    fn reset(&mut self) {
        self.state = PortalState::Idle;
        self.timer.reset();
    }
}

/// Behaviour attached to a boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryVariant {
    Wall,
    Door,
    Portal(Portal),
}

impl BoundaryVariant {
    pub fn kind(&self) -> BoundaryKind {
        match self {
            BoundaryVariant::Wall => BoundaryKind::Wall,
            BoundaryVariant::Door => BoundaryKind::Door,
            BoundaryVariant::Portal(_) => BoundaryKind::Portal,
        }
    }
}

/// An edge between two rooms, or the outer edge of a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    position: BoundaryPosition,
    room_1: RoomId,
    room_2: Option<RoomId>,
    variant: BoundaryVariant,
}

impl Boundary {
    pub fn new(
        variant: BoundaryVariant,
        position: BoundaryPosition,
        room_1: RoomId,
        room_2: Option<RoomId>,
    ) -> Self {
        Self {
            position,
            room_1,
            room_2,
            variant,
        }
    }

    /// A wall on the outer edge of `room`.
    pub fn outer_wall(position: BoundaryPosition, room: RoomId) -> Self {
        Self::new(BoundaryVariant::Wall, position, room, None)
    }

    pub fn position(&self) -> BoundaryPosition {
        self.position
    }

    pub fn room_1(&self) -> RoomId {
        self.room_1
    }

    pub fn room_2(&self) -> Option<RoomId> {
        self.room_2
    }

    pub fn is_one_sided(&self) -> bool {
        self.room_2.is_none()
    }

    pub fn kind(&self) -> BoundaryKind {
        self.variant.kind()
    }

    pub fn variant(&self) -> &BoundaryVariant {
        &self.variant
    }

    pub fn portal(&self) -> Option<&Portal> {
        match &self.variant {
            BoundaryVariant::Portal(portal) => Some(portal),
            _ => None,
        }
    }

    /// Does this boundary separate (or bound) `room`?
    pub fn touches(&self, room: RoomId) -> bool {
        self.room_1 == room || self.room_2 == Some(room)
    }

    /// The room across from `current`, if this boundary has one.
    pub fn other_side(&self, current: RoomId) -> Option<RoomId> {
        if current == self.room_1 {
            self.room_2
        } else if self.room_2 == Some(current) {
            Some(self.room_1)
        } else {
            None
        }
    }

    /// Glyph used by text renderers, three cells wide for horizontal
    /// boundaries and one cell wide for vertical ones.
    pub fn glyph(&self) -> &'static str {
        match (self.position, self.kind()) {
            (BoundaryPosition::Horizontal, BoundaryKind::Wall) => "═══",
            (BoundaryPosition::Horizontal, BoundaryKind::Portal) => " - ",
            (BoundaryPosition::Horizontal, BoundaryKind::Door) => "   ",
            (BoundaryPosition::Vertical, BoundaryKind::Wall) => "║",
            (BoundaryPosition::Vertical, BoundaryKind::Portal) => "⁞",
            (BoundaryPosition::Vertical, BoundaryKind::Door) => " ",
        }
    }

    /// Try to move `character` from `current` across this boundary.
    ///
    /// The boundary does not touch the character; the caller applies
    /// [`Passage::Crossed`] by updating the character's room.
    pub fn attempt_passage(&mut self, character: CharacterId, current: RoomId) -> Passage {
        let destination = self.other_side(current);

        match &mut self.variant {
            BoundaryVariant::Wall => Passage::Blocked,
            BoundaryVariant::Door => match destination {
                Some(to) => Passage::Crossed { to },
                None => {
                    debug!("door at {:?} has no room beyond {current}", self.room_1);
                    Passage::Blocked
                }
            },
            BoundaryVariant::Portal(portal) => {
                let Some(to) = destination else {
                    portal.abandon(character);
                    debug!("portal at {:?} has no room beyond {current}", self.room_1);
                    return Passage::Blocked;
                };
                match portal.charge(character) {
                    Charge::Pending { elapsed, required } => {
                        Passage::Charging { elapsed, required }
                    }
                    Charge::Ready => match portal.complete() {
                        Some(passenger) => {
                            debug_assert_eq!(passenger, character);
                            Passage::Crossed { to }
                        }
                        None => {
                            error!("portal charge completed with no pending passenger; refusing passage");
                            Passage::Blocked
                        }
                    },
                }
            }
        }
    }

    /// `character` went somewhere else instead of re-attempting this boundary.
    pub fn character_is_gone(&mut self, character: CharacterId) {
        if let BoundaryVariant::Portal(portal) = &mut self.variant {
            if portal.abandon(character) {
                debug!("portal charge of {character} abandoned");
            }
        }
    }

    /// One game round elapsed. Only charging portals react.
    pub fn tick(&mut self) {
        if let BoundaryVariant::Portal(portal) = &mut self.variant {
            portal.tick();
        }
    }
}
