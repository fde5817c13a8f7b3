//! Plain-text dump of a level, one room per 5×3 character block.
//!
//! ```text
//! ┌═══┐ ┌═══┐
//! ║ h   ⁞ p ║
//! └ - ┘ └═══┘
//! ```

use log::error;
use portalmaze_logic::level::Level;
use portalmaze_logic::point::Direction;
use portalmaze_logic::room::Room;

pub fn render(level: &Level) -> String {
    let mut out = String::new();
    for row in level.rows() {
        let top: Vec<&str> = row.iter().map(|r| glyph(level, r, Direction::Up)).collect();
        let middle: Vec<String> = row
            .iter()
            .map(|r| {
                format!(
                    "{} {} {}",
                    glyph(level, r, Direction::Left),
                    marker(level, r),
                    glyph(level, r, Direction::Right)
                )
            })
            .collect();
        let bottom: Vec<&str> = row.iter().map(|r| glyph(level, r, Direction::Down)).collect();

        out.push_str(&format!("┌{}┐\n", top.join("┐ ┌")));
        out.push_str(&middle.join(" "));
        out.push('\n');
        out.push_str(&format!("└{}┘\n", bottom.join("┘ └")));
    }
    out
}

fn glyph(level: &Level, room: &Room, direction: Direction) -> &'static str {
    match level.boundary_towards(room.id(), direction) {
        Some(boundary) => boundary.glyph(),
        None => {
            error!(
                "room {} has no {direction} boundary to draw",
                room.location()
            );
            match direction {
                Direction::Up | Direction::Down => "???",
                Direction::Left | Direction::Right => "?",
            }
        }
    }
}

/// First letter of the occupant's name, `*` for a crowd, blank when empty.
fn marker(level: &Level, room: &Room) -> char {
    let mut occupants = level.characters_at(room.id());
    match (occupants.next(), occupants.next()) {
        (None, _) => ' ',
        (Some(_), Some(_)) => '*',
        (Some(id), None) => level
            .character(id)
            .and_then(|c| c.name().chars().next())
            .unwrap_or('?'),
    }
}
