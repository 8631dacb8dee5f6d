//! Room names such as `W13N45` and their signed world coordinates.
//!
//! East and south map to non-negative axes; west and north to negative
//! ones, so `E0S0` is `(0, 0)` and `W0N0` is `(-1, -1)`.

use regex::Regex;
use std::sync::OnceLock;

static ROOM_NAME: OnceLock<Option<Regex>> = OnceLock::new();

fn room_name_regex() -> Option<&'static Regex> {
    ROOM_NAME.get_or_init(|| Regex::new(r"^([EW])(\d+)([NS])(\d+)").ok()).as_ref()
}

/// World coordinates of `name`, or `None` if it is not a room name.
pub fn parse(name: &str) -> Option<(i64, i64)> {
    let captures = room_name_regex()?.captures(name.trim())?;
    let horizontal = captures.get(2)?.as_str().parse::<i64>().ok()?;
    let vertical = captures.get(4)?.as_str().parse::<i64>().ok()?;

    let x = match captures.get(1)?.as_str() {
        "E" => horizontal,
        _ => -horizontal - 1,
    };
    let y = match captures.get(3)?.as_str() {
        "S" => vertical,
        _ => -vertical - 1,
    };
    Some((x, y))
}

/// Room name at world coordinates `(x, y)`. Total over `i64`.
pub fn format(x: i64, y: i64) -> String {
    let (horizontal_dir, horizontal) = if x >= 0 { ('E', x) } else { ('W', -(x + 1)) };
    let (vertical_dir, vertical) = if y >= 0 { ('S', y) } else { ('N', -(y + 1)) };
    format!("{}{}{}{}", horizontal_dir, horizontal, vertical_dir, vertical)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    West,
    East,
    North,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::West, Direction::East, Direction::North, Direction::South];

    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Direction::West => "←",
            Direction::East => "→",
            Direction::North => "↑",
            Direction::South => "↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacentRoom {
    pub direction: Direction,
    pub name: String,
}

/// The four rooms bordering `name`, west, east, north, south.
///
/// `None` for non-room names and for rooms on the edge of the `i64` grid.
pub fn adjacent(name: &str) -> Option<Vec<AdjacentRoom>> {
    let (x, y) = parse(name)?;
    Direction::ALL
        .iter()
        .map(|direction| {
            let (dx, dy) = direction.offset();
            let name = format(x.checked_add(dx)?, y.checked_add(dy)?);
            Some(AdjacentRoom { direction: *direction, name })
        })
        .collect()
}
