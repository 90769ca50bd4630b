use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction in which all tiles are pushed by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    #[display("up")]
    Up,
    #[display("down")]
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown direction: {token:?}")]
pub struct ParseDirectionError {
    token: String,
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dir| s.eq_ignore_ascii_case(dir.name()))
            .ok_or_else(|| ParseDirectionError {
                token: s.to_owned(),
            })
    }
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Minimum travel, in pixels, for a touch swipe to count as a move.
    pub const TOUCH_SWIPE_THRESHOLD: f64 = 20.0;
    /// Minimum travel, in pixels, for a pointer drag to count as a move.
    pub const POINTER_DRAG_THRESHOLD: f64 = 10.0;

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Returns `true` for up and down, whose lines are grid columns.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Returns `true` when lines must be reversed to be treated as a leftward move.
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::Right | Self::Down)
    }

    /// Maps a keyboard key name (`ArrowLeft`, ...) to a direction.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            _ => None,
        }
    }

    /// Classifies a swipe or drag by its dominant axis.
    ///
    /// `dx` grows to the right and `dy` grows downwards, as in screen
    /// coordinates. Gestures whose longer axis is shorter than `threshold`
    /// are ignored. Exact diagonals count as vertical.
    ///
    /// ```
    /// use twenty48_engine::Direction;
    ///
    /// assert_eq!(Direction::from_swipe(-40.0, 5.0, 20.0), Some(Direction::Left));
    /// assert_eq!(Direction::from_swipe(3.0, 4.0, 20.0), None);
    /// ```
    #[must_use]
    pub fn from_swipe(dx: f64, dy: f64, threshold: f64) -> Option<Self> {
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        let (abs_x, abs_y) = (dx.abs(), dy.abs());
        if abs_x.max(abs_y) < threshold {
            return None;
        }
        let dir = if abs_x > abs_y {
            if dx > 0.0 { Self::Right } else { Self::Left }
        } else if dy > 0.0 {
            Self::Down
        } else {
            Self::Up
        };
        Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("left".parse(), Ok(Direction::Left));
        assert_eq!("RIGHT".parse(), Ok(Direction::Right));
        assert_eq!("Up".parse(), Ok(Direction::Up));
        assert_eq!("down".parse(), Ok(Direction::Down));
    }

    #[test]
    fn test_parse_rejects_unknown_token() {
        let err = "sideways".parse::<Direction>().unwrap_err();
        assert!(err.to_string().contains("sideways"));
    }

    #[test]
    fn test_display_matches_token() {
        for dir in Direction::ALL {
            assert_eq!(dir.to_string().parse(), Ok(dir));
        }
    }

    #[test]
    fn test_serde_uses_lowercase_tokens() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        let dir: Direction = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(dir, Direction::Down);
    }

    #[test]
    fn test_from_key() {
        assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("z"), None);
    }

    #[test]
    fn test_from_swipe() {
        let t = Direction::TOUCH_SWIPE_THRESHOLD;
        assert_eq!(Direction::from_swipe(30.0, 10.0, t), Some(Direction::Right));
        assert_eq!(Direction::from_swipe(-30.0, 10.0, t), Some(Direction::Left));
        assert_eq!(Direction::from_swipe(5.0, 25.0, t), Some(Direction::Down));
        assert_eq!(Direction::from_swipe(5.0, -25.0, t), Some(Direction::Up));
        assert_eq!(Direction::from_swipe(19.0, -19.0, t), None);
        assert_eq!(Direction::from_swipe(f64::NAN, 0.0, t), None);

        let t = Direction::POINTER_DRAG_THRESHOLD;
        assert_eq!(Direction::from_swipe(12.0, 0.0, t), Some(Direction::Right));
    }
}
