// src/models/level.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three difficulty tiers gating which questions are served.
///
/// Serialized as the plain integer `1`, `2` or `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i64")]
pub enum Level {
    One = 1,
    Two = 2,
    Three = 3,
}

impl Level {
    /// All levels in ascending order.
    pub const ALL: [Level; 3] = [Level::One, Level::Two, Level::Three];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// The level offered after this one; wraps back to 1 after level 3.
    pub fn next_wrapping(self) -> Level {
        match self {
            Level::One => Level::Two,
            Level::Two => Level::Three,
            Level::Three => Level::One,
        }
    }

    /// The level directly below this one, if any.
    pub fn previous(self) -> Option<Level> {
        match self {
            Level::One => None,
            Level::Two => Some(Level::One),
            Level::Three => Some(Level::Two),
        }
    }

    pub fn is_last(self) -> bool {
        self == Level::Three
    }
}

impl TryFrom<i64> for Level {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::One),
            2 => Ok(Level::Two),
            3 => Ok(Level::Three),
            other => Err(format!("Level must be 1, 2, or 3 (got {})", other)),
        }
    }
}

impl TryFrom<i32> for Level {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Level::try_from(i64::from(value))
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        level.as_i32()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_level_wraps_after_three() {
        assert_eq!(Level::One.next_wrapping(), Level::Two);
        assert_eq!(Level::Two.next_wrapping(), Level::Three);
        assert_eq!(Level::Three.next_wrapping(), Level::One);
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(Level::try_from(0i64).is_err());
        assert!(Level::try_from(4i64).is_err());
        assert_eq!(Level::try_from(2i64), Ok(Level::Two));
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Level::Three).unwrap(), "3");
        let level: Level = serde_json::from_str("1").unwrap();
        assert_eq!(level, Level::One);
        assert!(serde_json::from_str::<Level>("7").is_err());
    }
}
