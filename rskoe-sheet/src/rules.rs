//! Derivation rules shared by every engine: level from XP, tier from level.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{TIER_THREE_LEVEL, TIER_TWO_LEVEL, XP_PER_LEVEL};

/// Coarse skill grouping gating how many tokens may be placed per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(format!("tier must be 1, 2 or 3 (got {other})")),
        }
    }
}

/// Level reached with `xp` cumulative experience.
#[must_use]
pub const fn level_from_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL
}

/// Tier for a derived level.
#[must_use]
pub const fn tier_from_level(level: u32) -> Tier {
    if level >= TIER_THREE_LEVEL {
        Tier::Three
    } else if level >= TIER_TWO_LEVEL {
        Tier::Two
    } else {
        Tier::One
    }
}

/// Experience already banked toward the next level, i.e. the filled XP dots.
#[must_use]
pub const fn xp_into_level(xp: u32) -> u32 {
    xp % XP_PER_LEVEL
}
