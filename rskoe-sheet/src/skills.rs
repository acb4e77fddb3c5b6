//! Skill ledger: cumulative XP per skill, with level and tier always derived.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_COOKING_XP;
use crate::error::{SheetError, clamped_add, non_negative};
use crate::rules::{Tier, level_from_xp, tier_from_level, xp_into_level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillId {
    Melee,
    Ranged,
    Magic,
    Defence,
    Thieving,
    Gathering,
    Crafting,
    Cooking,
    Prayer,
    Summoning,
    Runecrafting,
}

impl SkillId {
    /// Skills in sheet order.
    pub const ALL: [Self; 11] = [
        Self::Melee,
        Self::Ranged,
        Self::Magic,
        Self::Defence,
        Self::Thieving,
        Self::Gathering,
        Self::Crafting,
        Self::Cooking,
        Self::Prayer,
        Self::Summoning,
        Self::Runecrafting,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Ranged => "ranged",
            Self::Magic => "magic",
            Self::Defence => "defence",
            Self::Thieving => "thieving",
            Self::Gathering => "gathering",
            Self::Crafting => "crafting",
            Self::Cooking => "cooking",
            Self::Prayer => "prayer",
            Self::Summoning => "summoning",
            Self::Runecrafting => "runecrafting",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillId {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|skill| skill.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SheetError::InvalidSkillId { id: s.to_string() })
    }
}

/// Cumulative XP for all eleven skills.
///
/// The ledger only ever stores XP. Reading a level goes through
/// [`level_from_xp`], so level and XP cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<SkillId, u32>", into = "BTreeMap<SkillId, u32>")]
pub struct SkillLedger {
    xp: BTreeMap<SkillId, u32>,
}

impl Default for SkillLedger {
    /// New characters start with a point of cooking experience.
    fn default() -> Self {
        Self::zeroed().with_xp(SkillId::Cooking, DEFAULT_COOKING_XP)
    }
}

impl SkillLedger {
    /// Ledger with every skill at zero XP.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            xp: SkillId::ALL.iter().map(|skill| (*skill, 0)).collect(),
        }
    }

    fn with_xp(mut self, skill: SkillId, xp: u32) -> Self {
        self.xp.insert(skill, xp);
        self
    }

    #[must_use]
    pub fn xp(&self, skill: SkillId) -> u32 {
        self.xp.get(&skill).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn level(&self, skill: SkillId) -> u32 {
        level_from_xp(self.xp(skill))
    }

    #[must_use]
    pub fn tier(&self, skill: SkillId) -> Tier {
        tier_from_level(self.level(skill))
    }

    /// Filled XP dots toward the next level.
    #[must_use]
    pub fn progress(&self, skill: SkillId) -> u32 {
        xp_into_level(self.xp(skill))
    }

    /// Skills and their derived levels, in sheet order.
    pub fn levels(&self) -> impl Iterator<Item = (SkillId, u32)> + '_ {
        SkillId::ALL.iter().map(|skill| (*skill, self.level(*skill)))
    }

    /// Adds `delta` XP, clamping at zero instead of failing.
    #[must_use]
    pub fn apply_xp_delta(&self, skill: SkillId, delta: i64) -> Self {
        let next = clamped_add(self.xp(skill), delta);
        self.clone().with_xp(skill, next)
    }

    /// Same as [`Self::apply_xp_delta`] for a skill named by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidSkillId`] when `id` is not one of the eleven skills.
    pub fn apply_named_xp_delta(&self, id: &str, delta: i64) -> Result<Self, SheetError> {
        let skill = id.parse::<SkillId>()?;
        Ok(self.apply_xp_delta(skill, delta))
    }

    /// Sets XP directly.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] when `new_xp` is negative and
    /// [`SheetError::ValueTooLarge`] when it does not fit a `u32`.
    pub fn set_xp(&self, skill: SkillId, new_xp: i64) -> Result<Self, SheetError> {
        let xp = non_negative("xp", new_xp)?;
        Ok(self.clone().with_xp(skill, xp))
    }
}

impl TryFrom<BTreeMap<SkillId, u32>> for SkillLedger {
    type Error = SheetError;

    fn try_from(xp: BTreeMap<SkillId, u32>) -> Result<Self, Self::Error> {
        let missing: Vec<SkillId> = SkillId::ALL
            .iter()
            .copied()
            .filter(|skill| !xp.contains_key(skill))
            .collect();
        if !missing.is_empty() {
            return Err(SheetError::IncompleteSkillLedger { missing });
        }
        Ok(Self { xp })
    }
}

impl From<SkillLedger> for BTreeMap<SkillId, u32> {
    fn from(ledger: SkillLedger) -> Self {
        ledger.xp
    }
}
