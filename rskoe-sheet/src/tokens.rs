//! Token unlock engine: prayer slots, summoning familiars and rune tokens.
//!
//! Prayer slots are tri-state and unlock per slot against the prayer level.
//! Summoning tokens are a count capped by the summoning level, auto-granted on
//! level up. Rune tokens are a count with a fixed soft cap; the runecrafting
//! tier only limits how many may be placed per action at the table.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{PRAYER_SLOT_THRESHOLDS, RUNE_TOKEN_CAP, SUMMONING_CAP_THRESHOLDS};
use crate::error::{SheetError, clamped_add};
use crate::rules::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrayerSlotStatus {
    #[default]
    Unavailable,
    Inactive,
    Active,
}

impl PrayerSlotStatus {
    #[must_use]
    pub const fn is_unlocked(self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerSlot {
    Slot1,
    Slot2,
    Slot3,
}

impl PrayerSlot {
    pub const ALL: [Self; 3] = [Self::Slot1, Self::Slot2, Self::Slot3];

    const fn index(self) -> usize {
        match self {
            Self::Slot1 => 0,
            Self::Slot2 => 1,
            Self::Slot3 => 2,
        }
    }

    /// Prayer level needed to unlock this slot.
    #[must_use]
    pub const fn threshold(self) -> u32 {
        PRAYER_SLOT_THRESHOLDS[self.index()]
    }
}

impl fmt::Display for PrayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.index() + 1)
    }
}

/// Status of the three prayer token slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrayerSlots {
    pub slot1: PrayerSlotStatus,
    pub slot2: PrayerSlotStatus,
    pub slot3: PrayerSlotStatus,
}

impl PrayerSlots {
    #[must_use]
    pub const fn status(&self, slot: PrayerSlot) -> PrayerSlotStatus {
        match slot {
            PrayerSlot::Slot1 => self.slot1,
            PrayerSlot::Slot2 => self.slot2,
            PrayerSlot::Slot3 => self.slot3,
        }
    }

    const fn with_status(mut self, slot: PrayerSlot, status: PrayerSlotStatus) -> Self {
        match slot {
            PrayerSlot::Slot1 => self.slot1 = status,
            PrayerSlot::Slot2 => self.slot2 = status,
            PrayerSlot::Slot3 => self.slot3 = status,
        }
        self
    }

    /// Re-evaluates every slot against `prayer_level`.
    ///
    /// Newly reached slots open as `inactive`. Slots whose threshold is no
    /// longer met fall back to `unavailable` and lose any active choice.
    #[must_use]
    pub fn recompute(self, prayer_level: u32) -> Self {
        PrayerSlot::ALL.iter().fold(self, |slots, slot| {
            let status = recompute_slot(slots.status(*slot), slot.threshold(), prayer_level);
            slots.with_status(*slot, status)
        })
    }

    /// Flips an unlocked slot between `inactive` and `active`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::SlotLocked`] when the slot is `unavailable`.
    pub fn toggle(self, slot: PrayerSlot) -> Result<Self, SheetError> {
        let status = toggle_prayer_slot(slot, self.status(slot))?;
        Ok(self.with_status(slot, status))
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        PrayerSlot::ALL
            .iter()
            .filter(|slot| self.status(**slot) == PrayerSlotStatus::Active)
            .count()
    }
}

const fn recompute_slot(status: PrayerSlotStatus, threshold: u32, level: u32) -> PrayerSlotStatus {
    match status {
        PrayerSlotStatus::Unavailable if level >= threshold => PrayerSlotStatus::Inactive,
        PrayerSlotStatus::Inactive | PrayerSlotStatus::Active if level < threshold => {
            PrayerSlotStatus::Unavailable
        }
        unchanged => unchanged,
    }
}

/// Player toggle for a single slot status.
///
/// # Errors
///
/// Returns [`SheetError::SlotLocked`] when `status` is `unavailable`.
pub fn toggle_prayer_slot(
    slot: PrayerSlot,
    status: PrayerSlotStatus,
) -> Result<PrayerSlotStatus, SheetError> {
    match status {
        PrayerSlotStatus::Unavailable => Err(SheetError::SlotLocked { slot }),
        PrayerSlotStatus::Inactive => Ok(PrayerSlotStatus::Active),
        PrayerSlotStatus::Active => Ok(PrayerSlotStatus::Inactive),
    }
}

/// Familiar tokens a summoner of `level` may hold.
#[must_use]
pub fn summoning_cap(level: u32) -> u32 {
    let reached = SUMMONING_CAP_THRESHOLDS
        .iter()
        .filter(|threshold| level >= **threshold)
        .count();
    u32::try_from(reached).unwrap_or(u32::MAX)
}

/// Summoning count after the summoning level changes.
///
/// Leveling up tops the count up to the new cap; leveling down only trims
/// what no longer fits under the lower cap.
#[must_use]
pub fn recompute_summoning_tokens(previous: u32, level: u32) -> u32 {
    let cap = summoning_cap(level);
    previous.max(cap).min(cap)
}

/// Use (`delta < 0`) or return (`delta > 0`) familiar tokens within `[0, max]`.
#[must_use]
pub fn adjust_summoning_tokens(count: u32, delta: i64, max: u32) -> u32 {
    clamped_add(count, delta).min(max)
}

/// Gain or spend rune tokens within `[0, RUNE_TOKEN_CAP]`.
#[must_use]
pub fn adjust_rune_tokens(count: u32, delta: i64) -> u32 {
    clamped_add(count, delta).min(RUNE_TOKEN_CAP)
}

/// Rune tokens gained by one bonus action at the given runecrafting tier.
#[must_use]
pub fn rune_gain_per_action(tier: Tier) -> u32 {
    u32::from(tier.value())
}
