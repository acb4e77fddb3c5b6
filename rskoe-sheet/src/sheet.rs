//! The character sheet aggregate.
//!
//! Every operation takes the current snapshot by reference and returns a new
//! one with all derived fields settled: prayer slots, summoning tokens, the
//! wound cap and cape objectives. A rejected operation returns an error and
//! the caller keeps its previous snapshot.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::{BankEvent, ClanBank};
use crate::capes::{CapeObjectives, CapeProgress};
use crate::constants::{
    BASE_MAX_WOUNDS, BONUS_WOUND_SIDE_QUESTS, BOSS_EQUIP_SIDE_QUESTS, DEFAULT_CHARACTER_NAME,
    DEFAULT_GOLD, FREE_TELEPORT_SIDE_QUESTS, RUNE_TOKEN_CAP,
};
use crate::error::{SheetError, clamped_add, non_negative};
use crate::resources::{ResourceId, ResourcePool, move_one_unit};
use crate::rules::Tier;
use crate::skills::{SkillId, SkillLedger};
use crate::tokens::{
    PrayerSlot, PrayerSlots, adjust_rune_tokens, adjust_summoning_tokens,
    recompute_summoning_tokens, rune_gain_per_action, summoning_cap,
};

/// Loaded documents pass through [`StoredSheet`] and are brought back within
/// the rule limits, so a hand-edited or stale save cannot carry unlocked
/// slots or token counts its levels do not allow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredSheet")]
pub struct CharacterSheet {
    character_name: String,
    wounds: u32,
    death_tally: u32,
    gp: u32,
    skills: SkillLedger,
    resources: ResourcePool,
    cape_objectives: CapeObjectives,
    side_quests_completed_count: u32,
    prayer_tokens: PrayerSlots,
    available_summoning_tokens: u32,
    available_rune_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

/// Sheet document as written to storage, before the rules are applied.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSheet {
    character_name: String,
    wounds: u32,
    death_tally: u32,
    gp: u32,
    skills: SkillLedger,
    resources: ResourcePool,
    #[serde(default)]
    cape_objectives: CapeObjectives,
    side_quests_completed_count: u32,
    #[serde(default)]
    prayer_tokens: PrayerSlots,
    available_summoning_tokens: u32,
    available_rune_tokens: u32,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

impl From<StoredSheet> for CharacterSheet {
    fn from(stored: StoredSheet) -> Self {
        let sheet = Self {
            character_name: stored.character_name,
            wounds: stored.wounds,
            death_tally: stored.death_tally,
            gp: stored.gp,
            skills: stored.skills,
            resources: stored.resources,
            cape_objectives: stored.cape_objectives,
            side_quests_completed_count: stored.side_quests_completed_count,
            prayer_tokens: stored.prayer_tokens,
            available_summoning_tokens: stored.available_summoning_tokens,
            available_rune_tokens: stored.available_rune_tokens,
            last_updated: stored.last_updated,
        };
        let normalized = sheet.clone().normalized();
        if normalized != sheet {
            log::warn!(
                "saved sheet for {} exceeded rule limits and was adjusted",
                sheet.character_name
            );
        }
        normalized
    }
}

impl Default for CharacterSheet {
    fn default() -> Self {
        Self::new(DEFAULT_CHARACTER_NAME)
    }
}

/// Bonuses unlocked by completed side quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SideQuestPerks {
    pub extra_wound: bool,
    pub free_teleport: bool,
    pub extra_boss_equipment: bool,
}

impl SideQuestPerks {
    #[must_use]
    pub const fn for_count(completed: u32) -> Self {
        Self {
            extra_wound: completed >= BONUS_WOUND_SIDE_QUESTS,
            free_teleport: completed >= FREE_TELEPORT_SIDE_QUESTS,
            extra_boss_equipment: completed >= BOSS_EQUIP_SIDE_QUESTS,
        }
    }
}

/// Result of moving one unit between a character and the clan bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankTransfer {
    pub sheet: CharacterSheet,
    pub bank: ClanBank,
    pub resource: ResourceId,
    /// Change applied to the bank, for broadcasting to the room.
    pub bank_delta: i64,
}

impl BankTransfer {
    #[must_use]
    pub fn event(&self, room_id: impl Into<String>) -> BankEvent {
        BankEvent::delta(room_id, self.resource, self.bank_delta)
    }
}

impl CharacterSheet {
    /// A fresh character with the starting kit.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            character_name: name.into(),
            wounds: 0,
            death_tally: 0,
            gp: DEFAULT_GOLD,
            skills: SkillLedger::default(),
            resources: ResourcePool::default(),
            cape_objectives: CapeObjectives::default(),
            side_quests_completed_count: 0,
            prayer_tokens: PrayerSlots::default(),
            available_summoning_tokens: 0,
            available_rune_tokens: 0,
            last_updated: None,
        }
    }

    #[must_use]
    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    #[must_use]
    pub const fn wounds(&self) -> u32 {
        self.wounds
    }

    #[must_use]
    pub const fn death_tally(&self) -> u32 {
        self.death_tally
    }

    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gp
    }

    #[must_use]
    pub const fn skills(&self) -> &SkillLedger {
        &self.skills
    }

    #[must_use]
    pub const fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    #[must_use]
    pub const fn cape_objectives(&self) -> CapeObjectives {
        self.cape_objectives
    }

    #[must_use]
    pub const fn side_quests_completed(&self) -> u32 {
        self.side_quests_completed_count
    }

    #[must_use]
    pub const fn prayer_tokens(&self) -> PrayerSlots {
        self.prayer_tokens
    }

    #[must_use]
    pub const fn summoning_tokens(&self) -> u32 {
        self.available_summoning_tokens
    }

    #[must_use]
    pub const fn rune_tokens(&self) -> u32 {
        self.available_rune_tokens
    }

    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub fn level(&self, skill: SkillId) -> u32 {
        self.skills.level(skill)
    }

    #[must_use]
    pub const fn side_quest_perks(&self) -> SideQuestPerks {
        SideQuestPerks::for_count(self.side_quests_completed_count)
    }

    #[must_use]
    pub const fn max_wounds(&self) -> u32 {
        if self.side_quest_perks().extra_wound {
            BASE_MAX_WOUNDS + 1
        } else {
            BASE_MAX_WOUNDS
        }
    }

    #[must_use]
    pub fn summoning_cap(&self) -> u32 {
        summoning_cap(self.level(SkillId::Summoning))
    }

    #[must_use]
    pub fn runecrafting_tier(&self) -> Tier {
        self.skills.tier(SkillId::Runecrafting)
    }

    /// Copy stamped with a save time. Used by the engine on save.
    #[must_use]
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }

    #[must_use]
    pub fn set_name(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.character_name = name.into();
        next
    }

    /// Takes (`delta > 0`) or heals (`delta < 0`) wounds within `[0, max_wounds]`.
    #[must_use]
    pub fn adjust_wounds(&self, delta: i64) -> Self {
        let mut next = self.clone();
        next.wounds = clamped_add(self.wounds, delta).min(self.max_wounds());
        next
    }

    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] for negative tallies and
    /// [`SheetError::ValueTooLarge`] past `u32::MAX`.
    pub fn set_death_tally(&self, value: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.death_tally = non_negative("deathTally", value)?;
        Ok(next)
    }

    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] for negative gold and
    /// [`SheetError::ValueTooLarge`] past `u32::MAX`.
    pub fn set_gold(&self, value: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.gp = non_negative("gp", value)?;
        Ok(next.settle(self))
    }

    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] for negative counts and
    /// [`SheetError::ValueTooLarge`] past `u32::MAX`.
    pub fn set_side_quests(&self, value: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.side_quests_completed_count = non_negative("sideQuestsCompletedCount", value)?;
        Ok(next.settle(self))
    }

    /// Relative XP change, flooring at zero and saturating at `u32::MAX`.
    #[must_use]
    pub fn apply_xp_delta(&self, skill: SkillId, delta: i64) -> Self {
        let mut next = self.clone();
        next.skills = self.skills.apply_xp_delta(skill, delta);
        next.settle(self)
    }

    /// # Errors
    ///
    /// Returns [`SheetError::InvalidSkillId`] for names outside the skill list.
    pub fn apply_named_xp_delta(&self, skill: &str, delta: i64) -> Result<Self, SheetError> {
        let skill = skill.parse::<SkillId>()?;
        Ok(self.apply_xp_delta(skill, delta))
    }

    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] for negative XP and
    /// [`SheetError::ValueTooLarge`] past `u32::MAX`.
    pub fn set_xp(&self, skill: SkillId, xp: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.skills = self.skills.set_xp(skill, xp)?;
        Ok(next.settle(self))
    }

    /// # Errors
    ///
    /// Returns [`SheetError::SlotLocked`] when the slot is not unlocked yet.
    pub fn toggle_prayer_slot(&self, slot: PrayerSlot) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.prayer_tokens = self.prayer_tokens.toggle(slot)?;
        Ok(next)
    }

    #[must_use]
    pub fn adjust_summoning_tokens(&self, delta: i64) -> Self {
        let mut next = self.clone();
        next.available_summoning_tokens =
            adjust_summoning_tokens(self.available_summoning_tokens, delta, self.summoning_cap());
        next
    }

    #[must_use]
    pub fn adjust_rune_tokens(&self, delta: i64) -> Self {
        let mut next = self.clone();
        next.available_rune_tokens = adjust_rune_tokens(self.available_rune_tokens, delta);
        next
    }

    /// One bonus runecrafting action: gains as many rune tokens as the tier allows.
    #[must_use]
    pub fn craft_runes(&self) -> Self {
        let gain = rune_gain_per_action(self.runecrafting_tier());
        self.adjust_rune_tokens(i64::from(gain))
    }

    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] or [`SheetError::ValueTooLarge`]
    /// for counts outside `u32` and [`SheetError::UntrackedResource`] for
    /// bank-only resources.
    pub fn set_resource_count(&self, resource: ResourceId, value: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.resources = self.resources.set_count(resource, value)?;
        Ok(next.settle(self))
    }

    /// Relative change of one of the character's resources, flooring at zero
    /// and saturating at `u32::MAX`.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::UntrackedResource`] for bank-only resources.
    pub fn adjust_resource(&self, resource: ResourceId, delta: i64) -> Result<Self, SheetError> {
        let mut next = self.clone();
        next.resources = self.resources.adjust(resource, delta)?;
        Ok(next.settle(self))
    }

    /// Deposits one unit into the clan bank.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InsufficientQuantity`] when the character holds none.
    pub fn transfer_to_bank(
        &self,
        bank: &ClanBank,
        resource: ResourceId,
    ) -> Result<BankTransfer, SheetError> {
        let (resources, bank_resources) =
            move_one_unit(&self.resources, &bank.resources.widened(), resource)?;
        let mut next = self.clone();
        next.resources = resources;
        Ok(BankTransfer {
            sheet: next.settle(self),
            bank: ClanBank {
                resources: bank_resources,
                last_updated: bank.last_updated,
            },
            resource,
            bank_delta: 1,
        })
    }

    /// Withdraws one unit from the clan bank.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InsufficientQuantity`] when the bank holds none and
    /// [`SheetError::UntrackedResource`] for bank-only resources.
    pub fn transfer_from_bank(
        &self,
        bank: &ClanBank,
        resource: ResourceId,
    ) -> Result<BankTransfer, SheetError> {
        let (bank_resources, resources) =
            move_one_unit(&bank.resources.widened(), &self.resources, resource)?;
        let mut next = self.clone();
        next.resources = resources;
        Ok(BankTransfer {
            sheet: next.settle(self),
            bank: ClanBank {
                resources: bank_resources,
                last_updated: bank.last_updated,
            },
            resource,
            bank_delta: -1,
        })
    }

    /// Routes a named intent to its operation.
    ///
    /// # Errors
    ///
    /// Propagates the routed operation's rejection.
    pub fn apply(&self, action: &SheetAction) -> Result<Self, SheetError> {
        let outcome = match action {
            SheetAction::SetName { name } => Ok(self.set_name(name.clone())),
            SheetAction::AdjustWounds { delta } => Ok(self.adjust_wounds(*delta)),
            SheetAction::SetDeathTally { value } => self.set_death_tally(*value),
            SheetAction::SetGold { value } => self.set_gold(*value),
            SheetAction::SetSideQuests { value } => self.set_side_quests(*value),
            SheetAction::ApplyXpDelta { skill, delta } => Ok(self.apply_xp_delta(*skill, *delta)),
            SheetAction::SetXp { skill, xp } => self.set_xp(*skill, *xp),
            SheetAction::TogglePrayerSlot { slot } => self.toggle_prayer_slot(*slot),
            SheetAction::AdjustSummoningTokens { delta } => {
                Ok(self.adjust_summoning_tokens(*delta))
            }
            SheetAction::AdjustRuneTokens { delta } => Ok(self.adjust_rune_tokens(*delta)),
            SheetAction::CraftRunes => Ok(self.craft_runes()),
            SheetAction::SetResourceCount { resource, value } => {
                self.set_resource_count(*resource, *value)
            }
            SheetAction::AdjustResource { resource, delta } => {
                self.adjust_resource(*resource, *delta)
            }
        };
        if let Err(err) = &outcome {
            log::warn!("rejected {}: {err}", action.name());
        }
        outcome
    }

    /// Re-derives every dependent field from scratch and clamps the token
    /// counters. Summoning tokens are only clamped, never granted.
    fn normalized(self) -> Self {
        let before = self.clone();
        let mut next = self.settle(&before);
        next.available_rune_tokens = next.available_rune_tokens.min(RUNE_TOKEN_CAP);
        next
    }

    /// Re-derives everything that depends on the fields an operation touched.
    fn settle(mut self, before: &Self) -> Self {
        for skill in SkillId::ALL {
            let (from, to) = (before.level(skill), self.level(skill));
            if from != to {
                log::debug!("{skill} level {from} -> {to}");
            }
        }

        let prayer_tokens = self.prayer_tokens.recompute(self.level(SkillId::Prayer));
        if prayer_tokens != self.prayer_tokens {
            log::debug!("prayer slots now {prayer_tokens:?}");
        }
        self.prayer_tokens = prayer_tokens;

        let summoning = self.level(SkillId::Summoning);
        self.available_summoning_tokens = if summoning == before.level(SkillId::Summoning) {
            self.available_summoning_tokens.min(summoning_cap(summoning))
        } else {
            recompute_summoning_tokens(self.available_summoning_tokens, summoning)
        };

        self.wounds = self.wounds.min(self.max_wounds());
        self.cape_objectives = self.cape_objectives.evaluate(&CapeProgress {
            skills: &self.skills,
            gold: self.gp,
            resources: &self.resources,
            side_quests: self.side_quests_completed_count,
        });
        self
    }
}

/// Named sheet intents, as sent by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SheetAction {
    SetName { name: String },
    AdjustWounds { delta: i64 },
    SetDeathTally { value: i64 },
    SetGold { value: i64 },
    SetSideQuests { value: i64 },
    ApplyXpDelta { skill: SkillId, delta: i64 },
    SetXp { skill: SkillId, xp: i64 },
    TogglePrayerSlot { slot: PrayerSlot },
    AdjustSummoningTokens { delta: i64 },
    AdjustRuneTokens { delta: i64 },
    CraftRunes,
    SetResourceCount { resource: ResourceId, value: i64 },
    AdjustResource { resource: ResourceId, delta: i64 },
}

impl SheetAction {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetName { .. } => "setName",
            Self::AdjustWounds { .. } => "adjustWounds",
            Self::SetDeathTally { .. } => "setDeathTally",
            Self::SetGold { .. } => "setGold",
            Self::SetSideQuests { .. } => "setSideQuests",
            Self::ApplyXpDelta { .. } => "applyXpDelta",
            Self::SetXp { .. } => "setXp",
            Self::TogglePrayerSlot { .. } => "togglePrayerSlot",
            Self::AdjustSummoningTokens { .. } => "adjustSummoningTokens",
            Self::AdjustRuneTokens { .. } => "adjustRuneTokens",
            Self::CraftRunes => "craftRunes",
            Self::SetResourceCount { .. } => "setResourceCount",
            Self::AdjustResource { .. } => "adjustResource",
        }
    }
}
