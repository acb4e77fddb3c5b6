//! Centralized rule constants for the Kingdoms character sheet.
//!
//! Every threshold the derivation rules and token engines read lives here so
//! that tuning the tabletop rules is a reviewed code change rather than an
//! edit to stored snapshots.

// Progression --------------------------------------------------------------
/// Experience points required per skill level.
pub const XP_PER_LEVEL: u32 = 3;
/// Level from which a skill sits in tier 2.
pub const TIER_TWO_LEVEL: u32 = 4;
/// Level from which a skill sits in tier 3.
pub const TIER_THREE_LEVEL: u32 = 7;

// Tokens -------------------------------------------------------------------
/// Prayer levels that unlock slots one, two and three.
pub const PRAYER_SLOT_THRESHOLDS: [u32; 3] = [1, TIER_TWO_LEVEL, TIER_THREE_LEVEL];
/// Summoning levels that raise the familiar cap to one, two and three tokens.
pub const SUMMONING_CAP_THRESHOLDS: [u32; 3] = [1, TIER_TWO_LEVEL, TIER_THREE_LEVEL];
/// Soft cap on rune tokens held on the skill card.
pub const RUNE_TOKEN_CAP: u32 = 9;

// Cape objectives ----------------------------------------------------------
pub const CAPE_ANY_SKILL_LEVEL: u32 = 8;
pub const CAPE_BROAD_SKILL_LEVEL: u32 = 3;
pub const CAPE_BROAD_SKILL_COUNT: usize = 8;
pub const CAPE_COIN_TARGET: u32 = 15;
pub const CAPE_SIDE_QUEST_TARGET: u32 = 4;

// Wounds and side-quest perks ----------------------------------------------
pub const BASE_MAX_WOUNDS: u32 = 3;
pub const BONUS_WOUND_SIDE_QUESTS: u32 = 5;
pub const FREE_TELEPORT_SIDE_QUESTS: u32 = 8;
pub const BOSS_EQUIP_SIDE_QUESTS: u32 = 12;

// New character ------------------------------------------------------------
pub const DEFAULT_CHARACTER_NAME: &str = "Adventurer";
pub const DEFAULT_GOLD: u32 = 10;
pub const DEFAULT_COOKING_XP: u32 = 1;

// Storage keys -------------------------------------------------------------
pub const CHARACTER_SHEET_KEY: &str = "rskoe-character-sheet-display-v1";
pub const CLAN_BANK_KEY: &str = "rskoe-clan-bank-v1";
