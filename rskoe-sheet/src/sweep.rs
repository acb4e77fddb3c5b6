//! Seeded intent generation and the invariant check shared by the sweep
//! tests and the tester binary.
use anyhow::ensure;
use rand::Rng;

use crate::constants::RUNE_TOKEN_CAP;
use crate::error::SheetError;
use crate::resources::ResourceId;
use crate::rules::level_from_xp;
use crate::sheet::{CharacterSheet, SheetAction};
use crate::skills::SkillId;
use crate::tokens::{PrayerSlot, summoning_cap};

/// A random sheet intent, including values the operations must reject.
pub fn random_action<R: Rng + ?Sized>(rng: &mut R) -> SheetAction {
    let skill = SkillId::ALL[rng.gen_range(0..SkillId::ALL.len())];
    let resource = ResourceId::STANDARD[rng.gen_range(0..ResourceId::STANDARD.len())];
    match rng.gen_range(0..12) {
        0 => SheetAction::AdjustWounds {
            delta: rng.gen_range(-2..=2),
        },
        1 => SheetAction::SetGold {
            value: rng.gen_range(-2..=25),
        },
        2 => SheetAction::SetSideQuests {
            value: rng.gen_range(-1..=14),
        },
        3 => SheetAction::SetDeathTally {
            value: rng.gen_range(-1..=5),
        },
        4 | 5 => SheetAction::ApplyXpDelta {
            skill,
            delta: rng.gen_range(-6..=8),
        },
        6 => SheetAction::SetXp {
            skill,
            xp: rng.gen_range(-2..=30),
        },
        7 => SheetAction::TogglePrayerSlot {
            slot: PrayerSlot::ALL[rng.gen_range(0..PrayerSlot::ALL.len())],
        },
        8 => SheetAction::AdjustSummoningTokens {
            delta: rng.gen_range(-2..=2),
        },
        9 => SheetAction::AdjustRuneTokens {
            delta: rng.gen_range(-4..=4),
        },
        10 => SheetAction::SetResourceCount {
            resource,
            value: rng.gen_range(-1..=3),
        },
        _ => SheetAction::CraftRunes,
    }
}

/// Every derived field agrees with the fields it derives from.
///
/// # Errors
///
/// Returns the first field found out of line with its source.
pub fn check_invariants(sheet: &CharacterSheet) -> anyhow::Result<()> {
    for skill in SkillId::ALL {
        ensure!(
            sheet.level(skill) == level_from_xp(sheet.skills().xp(skill)),
            "{skill} level drifted from its xp"
        );
    }
    let prayer = sheet.level(SkillId::Prayer);
    for slot in PrayerSlot::ALL {
        let status = sheet.prayer_tokens().status(slot);
        ensure!(
            status.is_unlocked() == (prayer >= slot.threshold()),
            "prayer {slot} is {status:?} at prayer level {prayer}"
        );
    }
    let cap = summoning_cap(sheet.level(SkillId::Summoning));
    ensure!(
        sheet.summoning_tokens() <= cap,
        "summoning tokens {} over cap {cap}",
        sheet.summoning_tokens()
    );
    ensure!(
        sheet.rune_tokens() <= RUNE_TOKEN_CAP,
        "rune tokens {} over cap",
        sheet.rune_tokens()
    );
    ensure!(
        sheet.wounds() <= sheet.max_wounds(),
        "wounds {} over max {}",
        sheet.wounds(),
        sheet.max_wounds()
    );
    Ok(())
}

/// A fresh character holding `count` of every standard resource.
///
/// # Errors
///
/// Returns an error for counts a pool cannot store.
pub fn stocked_sheet(count: i64) -> Result<CharacterSheet, SheetError> {
    ResourceId::STANDARD
        .iter()
        .try_fold(CharacterSheet::default(), |sheet, resource| {
            sheet.set_resource_count(*resource, count)
        })
}
