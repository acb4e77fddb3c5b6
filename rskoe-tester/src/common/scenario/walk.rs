//! Seeded random intent streams checked against the sheet invariants.
use anyhow::{Result, bail, ensure};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rskoe_sheet::sweep::{check_invariants, random_action, stocked_sheet};
use rskoe_sheet::{CharacterSheet, ClanBank, ResourceId};

use super::{RunSummary, ScenarioCtx};

pub fn random_walk(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let mut sheet = CharacterSheet::default();
    let mut summary = RunSummary::default();
    for step in 0..ctx.steps {
        let action = random_action(&mut rng);
        match sheet.apply(&action) {
            Ok(next) => {
                let lost = sheet.cape_objectives().regressions(&next.cape_objectives());
                if !lost.is_empty() {
                    bail!("step {step}: {} cleared {lost:?}", action.name());
                }
                sheet = next;
                summary.actions_applied += 1;
            }
            Err(err) => {
                if ctx.verbose {
                    println!("    step {step}: {} rejected ({err})", action.name());
                }
                summary.actions_rejected += 1;
            }
        }
        check_invariants(&sheet).map_err(|err| err.context(format!("after step {step}")))?;
    }
    Ok(summary)
}

pub fn transfer_conservation(ctx: &ScenarioCtx) -> Result<RunSummary> {
    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    let mut sheet = stocked_sheet(2)?;
    let mut bank = ClanBank::default();
    let mut summary = RunSummary::default();
    for step in 0..ctx.steps {
        let resource = ResourceId::STANDARD[rng.gen_range(0..ResourceId::STANDARD.len())];
        let before = sheet.resources().count(resource) + bank.count(resource);
        let outcome = if rng.gen_bool(0.5) {
            sheet.transfer_to_bank(&bank, resource)
        } else {
            sheet.transfer_from_bank(&bank, resource)
        };
        match outcome {
            Ok(transfer) => {
                sheet = transfer.sheet;
                bank = transfer.bank;
                summary.actions_applied += 1;
            }
            Err(_) => summary.actions_rejected += 1,
        }
        let after = sheet.resources().count(resource) + bank.count(resource);
        ensure!(
            before == after,
            "step {step}: {resource} total went from {before} to {after}"
        );
    }
    Ok(summary)
}
