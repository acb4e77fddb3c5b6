//! Multi-participant clan bank simulation over the in-process room hub.
use anyhow::{Context, Result, ensure};
use chrono::{TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rskoe_sheet::{
    BankReplica, ClanBank, FixedClock, MemoryStore, ResourceId, RoomHub, RoomLink, SheetEngine,
    SyncError,
};

use super::{RunSummary, ScenarioCtx};

const ROOM_ID: &str = "qa-room";
const OPENING_STOCK: i64 = 100_000;

struct Participant {
    engine: SheetEngine<MemoryStore, RoomLink, FixedClock>,
    link: RoomLink,
    replica: BankReplica,
}

impl Participant {
    /// Applies pending events. Snapshots meant for later joiners are skipped.
    fn deliver(&mut self) -> Result<usize> {
        let events = self.link.drain();
        for event in &events {
            match self.engine.receive_bank_event(&self.replica, event) {
                Ok(next) => self.replica = next,
                Err(err) if err.downcast_ref::<SyncError>() == Some(&SyncError::SnapshotAfterJoin) => {}
                Err(err) => {
                    return Err(err.context(format!(
                        "{} applying {event:?}",
                        self.link.participant()
                    )));
                }
            }
        }
        Ok(events.len())
    }
}

pub fn room_sync(ctx: &ScenarioCtx) -> Result<RunSummary> {
    ensure!(ctx.participants > 0, "room sync needs at least one participant");
    let hub = RoomHub::default();
    let clock = FixedClock(
        Utc.timestamp_opt(1_700_000_000, 0)
            .single()
            .context("fixed clock instant")?,
    );
    let mut summary = RunSummary::default();

    let host_link = hub.connect("p0");
    let host_engine = SheetEngine::with_clock(MemoryStore::default(), host_link.clone(), clock);
    let opening = ResourceId::STANDARD
        .iter()
        .fold(ClanBank::default(), |bank, resource| {
            bank.apply_bank_delta(*resource, OPENING_STOCK)
        });
    let host_replica = BankReplica::new(ROOM_ID, opening).join();
    let host_replica = host_engine.commit_bank_delta(&host_replica, ResourceId::Ration, 1)?;

    let mut participants = vec![Participant {
        engine: host_engine,
        link: host_link,
        replica: host_replica,
    }];
    for idx in 1..ctx.participants {
        let link = hub.connect(format!("p{idx}"));
        let engine = SheetEngine::with_clock(MemoryStore::default(), link.clone(), clock);
        let replica = engine.join_room(ROOM_ID)?;
        link.drain();
        participants[0].engine.offer_initial_sync(&participants[0].replica)?;
        let mut joiner = Participant {
            engine,
            link,
            replica,
        };
        summary.events_delivered += joiner.deliver()?;
        participants.push(joiner);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(ctx.seed);
    for _ in 0..ctx.steps {
        let who = rng.gen_range(0..participants.len());
        let resource = ResourceId::STANDARD[rng.gen_range(0..ResourceId::STANDARD.len())];
        let delta = rng.gen_range(-3..=3);
        let participant = &mut participants[who];
        participant.replica =
            participant
                .engine
                .commit_bank_delta(&participant.replica, resource, delta)?;
        summary.actions_applied += 1;
        if rng.gen_bool(0.25) {
            let reader = rng.gen_range(0..participants.len());
            summary.events_delivered += participants[reader].deliver()?;
        }
    }
    for participant in &mut participants {
        summary.events_delivered += participant.deliver()?;
    }

    let reference = participants[0].replica.bank().resources.clone();
    for participant in &participants[1..] {
        ensure!(
            participant.replica.bank().resources == reference,
            "{} diverged from p0",
            participant.link.participant()
        );
    }
    if ctx.verbose {
        println!(
            "    {} participants converged after {} events",
            participants.len(),
            summary.events_delivered
        );
    }
    Ok(summary)
}
