//! RuneScape Kingdoms character sheet engine
//!
//! Platform-agnostic rules for the tabletop character sheet and the shared
//! clan bank. Every transition is a pure function over an immutable snapshot;
//! persistence, room transport and the wall clock are injected into
//! [`SheetEngine`] as collaborators.

pub mod bank;
pub mod capes;
pub mod constants;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod resources;
pub mod rules;
pub mod sheet;
pub mod skills;
#[cfg(any(test, feature = "testing"))]
pub mod sweep;
pub mod tokens;

use anyhow::Context;
use chrono::{DateTime, Utc};

// Re-export commonly used types
pub use bank::{BankEvent, BankReplica, ClanBank, ReplicaPhase, adjust_clan_bank_resource};
pub use capes::{CapeObjective, CapeObjectives, CapeProgress};
pub use constants::{CHARACTER_SHEET_KEY, CLAN_BANK_KEY};
pub use error::{SheetError, SyncError};
#[cfg(any(test, feature = "testing"))]
pub use memory::{FixedClock, MemoryStore, RoomHub, RoomLink};
pub use resources::{ResourceId, ResourcePool, ResourceSet, move_one_unit, set_resource_count};
pub use rules::{Tier, level_from_xp, tier_from_level, xp_into_level};
pub use sheet::{BankTransfer, CharacterSheet, SheetAction, SideQuestPerks};
pub use skills::{SkillId, SkillLedger};
pub use tokens::{
    PrayerSlot, PrayerSlotStatus, PrayerSlots, adjust_rune_tokens, adjust_summoning_tokens,
    recompute_summoning_tokens, summoning_cap, toggle_prayer_slot,
};

/// Trait for abstracting snapshot persistence.
/// Snapshots are handed over as serialized JSON text.
pub trait SnapshotStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a snapshot under `key`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    fn save(&self, key: &str, snapshot: &str) -> Result<(), Self::Error>;

    /// Fetch the snapshot stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Forget the snapshot stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Trait for the real-time channel shared by a room
pub trait BankTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send an event to every other participant of the event's room
    ///
    /// # Errors
    ///
    /// Returns an error if the event cannot be sent.
    fn broadcast(&self, event: &BankEvent) -> Result<(), Self::Error>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Persists sheets and keeps a room's clan bank in sync.
pub struct SheetEngine<S, T, C = SystemClock>
where
    S: SnapshotStore,
    T: BankTransport,
    C: Clock,
{
    store: S,
    transport: T,
    clock: C,
}

impl<S, T> SheetEngine<S, T>
where
    S: SnapshotStore,
    T: BankTransport,
{
    /// Create an engine stamping snapshots with the system clock
    pub const fn new(store: S, transport: T) -> Self {
        Self {
            store,
            transport,
            clock: SystemClock,
        }
    }
}

impl<S, T, C> SheetEngine<S, T, C>
where
    S: SnapshotStore,
    T: BankTransport,
    C: Clock,
{
    pub const fn with_clock(store: S, transport: T, clock: C) -> Self {
        Self {
            store,
            transport,
            clock,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Event a synced participant sends to bring a newcomer up to date
    #[must_use]
    pub fn initial_sync_event(&self, replica: &BankReplica) -> BankEvent {
        BankEvent::snapshot(replica.room_id(), replica.bank().clone())
    }
}

impl<S, T, C> SheetEngine<S, T, C>
where
    S: SnapshotStore,
    T: BankTransport,
    C: Clock,
    S::Error: Into<anyhow::Error>,
    T::Error: Into<anyhow::Error>,
{
    /// Stamp and persist a sheet, returning the stamped copy
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet cannot be serialized or written.
    pub fn save_sheet(&self, sheet: &CharacterSheet) -> anyhow::Result<CharacterSheet> {
        let stamped = sheet.clone().stamped(self.clock.now());
        let text = serde_json::to_string(&stamped).context("serializing character sheet")?;
        self.store
            .save(CHARACTER_SHEET_KEY, &text)
            .map_err(Into::into)?;
        log::debug!("saved sheet for {}", stamped.character_name());
        Ok(stamped)
    }

    /// Load the saved sheet, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the saved sheet is malformed.
    pub fn load_sheet(&self) -> anyhow::Result<Option<CharacterSheet>> {
        let Some(text) = self.store.load(CHARACTER_SHEET_KEY).map_err(Into::into)? else {
            return Ok(None);
        };
        let sheet = serde_json::from_str(&text).context("parsing saved character sheet")?;
        Ok(Some(sheet))
    }

    /// Load the saved sheet, falling back to a fresh one when absent or unreadable
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn load_sheet_or_default(&self) -> anyhow::Result<CharacterSheet> {
        let Some(text) = self.store.load(CHARACTER_SHEET_KEY).map_err(Into::into)? else {
            return Ok(CharacterSheet::default());
        };
        match serde_json::from_str(&text) {
            Ok(sheet) => Ok(sheet),
            Err(err) => {
                log::warn!("saved character sheet is unreadable, starting fresh: {err}");
                Ok(CharacterSheet::default())
            }
        }
    }

    /// Remove the saved sheet and hand back a fresh one
    ///
    /// # Errors
    ///
    /// Returns an error if the saved sheet cannot be removed.
    pub fn reset_sheet(&self) -> anyhow::Result<CharacterSheet> {
        self.store
            .remove(CHARACTER_SHEET_KEY)
            .map_err(Into::into)?;
        Ok(CharacterSheet::default())
    }

    /// Load the locally persisted clan bank, or an empty one
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn load_bank(&self) -> anyhow::Result<ClanBank> {
        let Some(text) = self.store.load(CLAN_BANK_KEY).map_err(Into::into)? else {
            return Ok(ClanBank::default());
        };
        Ok(serde_json::from_str(&text).unwrap_or_else(|err| {
            log::warn!("saved clan bank is unreadable, starting empty: {err}");
            ClanBank::default()
        }))
    }

    fn stamp_bank(&self, replica: BankReplica) -> anyhow::Result<(BankReplica, String)> {
        let replica = replica.stamped(self.clock.now());
        let text = serde_json::to_string(replica.bank()).context("serializing clan bank")?;
        Ok((replica, text))
    }

    fn persist_bank(&self, replica: BankReplica) -> anyhow::Result<BankReplica> {
        let (replica, text) = self.stamp_bank(replica)?;
        self.store.save(CLAN_BANK_KEY, &text).map_err(Into::into)?;
        Ok(replica)
    }

    /// Join a room with the locally persisted bank
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted bank cannot be read.
    pub fn join_room(&self, room_id: &str) -> anyhow::Result<BankReplica> {
        Ok(BankReplica::new(room_id, self.load_bank()?).join())
    }

    /// Send the initial sync snapshot to the room
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub fn offer_initial_sync(&self, replica: &BankReplica) -> anyhow::Result<()> {
        self.transport
            .broadcast(&self.initial_sync_event(replica))
            .map_err(Into::into)
    }

    /// Apply a local delta, broadcast it and then persist the bank
    ///
    /// Nothing is written when the broadcast fails, so the stored bank never
    /// holds a change the room has not been sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the replica is detached or a collaborator fails.
    /// A failed save after a successful broadcast is reported with context.
    pub fn commit_bank_delta(
        &self,
        replica: &BankReplica,
        resource: ResourceId,
        delta: i64,
    ) -> anyhow::Result<BankReplica> {
        let (next, event) = replica.apply_local(resource, delta)?;
        let (next, text) = self.stamp_bank(next)?;
        self.transport
            .broadcast(&event)
            .map_err(Into::<anyhow::Error>::into)
            .context("broadcasting bank delta")?;
        self.store
            .save(CLAN_BANK_KEY, &text)
            .map_err(Into::<anyhow::Error>::into)
            .context("saving clan bank after broadcast")?;
        Ok(next)
    }

    /// Apply an event from the room and persist the result
    ///
    /// # Errors
    ///
    /// Returns an error if the event is rejected or the bank cannot be saved.
    pub fn receive_bank_event(
        &self,
        replica: &BankReplica,
        event: &BankEvent,
    ) -> anyhow::Result<BankReplica> {
        let next = replica.apply_event(event)?;
        self.persist_bank(next)
    }

    /// Move one unit from the character into the room's bank
    ///
    /// # Errors
    ///
    /// Returns an error if the character holds none or the bank update fails.
    pub fn deposit(
        &self,
        sheet: &CharacterSheet,
        replica: &BankReplica,
        resource: ResourceId,
    ) -> anyhow::Result<(CharacterSheet, BankReplica)> {
        let transfer = sheet.transfer_to_bank(replica.bank(), resource)?;
        let replica = self.commit_bank_delta(replica, resource, transfer.bank_delta)?;
        Ok((transfer.sheet, replica))
    }

    /// Move one unit from the room's bank to the character
    ///
    /// # Errors
    ///
    /// Returns an error if the bank holds none or the bank update fails.
    pub fn withdraw(
        &self,
        sheet: &CharacterSheet,
        replica: &BankReplica,
        resource: ResourceId,
    ) -> anyhow::Result<(CharacterSheet, BankReplica)> {
        let transfer = sheet.transfer_from_bank(replica.bank(), resource)?;
        let replica = self.commit_bank_delta(replica, resource, transfer.bank_delta)?;
        Ok((transfer.sheet, replica))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pinned() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn engine(store: MemoryStore, link: RoomLink) -> SheetEngine<MemoryStore, RoomLink, FixedClock> {
        SheetEngine::with_clock(store, link, pinned())
    }

    #[test]
    fn engine_saves_and_roundtrips_sheet() {
        let hub = RoomHub::default();
        let engine = engine(MemoryStore::default(), hub.connect("solo"));
        assert!(engine.load_sheet().unwrap().is_none());

        let sheet = CharacterSheet::new("Zezima")
            .set_gold(22)
            .unwrap()
            .apply_xp_delta(SkillId::Prayer, 12);
        let saved = engine.save_sheet(&sheet).unwrap();
        assert_eq!(saved.last_updated(), Some(pinned().0));

        let loaded = engine.load_sheet().unwrap().expect("sheet saved");
        assert_eq!(loaded, saved);
        assert!(loaded.cape_objectives().have15_coins);
    }

    #[test]
    fn unreadable_sheet_falls_back_to_default() {
        let store = MemoryStore::default();
        store.put_raw(CHARACTER_SHEET_KEY, "{\"characterName\":");
        let engine = engine(store, RoomHub::default().connect("solo"));
        assert!(engine.load_sheet().is_err());
        assert_eq!(engine.load_sheet_or_default().unwrap(), CharacterSheet::default());
    }

    #[test]
    fn reset_removes_saved_sheet() {
        let store = MemoryStore::default();
        let engine = engine(store.clone(), RoomHub::default().connect("solo"));
        engine.save_sheet(&CharacterSheet::new("Temp")).unwrap();
        assert!(store.raw(CHARACTER_SHEET_KEY).is_some());
        let fresh = engine.reset_sheet().unwrap();
        assert_eq!(fresh.character_name(), "Adventurer");
        assert!(store.raw(CHARACTER_SHEET_KEY).is_none());
    }

    #[test]
    fn bank_delta_is_persisted_and_broadcast() {
        let hub = RoomHub::default();
        let store = MemoryStore::default();
        let engine = engine(store.clone(), hub.connect("alice"));
        let replica = engine.join_room("guild").unwrap();
        let replica = engine
            .commit_bank_delta(&replica, ResourceId::Fish, 3)
            .unwrap();
        assert_eq!(replica.bank().count(ResourceId::Fish), 3);
        assert_eq!(replica.bank().last_updated, Some(pinned().0));
        assert_eq!(hub.broadcast_count(), 1);

        let persisted: ClanBank =
            serde_json::from_str(&store.raw(CLAN_BANK_KEY).unwrap()).unwrap();
        assert_eq!(&persisted, replica.bank());
    }

    #[test]
    fn detached_replica_cannot_commit() {
        let engine = engine(MemoryStore::default(), RoomHub::default().connect("alice"));
        let detached = BankReplica::new("guild", ClanBank::default());
        let err = engine
            .commit_bank_delta(&detached, ResourceId::Wood, 1)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SyncError>(), Some(&SyncError::NotJoined));
    }

    struct DownLink;

    impl BankTransport for DownLink {
        type Error = std::io::Error;

        fn broadcast(&self, _event: &BankEvent) -> Result<(), Self::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "room unreachable",
            ))
        }
    }

    #[test]
    fn failed_broadcast_leaves_stored_bank_untouched() {
        let store = MemoryStore::default();
        let engine = SheetEngine::with_clock(store.clone(), DownLink, pinned());
        let replica = engine.join_room("guild").unwrap();
        let sheet = CharacterSheet::default()
            .set_resource_count(ResourceId::Wood, 1)
            .unwrap();

        let err = engine
            .deposit(&sheet, &replica, ResourceId::Wood)
            .unwrap_err();
        assert!(err.to_string().contains("broadcasting bank delta"));
        assert!(store.raw(CLAN_BANK_KEY).is_none());
        assert_eq!(engine.load_bank().unwrap().count(ResourceId::Wood), 0);
        assert_eq!(sheet.resources().count(ResourceId::Wood), 1);
    }

    #[test]
    fn loaded_sheet_is_clamped_to_its_levels() {
        let store = MemoryStore::default();
        let mut json = serde_json::to_value(CharacterSheet::default()).unwrap();
        json["availableSummoningTokens"] = serde_json::json!(3);
        json["wounds"] = serde_json::json!(9);
        store.put_raw(CHARACTER_SHEET_KEY, json.to_string());

        let engine = engine(store, RoomHub::default().connect("solo"));
        let sheet = engine.load_sheet().unwrap().expect("sheet stored");
        assert!(sheet.summoning_tokens() <= sheet.summoning_cap());
        assert_eq!(sheet.wounds(), sheet.max_wounds());
    }

    #[test]
    fn deposit_empty_resource_is_rejected_without_side_effects() {
        let hub = RoomHub::default();
        let engine = engine(MemoryStore::default(), hub.connect("alice"));
        let replica = engine.join_room("guild").unwrap();
        let sheet = CharacterSheet::default();
        let err = engine
            .deposit(&sheet, &replica, ResourceId::Wood)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SheetError>(),
            Some(SheetError::InsufficientQuantity { .. })
        ));
        assert_eq!(hub.broadcast_count(), 0);
    }
}
