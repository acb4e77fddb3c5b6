//! Clan bank: the shared pool of a room and the reducer every participant runs.
//!
//! Every local change is applied through [`ClanBank::apply_bank_delta`] and
//! broadcast as a [`BankEvent::Delta`]; every remote delta goes through the
//! same reducer. A full [`BankEvent::Snapshot`] is only accepted once, as the
//! initial sync right after joining a room.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, clamped_add};
use crate::resources::{ResourceId, ResourcePool, ResourceSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanBank {
    pub resources: ResourcePool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for ClanBank {
    fn default() -> Self {
        Self {
            resources: ResourcePool::empty(ResourceSet::Extended),
            last_updated: None,
        }
    }
}

impl ClanBank {
    #[must_use]
    pub fn count(&self, resource: ResourceId) -> u32 {
        self.resources.count(resource)
    }

    /// Relative change of one resource, flooring at zero and saturating at
    /// `u32::MAX`. Never fails.
    #[must_use]
    pub fn apply_bank_delta(&self, resource: ResourceId, delta: i64) -> Self {
        let resources = self.resources.widened();
        let next = clamped_add(resources.count(resource), delta);
        Self {
            resources: resources.with_count(resource, next),
            last_updated: self.last_updated,
        }
    }

    #[must_use]
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }
}

/// Free-function form of [`ClanBank::apply_bank_delta`].
#[must_use]
pub fn adjust_clan_bank_resource(bank: &ClanBank, resource: ResourceId, delta: i64) -> ClanBank {
    bank.apply_bank_delta(resource, delta)
}

/// Messages exchanged between participants of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BankEvent {
    Delta {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "resourceId")]
        resource: ResourceId,
        delta: i64,
    },
    Snapshot {
        #[serde(rename = "roomId")]
        room_id: String,
        bank: ClanBank,
    },
}

impl BankEvent {
    #[must_use]
    pub fn delta(room_id: impl Into<String>, resource: ResourceId, delta: i64) -> Self {
        Self::Delta {
            room_id: room_id.into(),
            resource,
            delta,
        }
    }

    #[must_use]
    pub fn snapshot(room_id: impl Into<String>, bank: ClanBank) -> Self {
        Self::Snapshot {
            room_id: room_id.into(),
            bank,
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        match self {
            Self::Delta { room_id, .. } | Self::Snapshot { room_id, .. } => room_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplicaPhase {
    #[default]
    Detached,
    /// Joined, still waiting for the first event.
    Joining,
    Synced,
}

/// One participant's copy of a room's clan bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankReplica {
    room_id: String,
    phase: ReplicaPhase,
    bank: ClanBank,
}

impl BankReplica {
    /// A detached replica seeded from the locally persisted bank.
    #[must_use]
    pub fn new(room_id: impl Into<String>, bank: ClanBank) -> Self {
        Self {
            room_id: room_id.into(),
            phase: ReplicaPhase::Detached,
            bank,
        }
    }

    #[must_use]
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    #[must_use]
    pub const fn phase(&self) -> ReplicaPhase {
        self.phase
    }

    #[must_use]
    pub const fn bank(&self) -> &ClanBank {
        &self.bank
    }

    #[must_use]
    pub fn into_bank(self) -> ClanBank {
        self.bank
    }

    #[must_use]
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        self.bank = self.bank.stamped(at);
        self
    }

    #[must_use]
    pub fn join(mut self) -> Self {
        self.phase = ReplicaPhase::Joining;
        self
    }

    #[must_use]
    pub fn leave(mut self) -> Self {
        self.phase = ReplicaPhase::Detached;
        self
    }

    /// Applies a locally originated delta and returns the event to broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotJoined`] while detached.
    pub fn apply_local(
        &self,
        resource: ResourceId,
        delta: i64,
    ) -> Result<(Self, BankEvent), SyncError> {
        let event = BankEvent::delta(self.room_id.clone(), resource, delta);
        let next = self.apply_event(&event)?;
        Ok((next, event))
    }

    /// Applies an event received from the room.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RoomMismatch`] for another room's events,
    /// [`SyncError::NotJoined`] while detached and
    /// [`SyncError::SnapshotAfterJoin`] for a snapshot once synced.
    pub fn apply_event(&self, event: &BankEvent) -> Result<Self, SyncError> {
        if event.room_id() != self.room_id {
            log::warn!(
                "dropping bank event for room '{}' in room '{}'",
                event.room_id(),
                self.room_id
            );
            return Err(SyncError::RoomMismatch {
                expected: self.room_id.clone(),
                received: event.room_id().to_string(),
            });
        }
        let bank = match (self.phase, event) {
            (ReplicaPhase::Detached, _) => return Err(SyncError::NotJoined),
            (ReplicaPhase::Synced, BankEvent::Snapshot { .. }) => {
                log::warn!("ignoring bank snapshot after join in room '{}'", self.room_id);
                return Err(SyncError::SnapshotAfterJoin);
            }
            (ReplicaPhase::Joining, BankEvent::Snapshot { bank, .. }) => ClanBank {
                resources: bank.resources.widened(),
                last_updated: bank.last_updated,
            },
            (_, BankEvent::Delta { resource, delta, .. }) => {
                self.bank.apply_bank_delta(*resource, *delta)
            }
        };
        Ok(Self {
            room_id: self.room_id.clone(),
            phase: ReplicaPhase::Synced,
            bank,
        })
    }
}
