//! In-process collaborators: a key/value snapshot store, a room hub that
//! loops bank events back to every other participant, and a pinned clock.
//!
//! Built only with the `testing` feature.
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::bank::BankEvent;
use crate::{BankTransport, Clock, SnapshotStore};

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Raw stored text, for inspecting or corrupting saves in tests.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, text: impl Into<String>) {
        self.entries.borrow_mut().insert(key.to_string(), text.into());
    }
}

impl SnapshotStore for MemoryStore {
    type Error = Infallible;

    fn save(&self, key: &str, snapshot: &str) -> Result<(), Self::Error> {
        self.put_raw(key, snapshot);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.raw(key))
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Shared event log of every room; each participant reads it through a [`RoomLink`].
#[derive(Clone, Default)]
pub struct RoomHub {
    log: Rc<RefCell<Vec<(String, BankEvent)>>>,
}

impl RoomHub {
    #[must_use]
    pub fn connect(&self, participant: impl Into<String>) -> RoomLink {
        RoomLink {
            hub: self.clone(),
            participant: participant.into(),
            cursor: Rc::new(Cell::new(0)),
        }
    }

    #[must_use]
    pub fn broadcast_count(&self) -> usize {
        self.log.borrow().len()
    }
}

/// One participant's connection to a [`RoomHub`].
#[derive(Clone)]
pub struct RoomLink {
    hub: RoomHub,
    participant: String,
    cursor: Rc<Cell<usize>>,
}

impl RoomLink {
    #[must_use]
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Events sent by other participants since the last drain.
    #[must_use]
    pub fn drain(&self) -> Vec<BankEvent> {
        let log = self.hub.log.borrow();
        let start = self.cursor.get().min(log.len());
        self.cursor.set(log.len());
        log[start..]
            .iter()
            .filter(|(sender, _)| *sender != self.participant)
            .map(|(_, event)| event.clone())
            .collect()
    }
}

impl BankTransport for RoomLink {
    type Error = Infallible;

    fn broadcast(&self, event: &BankEvent) -> Result<(), Self::Error> {
        self.hub
            .log
            .borrow_mut()
            .push((self.participant.clone(), event.clone()));
        Ok(())
    }
}

/// Clock that always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
