//! Error kinds surfaced by sheet and bank transitions.
use thiserror::Error;

use crate::resources::ResourceId;
use crate::skills::SkillId;
use crate::tokens::PrayerSlot;

/// Rejections raised by the transition operations.
///
/// A rejected operation never leaves a partially updated snapshot behind: the
/// caller keeps the snapshot it passed in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("unknown skill id '{id}'")]
    InvalidSkillId { id: String },
    #[error("unknown resource id '{id}'")]
    InvalidResourceId { id: String },
    #[error("{field} cannot be set below zero (got {value})")]
    NegativeValue { field: &'static str, value: i64 },
    #[error("{field} cannot exceed {max} (got {value})")]
    ValueTooLarge {
        field: &'static str,
        value: i64,
        max: u32,
    },
    #[error("prayer {slot} is locked")]
    SlotLocked { slot: PrayerSlot },
    #[error("not enough {resource} to move (have {available})")]
    InsufficientQuantity {
        resource: ResourceId,
        available: u32,
    },
    #[error("{resource} is not tracked by this pool")]
    UntrackedResource { resource: ResourceId },
    #[error("skill ledger is missing {missing:?}")]
    IncompleteSkillLedger { missing: Vec<SkillId> },
    #[error("resource pool does not match a known resource set")]
    IncompleteResourcePool,
}

/// Rejections raised while replaying clan-bank events for a room.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("event for room '{received}' delivered to room '{expected}'")]
    RoomMismatch { expected: String, received: String },
    #[error("full bank snapshots are only accepted while joining")]
    SnapshotAfterJoin,
    #[error("bank deltas cannot be applied before the room is joined")]
    NotJoined,
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Converts a signed count into a stored one, rejecting values outside `u32`.
pub(crate) fn non_negative(field: &'static str, value: i64) -> Result<u32, SheetError> {
    if value < 0 {
        return Err(SheetError::NegativeValue { field, value });
    }
    u32::try_from(value).map_err(|_| SheetError::ValueTooLarge {
        field,
        value,
        max: u32::MAX,
    })
}

/// Adds a signed delta to a count, flooring at zero and saturating at `u32::MAX`.
///
/// Relative changes never fail; absolute sets go through [`non_negative`].
pub(crate) fn clamped_add(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta).max(0);
    u32::try_from(next).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_rejects_below_zero() {
        assert_eq!(non_negative("gold", 4), Ok(4));
        assert_eq!(
            non_negative("gold", -1),
            Err(SheetError::NegativeValue {
                field: "gold",
                value: -1
            })
        );
    }

    #[test]
    fn non_negative_rejects_values_past_u32() {
        assert_eq!(non_negative("gp", i64::from(u32::MAX)), Ok(u32::MAX));
        assert_eq!(
            non_negative("gp", 5_000_000_000),
            Err(SheetError::ValueTooLarge {
                field: "gp",
                value: 5_000_000_000,
                max: u32::MAX
            })
        );
    }

    #[test]
    fn clamped_add_floors_and_saturates() {
        assert_eq!(clamped_add(2, -5), 0);
        assert_eq!(clamped_add(2, 3), 5);
        assert_eq!(clamped_add(u32::MAX, 10), u32::MAX);
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = SheetError::NegativeValue {
            field: "deathTally",
            value: -3,
        };
        assert_eq!(err.to_string(), "deathTally cannot be set below zero (got -3)");
        let err = SheetError::InsufficientQuantity {
            resource: ResourceId::Wood,
            available: 0,
        };
        assert_eq!(err.to_string(), "not enough wood to move (have 0)");
    }
}
