//! Resource pools and the unit transfer between them.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{SheetError, clamped_add, non_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceId {
    Fish,
    Wood,
    Meat,
    Stone,
    Herb,
    Leather,
    Vegetable,
    Thread,
    Egg,
    Metal,
    Flour,
    Fruit,
    Lobster,
    Ration,
}

impl ResourceId {
    /// The twelve resources foraged on the board, in sheet order.
    pub const STANDARD: [Self; 12] = [
        Self::Fish,
        Self::Wood,
        Self::Meat,
        Self::Stone,
        Self::Herb,
        Self::Leather,
        Self::Vegetable,
        Self::Thread,
        Self::Egg,
        Self::Metal,
        Self::Flour,
        Self::Fruit,
    ];

    /// Cooked goods that only exist in the extended set.
    pub const PREPARED: [Self; 2] = [Self::Lobster, Self::Ration];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fish => "fish",
            Self::Wood => "wood",
            Self::Meat => "meat",
            Self::Stone => "stone",
            Self::Herb => "herb",
            Self::Leather => "leather",
            Self::Vegetable => "vegetable",
            Self::Thread => "thread",
            Self::Egg => "egg",
            Self::Metal => "metal",
            Self::Flour => "flour",
            Self::Fruit => "fruit",
            Self::Lobster => "lobster",
            Self::Ration => "ration",
        }
    }

    /// Whether the "one of each resource" objective ignores this resource.
    #[must_use]
    pub const fn is_cape_exempt(self) -> bool {
        matches!(self, Self::Lobster | Self::Ration)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceId {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceSet::Extended
            .members()
            .find(|resource| resource.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SheetError::InvalidResourceId { id: s.to_string() })
    }
}

/// Which resources a pool tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSet {
    #[default]
    Standard,
    Extended,
}

impl ResourceSet {
    pub fn members(self) -> impl Iterator<Item = ResourceId> {
        let prepared: &'static [ResourceId] = match self {
            Self::Standard => &[],
            Self::Extended => &ResourceId::PREPARED,
        };
        ResourceId::STANDARD.into_iter().chain(prepared.iter().copied())
    }

    #[must_use]
    pub fn contains(self, resource: ResourceId) -> bool {
        matches!(self, Self::Extended) || !resource.is_cape_exempt()
    }
}

/// Non-negative counts for every resource of one [`ResourceSet`].
///
/// Character pools and the clan bank share this shape; each owner keeps its
/// own pool with its own persistence lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<ResourceId, u32>", into = "BTreeMap<ResourceId, u32>")]
pub struct ResourcePool {
    set: ResourceSet,
    counts: BTreeMap<ResourceId, u32>,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::empty(ResourceSet::Standard)
    }
}

impl ResourcePool {
    #[must_use]
    pub fn empty(set: ResourceSet) -> Self {
        Self {
            set,
            counts: set.members().map(|resource| (resource, 0)).collect(),
        }
    }

    #[must_use]
    pub const fn set(&self) -> ResourceSet {
        self.set
    }

    /// Count held, or zero for a resource outside this pool's set.
    #[must_use]
    pub fn count(&self, resource: ResourceId) -> u32 {
        self.counts.get(&resource).copied().unwrap_or_default()
    }

    /// Resources and counts in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, u32)> + '_ {
        self.set.members().map(|resource| (resource, self.count(resource)))
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    fn ensure_tracked(&self, resource: ResourceId) -> Result<(), SheetError> {
        if self.set.contains(resource) {
            Ok(())
        } else {
            Err(SheetError::UntrackedResource { resource })
        }
    }

    pub(crate) fn with_count(&self, resource: ResourceId, count: u32) -> Self {
        let mut next = self.clone();
        next.counts.insert(resource, count);
        next
    }

    /// Same counts, tracking the extended set.
    #[must_use]
    pub fn widened(&self) -> Self {
        let mut counts = self.counts.clone();
        for resource in ResourceId::PREPARED {
            counts.entry(resource).or_insert(0);
        }
        Self {
            set: ResourceSet::Extended,
            counts,
        }
    }

    /// Direct set of one count.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::NegativeValue`] for negative values,
    /// [`SheetError::ValueTooLarge`] past `u32::MAX` and
    /// [`SheetError::UntrackedResource`] for resources outside the pool's set.
    pub fn set_count(&self, resource: ResourceId, value: i64) -> Result<Self, SheetError> {
        self.ensure_tracked(resource)?;
        let count = non_negative(resource.as_str(), value)?;
        Ok(self.with_count(resource, count))
    }

    /// Relative change of one count, flooring at zero.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::UntrackedResource`] for resources outside the pool's set.
    pub fn adjust(&self, resource: ResourceId, delta: i64) -> Result<Self, SheetError> {
        self.ensure_tracked(resource)?;
        Ok(self.with_count(resource, clamped_add(self.count(resource), delta)))
    }
}

impl TryFrom<BTreeMap<ResourceId, u32>> for ResourcePool {
    type Error = SheetError;

    fn try_from(counts: BTreeMap<ResourceId, u32>) -> Result<Self, Self::Error> {
        [ResourceSet::Standard, ResourceSet::Extended]
            .into_iter()
            .find(|set| {
                set.members().count() == counts.len()
                    && set.members().all(|resource| counts.contains_key(&resource))
            })
            .map(|set| Self { set, counts })
            .ok_or(SheetError::IncompleteResourcePool)
    }
}

impl From<ResourcePool> for BTreeMap<ResourceId, u32> {
    fn from(pool: ResourcePool) -> Self {
        pool.counts
    }
}

/// Set one count in a pool.
///
/// # Errors
///
/// See [`ResourcePool::set_count`].
pub fn set_resource_count(
    pool: &ResourcePool,
    resource: ResourceId,
    value: i64,
) -> Result<ResourcePool, SheetError> {
    pool.set_count(resource, value)
}

/// Moves exactly one unit of `resource` from `source` to `dest`.
///
/// Both pools change together or the call fails and neither changes, so the
/// combined count of `resource` is conserved.
///
/// # Errors
///
/// Returns [`SheetError::InsufficientQuantity`] when `source` holds none, and
/// [`SheetError::UntrackedResource`] when either pool does not track `resource`.
pub fn move_one_unit(
    source: &ResourcePool,
    dest: &ResourcePool,
    resource: ResourceId,
) -> Result<(ResourcePool, ResourcePool), SheetError> {
    source.ensure_tracked(resource)?;
    dest.ensure_tracked(resource)?;
    let available = source.count(resource);
    if available == 0 {
        return Err(SheetError::InsufficientQuantity {
            resource,
            available,
        });
    }
    let received = dest.count(resource).saturating_add(1);
    Ok((
        source.with_count(resource, available - 1),
        dest.with_count(resource, received),
    ))
}
