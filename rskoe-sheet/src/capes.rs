//! Cape objectives: permanent achievement flags.
use serde::{Deserialize, Serialize};

use crate::constants::{
    CAPE_ANY_SKILL_LEVEL, CAPE_BROAD_SKILL_COUNT, CAPE_BROAD_SKILL_LEVEL, CAPE_COIN_TARGET,
    CAPE_SIDE_QUEST_TARGET,
};
use crate::resources::ResourcePool;
use crate::skills::SkillLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapeObjective {
    Level8InAnySkill,
    Level3InEightSkills,
    Have15Coins,
    OneOfEachResource,
    Complete4SideQuests,
}

impl CapeObjective {
    pub const ALL: [Self; 5] = [
        Self::Level8InAnySkill,
        Self::Level3InEightSkills,
        Self::Have15Coins,
        Self::OneOfEachResource,
        Self::Complete4SideQuests,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level8InAnySkill => "level8InAnySkill",
            Self::Level3InEightSkills => "level3InEightSkills",
            Self::Have15Coins => "have15Coins",
            Self::OneOfEachResource => "oneOfEachResource",
            Self::Complete4SideQuests => "complete4SideQuests",
        }
    }
}

/// Flags in the shape the sheet stores them.
///
/// Evaluation only ever ORs a freshly computed condition into the stored
/// flag, so an earned objective stays earned even after the condition lapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CapeObjectives {
    pub level8_in_any_skill: bool,
    pub level3_in_eight_skills: bool,
    pub have15_coins: bool,
    pub one_of_each_resource: bool,
    pub complete4_side_quests: bool,
}

/// Inputs the evaluator reads from a sheet.
#[derive(Debug, Clone, Copy)]
pub struct CapeProgress<'a> {
    pub skills: &'a SkillLedger,
    pub gold: u32,
    pub resources: &'a ResourcePool,
    pub side_quests: u32,
}

impl CapeProgress<'_> {
    fn meets(&self, objective: CapeObjective) -> bool {
        match objective {
            CapeObjective::Level8InAnySkill => self
                .skills
                .levels()
                .any(|(_, level)| level >= CAPE_ANY_SKILL_LEVEL),
            CapeObjective::Level3InEightSkills => {
                self.skills
                    .levels()
                    .filter(|(_, level)| *level >= CAPE_BROAD_SKILL_LEVEL)
                    .count()
                    >= CAPE_BROAD_SKILL_COUNT
            }
            CapeObjective::Have15Coins => self.gold >= CAPE_COIN_TARGET,
            CapeObjective::OneOfEachResource => self
                .resources
                .iter()
                .filter(|(resource, _)| !resource.is_cape_exempt())
                .all(|(_, count)| count >= 1),
            CapeObjective::Complete4SideQuests => self.side_quests >= CAPE_SIDE_QUEST_TARGET,
        }
    }
}

impl CapeObjectives {
    #[must_use]
    pub const fn is_earned(&self, objective: CapeObjective) -> bool {
        match objective {
            CapeObjective::Level8InAnySkill => self.level8_in_any_skill,
            CapeObjective::Level3InEightSkills => self.level3_in_eight_skills,
            CapeObjective::Have15Coins => self.have15_coins,
            CapeObjective::OneOfEachResource => self.one_of_each_resource,
            CapeObjective::Complete4SideQuests => self.complete4_side_quests,
        }
    }

    const fn with_earned(mut self, objective: CapeObjective) -> Self {
        match objective {
            CapeObjective::Level8InAnySkill => self.level8_in_any_skill = true,
            CapeObjective::Level3InEightSkills => self.level3_in_eight_skills = true,
            CapeObjective::Have15Coins => self.have15_coins = true,
            CapeObjective::OneOfEachResource => self.one_of_each_resource = true,
            CapeObjective::Complete4SideQuests => self.complete4_side_quests = true,
        }
        self
    }

    #[must_use]
    pub fn earned_count(&self) -> usize {
        CapeObjective::ALL
            .iter()
            .filter(|objective| self.is_earned(**objective))
            .count()
    }

    /// Ors every objective's current condition into the stored flags.
    #[must_use]
    pub fn evaluate(self, progress: &CapeProgress<'_>) -> Self {
        CapeObjective::ALL.iter().fold(self, |flags, objective| {
            if flags.is_earned(*objective) || !progress.meets(*objective) {
                return flags;
            }
            log::debug!("cape objective earned: {}", objective.as_str());
            flags.with_earned(*objective)
        })
    }

    /// Flags set in `self` but cleared in `next`; always empty for evaluator output.
    #[must_use]
    pub fn regressions(&self, next: &Self) -> Vec<CapeObjective> {
        CapeObjective::ALL
            .iter()
            .copied()
            .filter(|objective| self.is_earned(*objective) && !next.is_earned(*objective))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ResourceId, ResourceSet};
    use crate::skills::SkillId;

    fn progress<'a>(
        skills: &'a SkillLedger,
        gold: u32,
        resources: &'a ResourcePool,
        side_quests: u32,
    ) -> CapeProgress<'a> {
        CapeProgress {
            skills,
            gold,
            resources,
            side_quests,
        }
    }

    #[test]
    fn coins_flag_survives_spending() {
        let skills = SkillLedger::default();
        let pool = ResourcePool::default();
        let flags = CapeObjectives::default().evaluate(&progress(&skills, 15, &pool, 0));
        assert!(flags.have15_coins);
        let flags = flags.evaluate(&progress(&skills, 0, &pool, 0));
        assert!(flags.have15_coins);
    }

    #[test]
    fn broad_skill_objective_needs_eight_skills() {
        let mut skills = SkillLedger::zeroed();
        for skill in SkillId::ALL.iter().take(7) {
            skills = skills.set_xp(*skill, 9).unwrap();
        }
        let pool = ResourcePool::default();
        let flags = CapeObjectives::default().evaluate(&progress(&skills, 0, &pool, 0));
        assert!(!flags.level3_in_eight_skills);

        let skills = skills.set_xp(SkillId::ALL[7], 9).unwrap();
        let flags = flags.evaluate(&progress(&skills, 0, &pool, 0));
        assert!(flags.level3_in_eight_skills);
        assert!(!flags.level8_in_any_skill);
    }

    #[test]
    fn one_of_each_ignores_prepared_goods() {
        let skills = SkillLedger::default();
        let pool = ResourceId::STANDARD
            .iter()
            .fold(ResourcePool::empty(ResourceSet::Extended), |pool, resource| {
                pool.set_count(*resource, 1).unwrap()
            });
        assert_eq!(pool.count(ResourceId::Lobster), 0);
        let flags = CapeObjectives::default().evaluate(&progress(&skills, 0, &pool, 0));
        assert!(flags.one_of_each_resource);

        let pool = pool.set_count(ResourceId::Fruit, 0).unwrap();
        let fresh = CapeObjectives::default().evaluate(&progress(&skills, 0, &pool, 0));
        assert!(!fresh.one_of_each_resource);
    }

    #[test]
    fn level_eight_and_side_quests() {
        let skills = SkillLedger::zeroed().set_xp(SkillId::Thieving, 24).unwrap();
        let pool = ResourcePool::default();
        let flags = CapeObjectives::default().evaluate(&progress(&skills, 0, &pool, 4));
        assert!(flags.level8_in_any_skill);
        assert!(flags.complete4_side_quests);
        assert_eq!(flags.earned_count(), 2);
        assert!(flags.regressions(&flags.evaluate(&progress(&skills, 0, &pool, 0))).is_empty());
    }

    #[test]
    fn serializes_with_stored_flag_names() {
        let json = serde_json::to_value(CapeObjectives {
            have15_coins: true,
            ..CapeObjectives::default()
        })
        .unwrap();
        assert_eq!(json["have15Coins"], true);
        assert_eq!(json["level8InAnySkill"], false);
        assert_eq!(json["oneOfEachResource"], false);
        assert_eq!(json["complete4SideQuests"], false);
        assert_eq!(json["level3InEightSkills"], false);
    }
}
