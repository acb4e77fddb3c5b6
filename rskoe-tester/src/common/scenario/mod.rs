use anyhow::Result;

pub mod rules;
pub mod room;
pub mod walk;

/// Knobs shared by every scenario run.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioCtx {
    pub seed: u64,
    pub steps: usize,
    pub participants: usize,
    pub verbose: bool,
}

impl Default for ScenarioCtx {
    fn default() -> Self {
        Self {
            seed: 1337,
            steps: 200,
            participants: 3,
            verbose: false,
        }
    }
}

/// What a passing run observed, for verbose output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub actions_applied: usize,
    pub actions_rejected: usize,
    pub events_delivered: usize,
}

pub type ScenarioFn = fn(&ScenarioCtx) -> Result<RunSummary>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

const CATALOG: &[TestScenario] = &[
    TestScenario {
        name: "smoke",
        description: "Every fixed rule scenario in one pass",
        run: rules::smoke,
    },
    TestScenario {
        name: "cooking-level",
        description: "New character levels cooking after two more XP",
        run: rules::cooking_level,
    },
    TestScenario {
        name: "prayer-cycle",
        description: "Prayer slot unlocks, activates and is forgotten on level loss",
        run: rules::prayer_cycle,
    },
    TestScenario {
        name: "summoning-grant",
        description: "Summoning tokens auto-grant on level up and trim on level down",
        run: rules::summoning_grant,
    },
    TestScenario {
        name: "empty-transfer",
        description: "Depositing a resource the character lacks is rejected atomically",
        run: rules::empty_transfer,
    },
    TestScenario {
        name: "coin-cape",
        description: "The coin objective stays earned after spending",
        run: rules::coin_cape,
    },
    TestScenario {
        name: "random-walk",
        description: "Seeded random intents keep every derived field consistent",
        run: walk::random_walk,
    },
    TestScenario {
        name: "transfer-conservation",
        description: "Seeded deposits and withdrawals conserve combined counts",
        run: walk::transfer_conservation,
    },
    TestScenario {
        name: "room-sync",
        description: "Participants of one room converge on the same clan bank",
        run: room::room_sync,
    },
];

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    CATALOG
        .iter()
        .find(|scenario| scenario.name.eq_ignore_ascii_case(name.trim()))
        .copied()
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.name, scenario.description))
        .collect()
}
