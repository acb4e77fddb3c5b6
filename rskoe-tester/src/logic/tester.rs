use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::{ScenarioCtx, TestScenario};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub actions_applied: usize,
    pub actions_rejected: usize,
    pub events_delivered: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
}

/// Knobs applied to every scenario of one CLI invocation.
#[derive(Debug, Clone, Copy)]
pub struct RunPlan {
    pub iterations: usize,
    pub steps: usize,
    pub participants: usize,
}

pub struct LogicTester {
    verbose: bool,
}

impl LogicTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        plan: RunPlan,
    ) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.name.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed, plan)
            })
            .collect()
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        plan: RunPlan,
    ) -> ScenarioResult {
        let mut result = ScenarioResult {
            scenario_name: scenario.name.to_string(),
            seed,
            passed: false,
            iterations_run: plan.iterations,
            successful_iterations: 0,
            actions_applied: 0,
            actions_rejected: 0,
            events_delivered: 0,
            failures: Vec::new(),
            average_duration: Duration::ZERO,
            performance_data: Vec::new(),
        };

        for i in 0..plan.iterations {
            let ctx = ScenarioCtx {
                seed: seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX)),
                steps: plan.steps,
                participants: plan.participants,
                verbose: self.verbose,
            };
            let start_time = Instant::now();
            match (scenario.run)(&ctx) {
                Ok(summary) => {
                    result.performance_data.push(start_time.elapsed());
                    result.successful_iterations += 1;
                    result.actions_applied += summary.actions_applied;
                    result.actions_rejected += summary.actions_rejected;
                    result.events_delivered += summary.events_delivered;
                }
                Err(err) => {
                    log::debug!("{} failed on seed {}: {err:#}", scenario.name, ctx.seed);
                    if self.verbose {
                        println!(
                            "  ❌ Iteration {}/{} failed: {}",
                            i + 1,
                            plan.iterations,
                            format!("{err:#}").red()
                        );
                    }
                    result
                        .failures
                        .push(format!("Iteration {} (seed {}): {err:#}", i + 1, ctx.seed));
                }
            }
        }

        if !result.performance_data.is_empty() {
            result.average_duration = result.performance_data.iter().sum::<Duration>()
                / u32::try_from(result.performance_data.len()).unwrap_or(1);
        }
        result.passed = result.failures.is_empty();
        result
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
