mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::scenario::{get_scenario, list_scenarios};
use common::split_csv;
use logic::{LogicTester, RunPlan, ScenarioResult, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "rskoe-tester", version = "0.1.0")]
#[command(about = "Scenario and invariant QA runner for the Kingdoms character sheet rules")]
struct Args {
    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Intents or bank deltas generated per randomized iteration
    #[arg(long, default_value_t = 200)]
    steps: usize,

    /// Participants in the room simulation
    #[arg(long, default_value_t = 3)]
    participants: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let results = run_logic_scenarios(&args, &scenarios, &seeds);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🛡️  Kingdoms Sheet Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (name, _) in list_scenarios() {
            if name != "smoke" && !scenarios.iter().any(|s| s == name) {
                scenarios.push(name.to_string());
            }
        }
    }
    scenarios
}

fn run_logic_scenarios(args: &Args, scenarios: &[String], seeds: &[u64]) -> Vec<ScenarioResult> {
    println!("{}", "🧠 Running Rule Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let tester = LogicTester::new(args.verbose);
    let plan = RunPlan {
        iterations: args.iterations,
        steps: args.steps,
        participants: args.participants,
    };
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(tester.run_scenario(&scenario, seeds, plan));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Kingdoms Sheet Rule Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report == "console" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            steps: 30,
            participants: 2,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rskoe-tester-{label}-{}", std::process::id()))
    }

    fn sample_result(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "smoke".to_string(),
            seed: 1337,
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            actions_applied: 9,
            actions_rejected: 1,
            events_delivered: 0,
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            average_duration: Duration::from_millis(1),
            performance_data: vec![Duration::from_millis(1)],
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all,smoke");
        assert_eq!(expanded[0], "smoke");
        assert!(expanded.contains(&"room-sync".to_string()));
        assert!(expanded.contains(&"random-walk".to_string()));
        assert_eq!(expanded.iter().filter(|s| *s == "smoke").count(), 1);
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("room-sync,smoke");
        assert_eq!(expanded, vec!["room-sync".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn run_logic_scenarios_skips_unknown_names() {
        let args = base_args();
        let results = run_logic_scenarios(
            &args,
            &["smoke".to_string(), "not-a-scenario".to_string()],
            &[1, 2],
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_file("list.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("room-sync"));
    }

    #[test]
    fn maybe_list_scenarios_returns_false_when_disabled() {
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_empty_json() {
        let temp = temp_file("empty.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn write_reports_emits_markdown_report() {
        let temp = temp_file("report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("# Kingdoms Sheet Rule Results"));
        assert!(content.contains("- failure"));
    }

    #[test]
    fn write_reports_console_adds_total_time() {
        let temp = temp_file("console.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
