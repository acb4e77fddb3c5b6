use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Sheet Rule Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total_tests}")?;
    writeln!(out, "Passed: {}", passed_tests.to_string().green())?;
    writeln!(out, "Failed: {}", (total_tests - passed_tests).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(
            out,
            "   Actions: {} applied, {} rejected | Bank events delivered: {}",
            result.actions_applied, result.actions_rejected, result.events_delivered
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }

    let fastest = results.iter().min_by_key(|r| r.average_duration);
    let slowest = results.iter().max_by_key(|r| r.average_duration);
    if let (Some(fastest), Some(slowest)) = (fastest, slowest) {
        writeln!(out, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        writeln!(
            out,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            out,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Kingdoms Sheet Rule Results\n")?;

    let total_tests = results.len();
    let passed_tests = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total_tests}")?;
    writeln!(out, "- **Passed**: {passed_tests}")?;
    writeln!(out, "- **Failed**: {}", total_tests - passed_tests)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Scenario | Seed | Result | Iterations | Applied | Rejected |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {}/{} | {} | {} |",
            result.scenario_name,
            result.seed,
            status,
            result.successful_iterations,
            result.iterations_run,
            result.actions_applied,
            result.actions_rejected
        )?;
    }

    let failing: Vec<_> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {} (seed {})\n", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: "room-sync".to_string(),
            seed: 7,
            passed,
            iterations_run: 2,
            successful_iterations: if passed { 2 } else { 1 },
            actions_applied: 40,
            actions_rejected: 0,
            events_delivered: 12,
            failures: if passed {
                Vec::new()
            } else {
                vec!["p2 diverged from p0".to_string()]
            },
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn markdown_lists_failures() {
        let text = render(|out| generate_markdown_report(out, &[sample(true), sample(false)]));
        assert!(text.contains("# Kingdoms Sheet Rule Results"));
        assert!(text.contains("| room-sync | 7 | ✅ | 2/2 | 40 | 0 |"));
        assert!(text.contains("- p2 diverged from p0"));
        assert!(text.contains("50.0%"));
    }

    #[test]
    fn console_reports_totals() {
        colored::control::set_override(false);
        let text = render(|out| {
            generate_console_report(out, &[sample(true)], Duration::from_millis(5))
        });
        assert!(text.contains("Total runs: 1"));
        assert!(text.contains("Bank events delivered: 12"));
        assert!(text.contains("Fastest: room-sync"));
    }

    #[test]
    fn json_is_an_array() {
        let text = render(|out| generate_json_report(out, &[sample(true)]));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["scenario_name"], "room-sync");
    }
}
