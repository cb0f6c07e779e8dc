//! Human-readable run reports

use std::fmt::Write;
use std::time::Duration;

use colored::Colorize;
use hookgate_core::{CheckOutcome, CheckStatus, RunReport, SkipReason};

/// Lines of tool output shown per failure
const MAX_OUTPUT_LINES: usize = 40;

pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        render_outcome(&mut out, outcome);
    }
    out.push('\n');

    match report.clone().into_result() {
        Ok(_) => {
            let ran = report
                .outcomes
                .iter()
                .filter(|o| o.status == CheckStatus::Passed)
                .count();
            let _ = writeln!(
                out,
                "{} {} check(s) passed in {}",
                "OK".green().bold(),
                ran,
                seconds(report.duration)
            );
        }
        Err(e) => {
            let _ = writeln!(out, "{} {}", "FAILED".red().bold(), e);
        }
    }
    out
}

fn render_outcome(out: &mut String, outcome: &CheckOutcome) {
    let _ = match &outcome.status {
        CheckStatus::Passed => writeln!(
            out,
            "  {} {} {}",
            "\u{2713}".green().bold(),
            outcome.name,
            seconds(outcome.duration).dimmed()
        ),
        CheckStatus::Skipped(reason) => writeln!(
            out,
            "  {} {} {}",
            "-".dimmed(),
            outcome.name.dimmed(),
            match reason {
                SkipReason::NoMatchingFiles => "(no matching files)",
                SkipReason::FailFast => "(skipped after failure)",
            }
            .dimmed()
        ),
        CheckStatus::Failed(e) => {
            let _ = writeln!(
                out,
                "  {} {} {}",
                "\u{2717}".red().bold(),
                outcome.name.bold(),
                seconds(outcome.duration).dimmed()
            );
            let _ = writeln!(out, "    {} {}", "error:".red(), e);
            if let Some(tool) = e.tool() {
                let _ = writeln!(out, "    {} {}", "tool:".dimmed(), tool);
            }
            let _ = writeln!(out, "    {} {}", "hint:".cyan(), e.hint());
            render_output(out, e.output());
            Ok(())
        }
    };
}

fn render_output(out: &mut String, output: &str) {
    let lines: Vec<&str> = output.trim_end().lines().collect();
    if lines.is_empty() {
        return;
    }
    for line in lines.iter().take(MAX_OUTPUT_LINES) {
        let _ = writeln!(out, "      {}", line);
    }
    if lines.len() > MAX_OUTPUT_LINES {
        let _ = writeln!(
            out,
            "      {}",
            format!("... {} more line(s)", lines.len() - MAX_OUTPUT_LINES).dimmed()
        );
    }
}

fn seconds(duration: Duration) -> String {
    format!("({:.1}s)", duration.as_secs_f64())
}
