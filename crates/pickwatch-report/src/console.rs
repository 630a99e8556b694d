//! Human-readable report rendering.
//!
//! One colored line per check plus a box summary per suite. Color is
//! dropped when stdout is not a terminal or `NO_COLOR` is set.

use std::io::IsTerminal;

use pickwatch_core::types::{CheckOutcome, CheckStatus, SuiteReport};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn enabled(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

fn paint(status: CheckStatus, color: bool) -> String {
    if !color {
        return status.label().to_string();
    }
    let code = match status {
        CheckStatus::Pass => GREEN,
        CheckStatus::Fail => RED,
        CheckStatus::Warn => YELLOW,
        CheckStatus::Skip => DIM,
    };
    format!("{code}{}{RESET}", status.label())
}

fn render_line(outcome: &CheckOutcome, color: bool) -> String {
    let mut line = format!("[{}] {} — {}", paint(outcome.status, color), outcome.name, outcome.detail);
    if let Some(endpoint) = &outcome.endpoint {
        line.push_str(&format!("  ({endpoint})"));
    }
    line
}

/// Full report: one line per outcome, then the summary block.
pub fn render_report(report: &SuiteReport, mode: ColorMode) -> String {
    let color = mode.enabled();
    let mut out = String::new();

    for outcome in &report.outcomes {
        out.push_str(&render_line(outcome, color));
        out.push('\n');
    }
    out.push_str(&render_summary(report));
    out
}

/// The summary box alone.
pub fn render_summary(report: &SuiteReport) -> String {
    let verdict = if report.is_green() { "GREEN" } else { "RED" };
    let elapsed = report.finished_at.saturating_sub(report.started_at);
    let mut out = String::new();

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str(&format!("║  Suite:    {:<29} ║\n", report.suite));
    out.push_str(&format!("║  Verdict:  {:<29} ║\n", verdict));
    out.push_str(&format!(
        "║  Checks:   {:<29} ║\n",
        format!(
            "{} pass / {} fail / {} warn / {} skip",
            report.passed(),
            report.failed(),
            report.warned(),
            report.skipped()
        )
    ));
    out.push_str(&format!("║  Elapsed:  {:<29} ║\n", format!("{elapsed}s")));
    out.push_str("╚══════════════════════════════════════════╝\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> SuiteReport {
        let mut report = SuiteReport::new("health");
        report.push(CheckOutcome::pass("status_ok", "status == \"ok\""));
        report.push(
            CheckOutcome::fail("version_present", "missing field: version")
                .with_endpoint("/health"),
        );
        report
    }

    #[test]
    fn lines_carry_status_and_endpoint() {
        let rendered = render_report(&sample_report(), ColorMode::Never);
        assert!(rendered.contains("[PASS] status_ok"));
        assert!(rendered.contains("[FAIL] version_present"));
        assert!(rendered.contains("(/health)"));
    }

    #[test]
    fn no_ansi_when_disabled() {
        let rendered = render_report(&sample_report(), ColorMode::Never);
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn ansi_when_forced() {
        let rendered = render_report(&sample_report(), ColorMode::Always);
        assert!(rendered.contains(GREEN));
        assert!(rendered.contains(RED));
    }

    #[test]
    fn summary_counts_and_verdict() {
        let summary = render_summary(&sample_report());
        assert!(summary.contains("RED"));
        assert!(summary.contains("1 pass / 1 fail / 0 warn / 0 skip"));
    }

    #[test]
    fn green_verdict_without_failures() {
        let mut report = SuiteReport::new("drift");
        report.push(CheckOutcome::pass("forbidden.localhost", "no occurrences"));
        assert!(render_summary(&report).contains("GREEN"));
    }
}
