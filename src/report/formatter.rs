// SPDX-License-Identifier: PMPL-1.0-or-later

//! Console rendering of plans

use crate::report::PlanReport;
use crate::types::{Consequence, Exploit};
use colored::*;

pub struct PlanFormatter;

impl PlanFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &PlanReport) {
        println!("\n{}", "=== ACE EXPLOIT PLAN ===".bold().cyan());
        println!();
        println!("  Scenario: {}", report.scenario);
        println!("  Goal: {}", report.goal.to_string().bold());
        println!();

        if report.is_empty() {
            println!("{}", "Goal holds without any attack".green());
        } else {
            println!("{}", "ATTACK SEQUENCE".bold().yellow());
            for (i, exploit) in report.exploits.iter().enumerate() {
                println!(
                    "  {}. {} -> {}{}",
                    i + 1,
                    exploit.name.bold(),
                    exploit.consequence.to_string().color(consequence_color(exploit.consequence)),
                    requirement_suffix(exploit).dimmed()
                );
            }
        }
        println!();

        println!("{}", "SEARCH".bold().yellow());
        println!("  Restarts: {}", report.restarts);
        println!("  Key sub-goals: {}", report.subgoals);
        println!("  Elapsed: {:.3} ms", report.elapsed_ms);
        println!("  Fingerprint: {}", report.fingerprint.dimmed());
        println!();
    }

    /// Same layout as `print`, without colour
    pub fn render_plain(&self, report: &PlanReport) -> String {
        let mut lines = Vec::new();
        lines.push("=== ACE EXPLOIT PLAN ===".to_string());
        lines.push(format!("scenario: {}", report.scenario));
        lines.push(format!("goal: {}", report.goal));
        if report.is_empty() {
            lines.push("goal holds without any attack".to_string());
        }
        for (i, exploit) in report.exploits.iter().enumerate() {
            lines.push(format!(
                "{}. {} -> {}{}",
                i + 1,
                exploit.name,
                exploit.consequence,
                requirement_suffix(exploit)
            ));
        }
        lines.push(format!(
            "restarts: {}, key sub-goals: {}, elapsed: {:.3} ms",
            report.restarts, report.subgoals, report.elapsed_ms
        ));
        lines.push(format!("fingerprint: {}", report.fingerprint));
        lines.push(format!("generated at: {}", report.generated_at));
        lines.push(String::new());
        lines.join("\n")
    }
}

impl Default for PlanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn requirement_suffix(exploit: &Exploit) -> String {
    if exploit.requirements.is_empty() {
        return String::new();
    }
    let needs: Vec<String> = exploit.requirements.iter().map(|r| r.to_string()).collect();
    format!(" (needs {})", needs.join(", "))
}

fn consequence_color(consequence: Consequence) -> &'static str {
    match consequence {
        Consequence::KeyRecovery | Consequence::StateRecovery => "red",
        Consequence::PlaintextRecovery => "yellow",
        Consequence::Forgery | Consequence::IntegrityBypass => "magenta",
        Consequence::PlaintextManipulation | Consequence::Collision => "blue",
    }
}
