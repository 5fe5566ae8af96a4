// SPDX-License-Identifier: PMPL-1.0-or-later

//! Plan reports

pub mod formatter;
pub mod output;

use crate::solver::SolveReport;
use crate::types::{Consequence, Exploit};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub use formatter::PlanFormatter;
pub use output::PlanOutputFormat;

/// Everything a planning run produced, ready to print or export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub scenario: String,
    pub goal: Consequence,
    pub exploits: Vec<Exploit>,
    pub restarts: usize,
    pub subgoals: usize,
    pub elapsed_ms: f64,
    /// sha256 over the serialized exploit sequence; stable across runs
    pub fingerprint: String,
    pub generated_at: String,
}

impl PlanReport {
    pub fn new(scenario: &str, goal: Consequence, solved: SolveReport) -> Self {
        let fingerprint = fingerprint(&solved.exploits);
        Self {
            scenario: scenario.to_string(),
            goal,
            exploits: solved.exploits,
            restarts: solved.restarts,
            subgoals: solved.subgoals,
            elapsed_ms: solved.elapsed.as_secs_f64() * 1000.0,
            fingerprint,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exploits.is_empty()
    }
}

pub fn fingerprint(exploits: &[Exploit]) -> String {
    let mut hasher = Sha256::new();
    for exploit in exploits {
        hasher.update(exploit.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(exploit.consequence.as_str().as_bytes());
        hasher.update([0u8]);
        for requirement in &exploit.requirements {
            hasher.update(requirement.to_string().as_bytes());
            hasher.update([1u8]);
        }
        hasher.update([0xffu8]);
    }
    hex::encode(hasher.finalize())
}

/// Write the report in `format`, creating parent directories as needed
pub fn save_report<P: AsRef<Path>>(report: &PlanReport, path: P, format: PlanOutputFormat) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let content = format.serialize(report)?;
    fs::write(path, content).with_context(|| format!("writing report {}", path.display()))?;
    Ok(())
}

pub fn print_report(report: &PlanReport) {
    PlanFormatter::new().print(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn solved(exploits: Vec<Exploit>) -> SolveReport {
        SolveReport {
            exploits,
            restarts: 0,
            subgoals: 0,
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_fingerprint_depends_on_order() {
        let a = Exploit::new("a", Consequence::PlaintextRecovery);
        let b = Exploit::new("b", Consequence::IntegrityBypass);
        assert_eq!(
            fingerprint(&[a.clone(), b.clone()]),
            fingerprint(&[a.clone(), b.clone()])
        );
        assert_ne!(fingerprint(&[a.clone(), b.clone()]), fingerprint(&[b, a]));
    }

    #[test]
    fn test_report_carries_solver_counters() {
        let report = PlanReport::new(
            "demo",
            Consequence::PlaintextRecovery,
            solved(vec![Exploit::new("a", Consequence::PlaintextRecovery)]),
        );
        assert_eq!(report.scenario, "demo");
        assert_eq!(report.fingerprint.len(), 64);
        assert!(!report.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
    }

    #[test]
    fn test_save_report_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("plan.json");
        let report = PlanReport::new("demo", Consequence::Forgery, solved(Vec::new()));
        save_report(&report, &path, PlanOutputFormat::Json).unwrap();

        let loaded: PlanReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.goal, Consequence::Forgery);
        assert!(loaded.is_empty());
    }
}
