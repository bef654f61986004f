use serde::Serialize;
use std::{fmt, time::Duration};

use crate::check::CheckResult;

/// End-of-run report: per-check tallies plus iteration totals.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub vus: usize,
    pub iterations: u64,
    pub transport_errors: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
    pub checks: Vec<CheckResult>,
}

impl RunSummary {
    pub fn all_checks_passed(&self) -> bool {
        self.checks.iter().all(|c| c.fails == 0)
    }

    pub fn iteration_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }

    /// Process exit code: non-zero when any check failed.
    pub fn exit_code(&self) -> u8 {
        if self.all_checks_passed() {
            0
        } else {
            1
        }
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "scenario: {}", self.scenario)?;
        writeln!(f)?;
        for check in &self.checks {
            if check.fails == 0 {
                writeln!(f, "  ✓ {}", check.name)?;
            } else {
                writeln!(f, "  ✗ {}", check.name)?;
                writeln!(
                    f,
                    "   ↳ {:.0}% — ✓ {} / ✗ {}",
                    check.pass_rate() * 100.0,
                    check.passes,
                    check.fails
                )?;
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "  iterations.......: {} ({:.2}/s)",
            self.iterations,
            self.iteration_rate()
        )?;
        writeln!(f, "  transport errors.: {}", self.transport_errors)?;
        writeln!(f, "  vus..............: {}", self.vus)?;
        write!(f, "  elapsed..........: {:.1}s", self.elapsed.as_secs_f64())
    }
}
