//! Named boolean checks with pass/fail tallies shared across virtual users.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Aggregated outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckResult {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passes: 0,
            fails: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }

    pub fn pass_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.passes as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    results: Arc<Mutex<Vec<CheckResult>>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `passed` under `name` and hands it back unchanged.
    pub fn check(&self, name: &str, passed: bool) -> bool {
        let mut results = self.results.lock();
        let idx = match results.iter().position(|r| r.name == name) {
            Some(idx) => idx,
            None => {
                results.push(CheckResult::new(name));
                results.len() - 1
            }
        };
        let entry = &mut results[idx];
        if passed {
            entry.passes += 1;
        } else {
            entry.fails += 1;
        }
        passed
    }

    /// Snapshot in first-recorded order.
    pub fn results(&self) -> Vec<CheckResult> {
        self.results.lock().clone()
    }

    pub fn all_passed(&self) -> bool {
        self.results.lock().iter().all(|r| r.fails == 0)
    }
}
