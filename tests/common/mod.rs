//! Common test utilities for integration tests
//!
//! Provides shared fixtures, a scripted case runner and sweep settings used
//! across multiple integration test files.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use meshsweep::domain::errors::{CaseError, CaseResult};
use meshsweep::domain::models::{AxisSpec, Coefficients, ResultRecord};
use meshsweep::domain::ports::{CaseContext, CaseRunner};
use meshsweep::services::SweepSettings;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Lift every stub case reports before any offset.
pub const STUB_LIFT: f64 = 0.42;

/// Coefficients the stub runner reports.
pub fn stub_coefficients(offset: f64) -> Coefficients {
    Coefficients {
        lift: STUB_LIFT + offset,
        drag: 0.03,
        moment: -0.08,
        efficiency: (STUB_LIFT + offset) / 0.03,
    }
}

/// Case runner that never touches external tools.
///
/// Every case reports the same coefficients; pairs registered with
/// `failing` return the given error instead. Attempted pairs are recorded
/// in call order.
pub struct StubCaseRunner {
    offset: f64,
    failures: HashMap<(u64, u64), CaseError>,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl StubCaseRunner {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Shift every lift value, to tell runs apart.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Fail exactly one pair with `error`.
    pub fn failing(mut self, inner: f64, outer: f64, error: CaseError) -> Self {
        self.failures
            .insert((inner.to_bits(), outer.to_bits()), error);
        self
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaseRunner for StubCaseRunner {
    async fn run_case(&self, case: &CaseContext) -> CaseResult<ResultRecord> {
        self.calls
            .lock()
            .unwrap()
            .push((case.pair.inner, case.pair.outer));
        assert!(case.workspace.is_dir(), "workspace must exist before the case runs");

        let key = (case.pair.inner.to_bits(), case.pair.outer.to_bits());
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        Ok(ResultRecord::new(&case.pair, stub_coefficients(self.offset)))
    }
}

/// Sweep over explicit axes with everything under `root`.
pub fn settings(root: &Path, inner: &[f64], outer: &[f64]) -> SweepSettings {
    SweepSettings {
        working_dir: root.join("dataOut"),
        project_prefix: "nacaMesh".to_string(),
        inner: AxisSpec::explicit(inner.to_vec()),
        outer: AxisSpec::explicit(outer.to_vec()),
        resume: false,
    }
}
