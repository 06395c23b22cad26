//! Parser for SU2's forces breakdown file.
//!
//! The file lists one line per integrated coefficient, e.g.
//!
//! ```text
//! Total CL:    0.327557 | Pressure (101.232%):  0.33159 | Friction (-1.232%): -0.00404
//! ```
//!
//! Only the value before the first `|` is used.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{CaseError, CaseResult};
use crate::domain::models::Coefficients;
use crate::domain::ports::{CaseContext, ResultExtractor};

const LIFT_KEYS: &[&str] = &["Total CL:"];
const DRAG_KEYS: &[&str] = &["Total CD:"];
const MOMENT_KEYS: &[&str] = &["Total CMz:"];
const EFFICIENCY_KEYS: &[&str] = &["Total CEff:", "Total CL/CD:"];

/// Reads lift, drag, moment and efficiency from `forces_breakdown.dat`.
#[derive(Debug, Default)]
pub struct Su2BreakdownExtractor;

impl Su2BreakdownExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(text: &str) -> CaseResult<Coefficients> {
        Ok(Coefficients {
            lift: find_value(text, LIFT_KEYS)?,
            drag: find_value(text, DRAG_KEYS)?,
            moment: find_value(text, MOMENT_KEYS)?,
            efficiency: find_value(text, EFFICIENCY_KEYS)?,
        })
    }
}

fn find_value(text: &str, keys: &[&str]) -> CaseResult<f64> {
    for line in text.lines().map(str::trim) {
        for key in keys {
            if let Some(rest) = line.strip_prefix(key) {
                let raw = rest.split('|').next().unwrap_or_default().trim();
                return raw.parse::<f64>().map_err(|e| {
                    CaseError::ResultParse(format!("'{key}' has unreadable value '{raw}': {e}"))
                });
            }
        }
    }
    Err(CaseError::ResultParse(format!(
        "no '{}' entry in forces breakdown",
        keys.join("' or '")
    )))
}

#[async_trait]
impl ResultExtractor for Su2BreakdownExtractor {
    async fn extract(&self, case: &CaseContext, output: &Path) -> CaseResult<Coefficients> {
        let text = tokio::fs::read_to_string(output).await.map_err(|e| {
            CaseError::ResultParse(format!("cannot read {}: {e}", output.display()))
        })?;
        let coefficients = Self::parse(&text)?;
        debug!(
            project = %case.project,
            lift = coefficients.lift,
            drag = coefficients.drag,
            "coefficients extracted"
        );
        Ok(coefficients)
    }
}
