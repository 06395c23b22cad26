//! Sample pairs and the project identifiers derived from them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed-point scale used when embedding densities into project names.
///
/// Two densities closer than `1 / IDENTIFIER_SCALE` share a name; plans that
/// would produce such a collision are rejected up front.
pub const IDENTIFIER_SCALE: f64 = 1_000_000.0;

/// One (inner mesh density, outer mesh density) combination.
///
/// `row` and `column` are the pair's rank in the ascending inner and outer
/// axes of the plan that produced it. They are independent of iteration
/// order, so a reversed sweep still reports the same ranks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePair {
    pub inner: f64,
    pub outer: f64,
    pub row: usize,
    pub column: usize,
}

impl SamplePair {
    pub fn new(inner: f64, outer: f64, row: usize, column: usize) -> Self {
        Self {
            inner,
            outer,
            row,
            column,
        }
    }
}

impl fmt::Display for SamplePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.inner, self.outer)
    }
}

/// Deterministic, filesystem-safe name of one case's workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectIdentifier(String);

impl ProjectIdentifier {
    /// Encode a pair as `<prefix>_i<inner*1e6>_o<outer*1e6>`.
    pub fn encode(prefix: &str, pair: &SamplePair) -> Self {
        Self(format!(
            "{prefix}_i{:09}_o{:09}",
            scaled(pair.inner),
            scaled(pair.outer)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled(value: f64) -> u64 {
    (value * IDENTIFIER_SCALE).round() as u64
}
