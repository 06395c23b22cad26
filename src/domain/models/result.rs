//! Result records and their line encoding.

use serde::{Deserialize, Serialize};

use crate::domain::models::sample::SamplePair;

/// Number of comma-separated fields in one result line.
pub const RECORD_FIELDS: usize = 6;

/// Scalar outputs extracted from one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub lift: f64,
    pub drag: f64,
    pub moment: f64,
    pub efficiency: f64,
}

/// One completed sample pair and its coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub inner: f64,
    pub outer: f64,
    pub lift: f64,
    pub drag: f64,
    pub moment: f64,
    pub efficiency: f64,
}

impl ResultRecord {
    pub fn new(pair: &SamplePair, coefficients: Coefficients) -> Self {
        Self {
            inner: pair.inner,
            outer: pair.outer,
            lift: coefficients.lift,
            drag: coefficients.drag,
            moment: coefficients.moment,
            efficiency: coefficients.efficiency,
        }
    }

    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            lift: self.lift,
            drag: self.drag,
            moment: self.moment,
            efficiency: self.efficiency,
        }
    }

    /// Exact match on the density pair.
    pub fn matches(&self, inner: f64, outer: f64) -> bool {
        self.inner.to_bits() == inner.to_bits() && self.outer.to_bits() == outer.to_bits()
    }

    /// Encode as `inner,outer,lift,drag,moment,efficiency` without a newline.
    ///
    /// `f64`'s `Display` is the shortest representation that parses back to
    /// the same bits, so reading the line restores the record exactly.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.inner, self.outer, self.lift, self.drag, self.moment, self.efficiency
        )
    }

    /// Decode one line. The error names the offending field.
    pub fn parse_line(line: &str) -> Result<Self, String> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() != RECORD_FIELDS {
            return Err(format!(
                "expected {RECORD_FIELDS} fields, found {}",
                fields.len()
            ));
        }

        let mut values = [0.0_f64; RECORD_FIELDS];
        for (slot, (name, raw)) in values.iter_mut().zip(FIELD_NAMES.iter().zip(&fields)) {
            *slot = raw
                .parse::<f64>()
                .map_err(|e| format!("field '{name}' = '{raw}': {e}"))?;
        }

        Ok(Self {
            inner: values[0],
            outer: values[1],
            lift: values[2],
            drag: values[3],
            moment: values[4],
            efficiency: values[5],
        })
    }
}

const FIELD_NAMES: [&str; RECORD_FIELDS] = ["inner", "outer", "lift", "drag", "moment", "efficiency"];
