//! Sweep-wide flow solver options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named solver options shared by every cell of a sweep.
///
/// Keys are upper-cased and kept sorted so the rendered configuration file
/// is stable between runs. Per-case values (mesh and output file names) are
/// supplied by the solver adapter, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, OptionValue>", into = "BTreeMap<String, String>")]
pub struct SolverConfig {
    options: BTreeMap<String, String>,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self {
            options: BTreeMap::new(),
        }
    }

    /// Builder-style insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .insert(key.into().to_ascii_uppercase(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Boundary marker names referenced by `MARKER_*` options.
    ///
    /// `MARKER_EULER= ( airfoil )` contributes `airfoil`; list values such as
    /// `( lower, upper )` contribute each name.
    pub fn marker_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .options
            .iter()
            .filter(|(k, _)| k.starts_with("MARKER_"))
            .flat_map(|(_, v)| {
                v.trim_matches(|c: char| c == '(' || c == ')' || c.is_whitespace())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty() && s != "NONE")
                    .collect::<Vec<_>>()
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for SolverConfig {
    /// Inviscid transonic case at 10363 m cruise altitude.
    fn default() -> Self {
        Self::new()
            .with("PHYSICAL_PROBLEM", "EULER")
            .with("MACH_NUMBER", "0.65")
            .with("AOA", "0.0")
            .with("FREESTREAM_PRESSURE", "24999.8")
            .with("FREESTREAM_TEMPERATURE", "220.79")
            .with("MARKER_EULER", "( airfoil )")
            .with("MARKER_FAR", "( farfield )")
            .with("EXT_ITER", "1000")
            .with("OUTPUT_FORMAT", "PARAVIEW")
    }
}

impl FromIterator<(String, String)> for SolverConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            options: iter
                .into_iter()
                .map(|(k, v)| (k.to_ascii_uppercase(), v))
                .collect(),
        }
    }
}

/// Scalar option value as written in YAML or an environment variable.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<OptionValue> for String {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::Text(s) => s,
            OptionValue::Integer(i) => i.to_string(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::Flag(true) => "YES".to_string(),
            OptionValue::Flag(false) => "NO".to_string(),
        }
    }
}

impl From<BTreeMap<String, OptionValue>> for SolverConfig {
    fn from(raw: BTreeMap<String, OptionValue>) -> Self {
        raw.into_iter().map(|(k, v)| (k, String::from(v))).collect()
    }
}

impl From<SolverConfig> for BTreeMap<String, String> {
    fn from(config: SolverConfig) -> Self {
        config.options
    }
}
