//! Parameter grid construction.
//!
//! A sweep is the Cartesian product of an inner-density axis and an
//! outer-density axis. Each axis is either a linear range or an explicit list
//! of values; either may be reversed to run fine-to-coarse.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::errors::{SweepError, SweepResult};
use crate::domain::models::sample::SamplePair;

/// Definition of one density axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    /// Values taken as given.
    Explicit {
        values: Vec<f64>,
        #[serde(default)]
        reverse: bool,
    },
    /// `count` linearly spaced values from `min` to `max`, both inclusive.
    Linear {
        min: f64,
        max: f64,
        count: usize,
        #[serde(default)]
        reverse: bool,
    },
}

impl AxisSpec {
    pub fn linear(min: f64, max: f64, count: usize) -> Self {
        Self::Linear {
            min,
            max,
            count,
            reverse: false,
        }
    }

    pub fn explicit(values: impl Into<Vec<f64>>) -> Self {
        Self::Explicit {
            values: values.into(),
            reverse: false,
        }
    }

    /// Same axis, iterated in the opposite order.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Linear {
                min,
                max,
                count,
                reverse,
            } => Self::Linear {
                min,
                max,
                count,
                reverse: !reverse,
            },
            Self::Explicit { values, reverse } => Self::Explicit {
                values,
                reverse: !reverse,
            },
        }
    }

    /// Check bounds without generating values.
    pub fn validate(&self, axis: &str) -> SweepResult<()> {
        match self {
            Self::Linear { min, max, count, .. } => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis bounds must be finite (min={min}, max={max})"
                    )));
                }
                if *min <= 0.0 {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis densities must be positive (min={min})"
                    )));
                }
                if min > max {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis min {min} exceeds max {max}"
                    )));
                }
                if *count < 1 {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis count must be at least 1"
                    )));
                }
                if *count > 1 && min == max {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis has {count} points but min equals max ({min})"
                    )));
                }
            }
            Self::Explicit { values, .. } => {
                if values.is_empty() {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis value list is empty"
                    )));
                }
                if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis densities must be positive and finite (got {bad})"
                    )));
                }
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
                    return Err(SweepError::InvalidGrid(format!(
                        "{axis} axis contains duplicate value {}",
                        w[0]
                    )));
                }
            }
        }
        Ok(())
    }

    /// Values in iteration order. Does not validate.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::Linear {
                min,
                max,
                count,
                reverse,
            } => {
                let mut values = linspace(*min, *max, *count);
                if *reverse {
                    values.reverse();
                }
                values
            }
            Self::Explicit { values, reverse } => {
                let mut values = values.clone();
                if *reverse {
                    values.reverse();
                }
                values
            }
        }
    }
}

/// `count` evenly spaced values over `[min, max]` with both endpoints exact.
///
/// A single point yields `[min]`.
pub fn linspace(min: f64, max: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| min + i as f64 * step).collect();
            values[count - 1] = max;
            values
        }
    }
}

/// One axis with each value's rank in ascending order.
#[derive(Debug, Clone, PartialEq)]
struct RankedAxis {
    values: Vec<f64>,
    ranks: Vec<usize>,
}

impl RankedAxis {
    fn new(values: Vec<f64>) -> Self {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let mut ranks = vec![0; values.len()];
        for (rank, index) in order.into_iter().enumerate() {
            ranks[index] = rank;
        }
        Self { values, ranks }
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    fn position(&self, value: f64) -> Option<usize> {
        self.values
            .iter()
            .position(|v| v.total_cmp(&value) == Ordering::Equal)
    }
}

/// The ordered set of sample pairs one sweep evaluates.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    inner: RankedAxis,
    outer: RankedAxis,
}

impl ParameterGrid {
    /// Build and validate a grid. Fails before anything touches the disk.
    pub fn new(inner: &AxisSpec, outer: &AxisSpec) -> SweepResult<Self> {
        inner.validate("inner")?;
        outer.validate("outer")?;
        Ok(Self {
            inner: RankedAxis::new(inner.values()),
            outer: RankedAxis::new(outer.values()),
        })
    }

    /// Inner densities in iteration order.
    pub fn inner_values(&self) -> &[f64] {
        &self.inner.values
    }

    /// Outer densities in iteration order.
    pub fn outer_values(&self) -> &[f64] {
        &self.outer.values
    }

    /// Inner densities ascending (row axis of a result grid).
    pub fn sorted_inner(&self) -> Vec<f64> {
        self.inner.sorted()
    }

    /// Outer densities ascending (column axis of a result grid).
    pub fn sorted_outer(&self) -> Vec<f64> {
        self.outer.sorted()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.inner.values.len() * self.outer.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells in iteration order: inner densities outermost.
    pub fn pairs(&self) -> impl Iterator<Item = SamplePair> + '_ {
        self.inner
            .values
            .iter()
            .zip(&self.inner.ranks)
            .flat_map(move |(&inner, &row)| {
                self.outer
                    .values
                    .iter()
                    .zip(&self.outer.ranks)
                    .map(move |(&outer, &column)| SamplePair::new(inner, outer, row, column))
            })
    }

    /// Look a pair up by exact density values.
    pub fn locate(&self, inner: f64, outer: f64) -> Option<SamplePair> {
        let i = self.inner.position(inner)?;
        let o = self.outer.position(outer)?;
        Some(SamplePair::new(
            self.inner.values[i],
            self.outer.values[o],
            self.inner.ranks[i],
            self.outer.ranks[o],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_endpoints() {
        let values = linspace(0.001, 0.1, 21);
        assert_eq!(values.len(), 21);
        assert_eq!(values[0], 0.001);
        assert_eq!(values[20], 0.1);
    }

    #[test]
    fn linspace_single_point_is_min() {
        assert_eq!(linspace(0.5, 0.5, 1), vec![0.5]);
        assert_eq!(linspace(0.5, 2.0, 1), vec![0.5]);
    }

    #[test]
    fn reverse_changes_order_not_values() {
        let forward = AxisSpec::linear(0.1, 2.0, 5).values();
        let backward = AxisSpec::linear(0.1, 2.0, 5).reversed().values();
        let mut restored = backward.clone();
        restored.reverse();
        assert_eq!(forward, restored);
        assert_eq!(backward[0], 2.0);
    }

    #[test]
    fn grid_is_cartesian_product_inner_major() {
        let grid = ParameterGrid::new(
            &AxisSpec::explicit([0.01, 0.05, 0.1]),
            &AxisSpec::explicit([0.5, 1.0]),
        )
        .unwrap();
        let pairs: Vec<(f64, f64)> = grid.pairs().map(|p| (p.inner, p.outer)).collect();
        assert_eq!(
            pairs,
            vec![
                (0.01, 0.5),
                (0.01, 1.0),
                (0.05, 0.5),
                (0.05, 1.0),
                (0.1, 0.5),
                (0.1, 1.0)
            ]
        );
        assert_eq!(grid.len(), 6);
    }

    #[test]
    fn ranks_follow_ascending_order_when_reversed() {
        let grid = ParameterGrid::new(
            &AxisSpec::linear(1.0, 3.0, 3).reversed(),
            &AxisSpec::explicit([0.5]),
        )
        .unwrap();
        let first = grid.pairs().next().unwrap();
        assert_eq!(first.inner, 3.0);
        assert_eq!(first.row, 2);
        assert_eq!(grid.sorted_inner(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn rejects_min_greater_than_max() {
        let err = ParameterGrid::new(&AxisSpec::linear(2.0, 1.0, 3), &AxisSpec::explicit([1.0]))
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidGrid(msg) if msg.contains("exceeds")));
    }

    #[test]
    fn rejects_zero_count() {
        assert!(matches!(
            ParameterGrid::new(&AxisSpec::explicit([1.0]), &AxisSpec::linear(1.0, 2.0, 0)),
            Err(SweepError::InvalidGrid(_))
        ));
    }

    #[test]
    fn rejects_non_positive_and_duplicates() {
        assert!(AxisSpec::linear(0.0, 1.0, 3).validate("inner").is_err());
        assert!(AxisSpec::explicit([0.5, -1.0]).validate("outer").is_err());
        assert!(AxisSpec::explicit([0.5, 0.5]).validate("outer").is_err());
        assert!(AxisSpec::linear(0.5, 0.5, 3).validate("outer").is_err());
        assert!(AxisSpec::explicit(Vec::new()).validate("outer").is_err());
    }

    #[test]
    fn locate_returns_ranks() {
        let grid = ParameterGrid::new(
            &AxisSpec::explicit([0.1, 0.01, 0.05]),
            &AxisSpec::explicit([1.0, 0.5]),
        )
        .unwrap();
        let pair = grid.locate(0.05, 0.5).unwrap();
        assert_eq!((pair.row, pair.column), (1, 0));
        assert!(grid.locate(0.05, 0.75).is_none());
    }

    #[test]
    fn axis_spec_deserializes_both_shapes() {
        let linear: AxisSpec =
            serde_yaml::from_str("min: 0.001\nmax: 0.1\ncount: 21\nreverse: true").unwrap();
        assert!(matches!(linear, AxisSpec::Linear { count: 21, reverse: true, .. }));

        let explicit: AxisSpec = serde_yaml::from_str("values: [0.5, 1.0]").unwrap();
        assert_eq!(explicit.values(), vec![0.5, 1.0]);
    }
}
