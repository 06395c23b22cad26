//! Reshape the flat result log into per-metric matrices.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::domain::models::{Coefficients, ParameterGrid, ResultRecord};

/// One of the four coefficients a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Lift,
    Drag,
    Moment,
    Efficiency,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Self::Lift, Self::Drag, Self::Moment, Self::Efficiency];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lift => "lift",
            Self::Drag => "drag",
            Self::Moment => "moment",
            Self::Efficiency => "efficiency",
        }
    }

    fn pick(self, c: &Coefficients) -> f64 {
        match self {
            Self::Lift => c.lift,
            Self::Drag => c.drag,
            Self::Moment => c.moment,
            Self::Efficiency => c.efficiency,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Matrix = Vec<Vec<Option<f64>>>;

/// Coefficient matrices indexed by (inner density row, outer density column).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGrid {
    /// Inner densities, ascending.
    pub rows: Vec<f64>,
    /// Outer densities, ascending.
    pub columns: Vec<f64>,
    pub lift: Matrix,
    pub drag: Matrix,
    pub moment: Matrix,
    pub efficiency: Matrix,
    /// Earlier records superseded by a later one for the same pair.
    pub duplicates_resolved: usize,
    /// Records whose pair is not part of the plan the grid was built for.
    pub outside_plan: usize,
}

impl ResultGrid {
    fn empty(rows: Vec<f64>, columns: Vec<f64>) -> Self {
        let blank = vec![vec![None; columns.len()]; rows.len()];
        Self {
            rows,
            columns,
            lift: blank.clone(),
            drag: blank.clone(),
            moment: blank.clone(),
            efficiency: blank,
            duplicates_resolved: 0,
            outside_plan: 0,
        }
    }

    pub fn matrix(&self, metric: Metric) -> &Matrix {
        match metric {
            Metric::Lift => &self.lift,
            Metric::Drag => &self.drag,
            Metric::Moment => &self.moment,
            Metric::Efficiency => &self.efficiency,
        }
    }

    fn matrix_mut(&mut self, metric: Metric) -> &mut Matrix {
        match metric {
            Metric::Lift => &mut self.lift,
            Metric::Drag => &mut self.drag,
            Metric::Moment => &mut self.moment,
            Metric::Efficiency => &mut self.efficiency,
        }
    }

    pub fn value(&self, metric: Metric, row: usize, column: usize) -> Option<f64> {
        self.matrix(metric)
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .flatten()
    }

    /// Cells with no record.
    pub fn missing_count(&self) -> usize {
        self.lift.iter().flatten().filter(|c| c.is_none()).count()
    }

    pub fn filled_count(&self) -> usize {
        self.rows.len() * self.columns.len() - self.missing_count()
    }

    fn place(&mut self, row: usize, column: usize, coefficients: &Coefficients) {
        for metric in Metric::ALL {
            self.matrix_mut(metric)[row][column] = Some(metric.pick(coefficients));
        }
    }
}

/// Builds [`ResultGrid`]s from log records.
pub struct ResultGridBuilder;

impl ResultGridBuilder {
    /// Rows and columns are exactly the distinct densities found in the log.
    pub fn build(records: &[ResultRecord]) -> ResultGrid {
        let (latest, duplicates) = reconcile(records);
        let rows = sorted_unique(latest.iter().map(|r| r.inner));
        let columns = sorted_unique(latest.iter().map(|r| r.outer));

        let mut grid = ResultGrid::empty(rows, columns);
        grid.duplicates_resolved = duplicates;
        for record in &latest {
            if let (Some(row), Some(column)) = (
                index_of(&grid.rows, record.inner),
                index_of(&grid.columns, record.outer),
            ) {
                grid.place(row, column, &record.coefficients());
            }
        }
        grid
    }

    /// Rows and columns are the plan's axes, so unrun cells show as gaps.
    pub fn build_for_plan(records: &[ResultRecord], plan: &ParameterGrid) -> ResultGrid {
        let (latest, duplicates) = reconcile(records);
        let mut grid = ResultGrid::empty(plan.sorted_inner(), plan.sorted_outer());
        grid.duplicates_resolved = duplicates;
        for record in &latest {
            match plan.locate(record.inner, record.outer) {
                Some(pair) => grid.place(pair.row, pair.column, &record.coefficients()),
                None => grid.outside_plan += 1,
            }
        }
        grid
    }
}

/// Keep the last record per exact (inner, outer) pair, in first-seen order.
fn reconcile(records: &[ResultRecord]) -> (Vec<ResultRecord>, usize) {
    let mut slots: HashMap<(u64, u64), usize> = HashMap::with_capacity(records.len());
    let mut latest: Vec<ResultRecord> = Vec::with_capacity(records.len());
    let mut duplicates = 0;
    for record in records {
        let key = (record.inner.to_bits(), record.outer.to_bits());
        match slots.get(&key) {
            Some(&slot) => {
                latest[slot] = *record;
                duplicates += 1;
            }
            None => {
                slots.insert(key, latest.len());
                latest.push(*record);
            }
        }
    }
    (latest, duplicates)
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.to_bits() == b.to_bits());
    values
}

fn index_of(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| probe.total_cmp(&value)).ok()
}
