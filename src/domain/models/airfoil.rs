//! Airfoil profile geometry.

use serde::{Deserialize, Serialize};

/// A 2-D profile as an ordered list of `(x, y)` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airfoil {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl Airfoil {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// True when the last point repeats the first.
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => first == last,
            _ => false,
        }
    }

    /// Points with a duplicated closing point removed.
    pub fn open_points(&self) -> &[(f64, f64)] {
        if self.is_closed() {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Extent of the profile along x.
    pub fn chord(&self) -> f64 {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        if min.is_finite() && max.is_finite() {
            max - min
        } else {
            0.0
        }
    }

    /// Midpoint of the chord line, used to center the far field.
    pub fn center(&self) -> (f64, f64) {
        let (min, max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                (lo.min(*x), hi.max(*x))
            });
        if min.is_finite() {
            ((min + max) / 2.0, 0.0)
        } else {
            (0.0, 0.0)
        }
    }
}
