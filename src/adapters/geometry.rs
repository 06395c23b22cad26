//! Airfoil coordinate file loader.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{CaseError, CaseResult};
use crate::domain::models::Airfoil;
use crate::domain::ports::GeometryLoader;

/// Minimum number of distinct points that still describes a closed profile.
const MIN_POINTS: usize = 3;

/// Reads `x,y` pairs, one per line.
///
/// Commas, semicolons and whitespace all separate fields. A single
/// non-numeric header line is skipped, as are blank lines and `#` comments.
pub struct CsvAirfoilLoader {
    path: PathBuf,
}

impl CsvAirfoilLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse file contents into an airfoil named after the file stem.
    pub fn parse(name: &str, text: &str) -> CaseResult<Airfoil> {
        let mut points = Vec::new();
        let mut header_seen = false;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
                .filter(|f| !f.is_empty())
                .collect();

            let parsed = match fields.as_slice() {
                [x, y, ..] => x.parse::<f64>().ok().zip(y.parse::<f64>().ok()),
                _ => None,
            };

            match parsed {
                Some((x, y)) if x.is_finite() && y.is_finite() => points.push((x, y)),
                _ if points.is_empty() && !header_seen => header_seen = true,
                _ => {
                    return Err(CaseError::GeometryLoad(format!(
                        "line {}: expected two numeric coordinates, got '{line}'",
                        index + 1
                    )))
                }
            }
        }

        let airfoil = Airfoil::new(name, points);
        if airfoil.open_points().len() < MIN_POINTS {
            return Err(CaseError::GeometryLoad(format!(
                "profile '{name}' has {} points, need at least {MIN_POINTS}",
                airfoil.open_points().len()
            )));
        }
        Ok(airfoil)
    }
}

#[async_trait]
impl GeometryLoader for CsvAirfoilLoader {
    async fn load(&self) -> CaseResult<Airfoil> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CaseError::GeometryLoad(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let name = self
            .path
            .file_stem()
            .map_or_else(|| "airfoil".to_string(), |s| s.to_string_lossy().into_owned());

        let airfoil = Self::parse(&name, &text)?;
        debug!(
            path = %self.path.display(),
            points = airfoil.points.len(),
            "airfoil loaded"
        );
        Ok(airfoil)
    }
}
