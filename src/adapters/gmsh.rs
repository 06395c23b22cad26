//! Gmsh mesh generator adapter.
//!
//! Writes a `.geo` script describing the airfoil inside a circular far
//! field, then runs `gmsh -2` to produce an SU2-format mesh. The inner
//! density sets the characteristic length on the profile points, the outer
//! density the one on the far-field circle.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::adapters::process::{remove_stale, ExternalCommand};
use crate::domain::errors::{CaseError, CaseResult};
use crate::domain::models::{Airfoil, MeshConfig};
use crate::domain::ports::{CaseContext, MeshGenerator};

/// Runs gmsh for each case.
pub struct GmshMeshGenerator {
    gmsh_path: PathBuf,
    mesh: MeshConfig,
    timeout: Duration,
}

impl GmshMeshGenerator {
    pub fn new(gmsh_path: impl Into<PathBuf>, mesh: MeshConfig, timeout: Duration) -> Self {
        Self {
            gmsh_path: gmsh_path.into(),
            mesh,
            timeout,
        }
    }

    /// Render the geometry script for one case.
    pub fn render_geo(airfoil: &Airfoil, inner: f64, outer: f64, mesh: &MeshConfig) -> String {
        let points = airfoil.open_points();
        let n = points.len();
        let (cx, cy) = airfoil.center();
        let radius = mesh.farfield_radius * airfoil.chord().max(f64::EPSILON);

        let mut geo = String::new();
        let _ = writeln!(geo, "// {} inner={inner} outer={outer}", airfoil.name);
        let _ = writeln!(geo, "inner_size = {inner};");
        let _ = writeln!(geo, "outer_size = {outer};");

        for (i, (x, y)) in points.iter().enumerate() {
            let _ = writeln!(geo, "Point({}) = {{{x}, {y}, 0, inner_size}};", i + 1);
        }
        let spline: Vec<String> = (1..=n).chain(std::iter::once(1)).map(|i| i.to_string()).collect();
        let _ = writeln!(geo, "Spline(1) = {{{}}};", spline.join(", "));

        let center = n + 1;
        let _ = writeln!(geo, "Point({center}) = {{{cx}, {cy}, 0, outer_size}};");
        let rim = [
            (cx + radius, cy),
            (cx, cy + radius),
            (cx - radius, cy),
            (cx, cy - radius),
        ];
        for (k, (x, y)) in rim.iter().enumerate() {
            let _ = writeln!(geo, "Point({}) = {{{x}, {y}, 0, outer_size}};", center + 1 + k);
        }
        for k in 0..4 {
            let start = center + 1 + k;
            let end = center + 1 + (k + 1) % 4;
            let _ = writeln!(geo, "Circle({}) = {{{start}, {center}, {end}}};", k + 2);
        }

        let _ = writeln!(geo, "Curve Loop(1) = {{2, 3, 4, 5}};");
        let _ = writeln!(geo, "Curve Loop(2) = {{1}};");
        let _ = writeln!(geo, "Plane Surface(1) = {{1, 2}};");
        let _ = writeln!(geo, "Physical Curve(\"{}\") = {{1}};", mesh.airfoil_marker);
        let _ = writeln!(geo, "Physical Curve(\"{}\") = {{2, 3, 4, 5}};", mesh.farfield_marker);
        let _ = writeln!(geo, "Physical Surface(\"fluid\") = {{1}};");
        geo
    }
}

#[async_trait]
impl MeshGenerator for GmshMeshGenerator {
    #[instrument(skip(self, case, airfoil), fields(project = %case.project))]
    async fn generate(&self, case: &CaseContext, airfoil: &Airfoil) -> CaseResult<PathBuf> {
        let geo_path = case.artifact("geo");
        let mesh_path = case.artifact("su2");

        let script = Self::render_geo(airfoil, case.pair.inner, case.pair.outer, &self.mesh);
        tokio::fs::write(&geo_path, script).await.map_err(|e| {
            CaseError::MeshGeneration(format!("cannot write {}: {e}", geo_path.display()))
        })?;

        // A stale mesh from an earlier run must not count as output.
        remove_stale(&mesh_path).await.map_err(|e| {
            CaseError::MeshGeneration(format!(
                "cannot remove stale mesh {}: {e}",
                mesh_path.display()
            ))
        })?;

        let outcome = ExternalCommand::new(&self.gmsh_path)
            .arg(&geo_path)
            .args(["-2", "-format", "su2", "-o"])
            .arg(&mesh_path)
            .current_dir(&case.workspace)
            .timeout(self.timeout)
            .transcript(case.workspace.join("gmsh.log"))
            .run()
            .await
            .map_err(|e| CaseError::MeshGeneration(e.to_string()))?;

        if !outcome.success() {
            return Err(CaseError::MeshGeneration(format!(
                "gmsh exited with {}: {}",
                outcome.status,
                outcome.last_diagnostic().unwrap_or("no output")
            )));
        }

        match tokio::fs::metadata(&mesh_path).await {
            Ok(meta) if meta.len() > 0 => {}
            _ => {
                return Err(CaseError::MeshGeneration(format!(
                    "gmsh succeeded but produced no mesh at {}",
                    mesh_path.display()
                )))
            }
        }

        info!(
            mesh = %mesh_path.display(),
            elapsed_ms = outcome.elapsed.as_millis(),
            "mesh generated"
        );
        Ok(mesh_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ProjectIdentifier, SamplePair};

    fn diamond() -> Airfoil {
        Airfoil::new(
            "diamond",
            vec![(1.0, 0.0), (0.5, 0.05), (0.0, 0.0), (0.5, -0.05), (1.0, 0.0)],
        )
    }

    #[test]
    fn geo_closes_spline_and_names_markers() {
        let geo = GmshMeshGenerator::render_geo(&diamond(), 0.01, 1.5, &MeshConfig::default());
        assert!(geo.contains("inner_size = 0.01;"));
        assert!(geo.contains("outer_size = 1.5;"));
        assert!(geo.contains("Point(1) = {1, 0, 0, inner_size};"));
        assert!(geo.contains("Spline(1) = {1, 2, 3, 4, 1};"));
        assert!(geo.contains("Physical Curve(\"airfoil\") = {1};"));
        assert!(geo.contains("Physical Curve(\"farfield\") = {2, 3, 4, 5};"));
        // closing duplicate dropped: 4 profile points, center, 4 rim points
        assert!(geo.contains("Point(9)"));
        assert!(!geo.contains("Point(10)"));
    }

    #[test]
    fn farfield_scales_with_chord() {
        let mesh = MeshConfig {
            farfield_radius: 10.0,
            ..MeshConfig::default()
        };
        let geo = GmshMeshGenerator::render_geo(&diamond(), 0.01, 1.0, &mesh);
        // center (0.5, 0), radius 10 chords of length 1
        assert!(geo.contains("Point(5) = {0.5, 0, 0, outer_size};"));
        assert!(geo.contains("Point(6) = {10.5, 0, 0, outer_size};"));
        assert!(geo.contains("Circle(5) = {9, 5, 6};"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_gmsh_is_mesh_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let pair = SamplePair::new(0.01, 1.0, 0, 0);
        let case = CaseContext::new(
            pair,
            ProjectIdentifier::encode("case", &pair),
            dir.path().to_path_buf(),
        );
        let generator =
            GmshMeshGenerator::new("false", MeshConfig::default(), Duration::from_secs(5));
        let err = generator.generate(&case, &diamond()).await.unwrap_err();
        assert!(matches!(err, CaseError::MeshGeneration(_)));
        assert!(case.artifact("geo").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_exit_without_mesh_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pair = SamplePair::new(0.01, 1.0, 0, 0);
        let case = CaseContext::new(
            pair,
            ProjectIdentifier::encode("case", &pair),
            dir.path().to_path_buf(),
        );
        let generator =
            GmshMeshGenerator::new("true", MeshConfig::default(), Duration::from_secs(5));
        let err = generator.generate(&case, &diamond()).await.unwrap_err();
        assert!(matches!(err, CaseError::MeshGeneration(msg) if msg.contains("no mesh")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn undeletable_stale_mesh_fails_before_running_gmsh() {
        let dir = tempfile::tempdir().unwrap();
        let pair = SamplePair::new(0.01, 1.0, 0, 0);
        let case = CaseContext::new(
            pair,
            ProjectIdentifier::encode("case", &pair),
            dir.path().to_path_buf(),
        );
        std::fs::create_dir(case.artifact("su2")).unwrap();
        let generator =
            GmshMeshGenerator::new("true", MeshConfig::default(), Duration::from_secs(5));
        let err = generator.generate(&case, &diamond()).await.unwrap_err();
        assert!(matches!(err, CaseError::MeshGeneration(msg) if msg.contains("stale mesh")));
        assert!(!dir.path().join("gmsh.log").exists());
    }
}
