//! In-place conditioning of SU2 meshes written by gmsh.
//!
//! gmsh's SU2 export is close to what SU2_CFD wants but not always exact:
//! Windows builds emit CRLF line endings and marker tags may carry quotes or
//! padding. This pass normalizes both, checks that the mesh is a complete
//! 2-D SU2 file and that every marker the solver configuration refers to is
//! present.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::errors::{CaseError, CaseResult};
use crate::domain::ports::{CaseContext, MeshRepairer};

const REQUIRED_SECTIONS: [&str; 4] = ["NDIME=", "NELEM=", "NPOIN=", "NMARK="];

/// Result of conditioning mesh text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionedMesh {
    pub text: String,
    pub markers: Vec<String>,
    pub changed: bool,
}

/// Mesh repair stage backed by plain text processing.
pub struct Su2MeshConditioner {
    required_markers: Vec<String>,
}

impl Su2MeshConditioner {
    pub fn new(required_markers: Vec<String>) -> Self {
        Self { required_markers }
    }

    /// Normalize mesh text and validate its structure.
    pub fn condition(&self, text: &str) -> Result<ConditionedMesh, String> {
        let mut out = String::with_capacity(text.len());
        let mut markers = Vec::new();
        let mut changed = false;
        let mut dimension = None;

        for raw in text.split_inclusive('\n') {
            let line = raw.trim_end_matches(['\r', '\n']);
            if !raw.ends_with('\n') || raw.ends_with("\r\n") {
                changed = true;
            }

            let rewritten = if let Some(tag) = line.trim_start().strip_prefix("MARKER_TAG=") {
                let name = tag.trim().trim_matches(|c| c == '"' || c == '\'').trim();
                markers.push(name.to_string());
                format!("MARKER_TAG= {name}")
            } else {
                if let Some(value) = line.trim_start().strip_prefix("NDIME=") {
                    dimension = value.trim().parse::<u32>().ok();
                }
                line.to_string()
            };

            if rewritten != line {
                changed = true;
            }
            out.push_str(&rewritten);
            out.push('\n');
        }

        for section in REQUIRED_SECTIONS {
            if !out.lines().any(|l| l.trim_start().starts_with(section)) {
                return Err(format!("mesh has no {section} section"));
            }
        }
        match dimension {
            Some(2) => {}
            Some(other) => return Err(format!("expected a 2-D mesh, NDIME= {other}")),
            None => return Err("NDIME= value is not a number".to_string()),
        }

        let missing: Vec<&str> = self
            .required_markers
            .iter()
            .filter(|m| !markers.contains(m))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(format!(
                "mesh lacks marker(s) {} (found: {})",
                missing.join(", "),
                markers.join(", ")
            ));
        }

        Ok(ConditionedMesh {
            text: out,
            markers,
            changed,
        })
    }

    async fn write_atomically(path: &Path, text: &str) -> std::io::Result<()> {
        let tmp = path.with_extension("su2.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl MeshRepairer for Su2MeshConditioner {
    async fn repair(&self, case: &CaseContext, mesh: &Path) -> CaseResult<PathBuf> {
        let text = tokio::fs::read_to_string(mesh)
            .await
            .map_err(|e| CaseError::MeshRepair(format!("cannot read {}: {e}", mesh.display())))?;

        let conditioned = self.condition(&text).map_err(CaseError::MeshRepair)?;

        if conditioned.changed {
            Self::write_atomically(mesh, &conditioned.text)
                .await
                .map_err(|e| {
                    CaseError::MeshRepair(format!("cannot rewrite {}: {e}", mesh.display()))
                })?;
            info!(project = %case.project, mesh = %mesh.display(), "mesh conditioned");
        } else {
            debug!(project = %case.project, markers = ?conditioned.markers, "mesh already clean");
        }

        Ok(mesh.to_path_buf())
    }
}
