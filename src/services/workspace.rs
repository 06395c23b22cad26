//! Per-case workspace directories under the working directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::{SweepError, SweepResult};
use crate::domain::models::{ParameterGrid, ProjectIdentifier, SamplePair};

/// Maps sample pairs to named directories below one root.
#[derive(Debug, Clone)]
pub struct ProjectWorkspace {
    root: PathBuf,
    prefix: String,
}

impl ProjectWorkspace {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn identifier_for(&self, pair: &SamplePair) -> ProjectIdentifier {
        ProjectIdentifier::encode(&self.prefix, pair)
    }

    /// Create the working directory if needed and switch to its absolute form.
    ///
    /// External tools run with the case directory as their current
    /// directory, so every path handed to them must be absolute.
    pub async fn ensure_root(&mut self) -> SweepResult<&Path> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| SweepError::Workspace {
                path: self.root.clone(),
                source,
            })?;
        let absolute =
            tokio::fs::canonicalize(&self.root)
                .await
                .map_err(|source| SweepError::Workspace {
                    path: self.root.clone(),
                    source,
                })?;
        self.root = absolute;
        Ok(&self.root)
    }

    /// Directory for one case, created if absent.
    pub async fn ensure(&self, identifier: &ProjectIdentifier) -> SweepResult<PathBuf> {
        let dir = self.root.join(identifier.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| SweepError::Workspace {
                path: dir.clone(),
                source,
            })?;
        debug!(workspace = %dir.display(), "case workspace ready");
        Ok(dir)
    }

    /// Reject plans in which two pairs would share a directory.
    pub fn check_unique(&self, grid: &ParameterGrid) -> SweepResult<()> {
        let mut seen: HashMap<ProjectIdentifier, SamplePair> = HashMap::with_capacity(grid.len());
        for pair in grid.pairs() {
            let identifier = self.identifier_for(&pair);
            if let Some(first) = seen.get(&identifier) {
                return Err(SweepError::IdentifierCollision {
                    identifier: identifier.to_string(),
                    first: first.to_string(),
                    second: pair.to_string(),
                });
            }
            seen.insert(identifier, pair);
        }
        Ok(())
    }
}
