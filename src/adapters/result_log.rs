//! Line-oriented result log on the local filesystem.
//!
//! One record per line, six comma-separated numbers, no header. Each record
//! goes out as a single write on an `O_APPEND` handle followed by
//! `sync_data`, so readers only ever see whole lines plus, at worst, one
//! unterminated tail that is still being written. Opening for append cuts
//! such a tail, since the log has a single writer.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::domain::errors::{SweepError, SweepResult};
use crate::domain::models::ResultRecord;
use crate::domain::ports::ResultStore;

/// Append-only result log backed by a text file.
pub struct FileResultStore {
    path: PathBuf,
    file: Option<File>,
}

impl FileResultStore {
    /// Open (creating it and its directory if needed) the log for appending.
    pub async fn open(path: impl Into<PathBuf>) -> SweepResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SweepError::ResultStoreIo {
                    path: path.clone(),
                    source,
                })?;
        }
        Self::drop_torn_tail(&path).await?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| SweepError::ResultStoreIo {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "result log opened");
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Cut an unterminated final line left by an interrupted write.
    ///
    /// An append after the fragment would merge into a line that never parses.
    async fn drop_torn_tail(path: &Path) -> SweepResult<()> {
        let io_err = |source| SweepError::ResultStoreIo {
            path: path.to_path_buf(),
            source,
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_err(e)),
        };
        if bytes.last().is_none_or(|&b| b == b'\n') {
            return Ok(());
        }

        let keep = bytes.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .await
            .map_err(io_err)?;
        file.set_len(keep as u64).await.map_err(io_err)?;
        file.sync_data().await.map_err(io_err)?;
        warn!(
            path = %path.display(),
            discarded_bytes = bytes.len() - keep,
            "truncated unterminated trailing line from an interrupted write"
        );
        Ok(())
    }

    /// A store that can only read; `append` opens the file on first use.
    pub fn reader(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    /// Parse every complete record in `path`. A missing file is empty.
    pub async fn read_records(path: &Path) -> SweepResult<Vec<ResultRecord>> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SweepError::ResultStoreIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        parse_log(path, &text)
    }
}

/// Parse log text. An unterminated final line is skipped.
pub fn parse_log(path: &Path, text: &str) -> SweepResult<Vec<ResultRecord>> {
    let mut records = Vec::new();
    for (index, chunk) in text.split_inclusive('\n').enumerate() {
        if !chunk.ends_with('\n') {
            if !chunk.trim().is_empty() {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    "ignoring unterminated trailing line"
                );
            }
            break;
        }
        let line = chunk.trim();
        if line.is_empty() {
            continue;
        }
        let record = ResultRecord::parse_line(line).map_err(|reason| SweepError::ResultLogParse {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn append(&mut self, record: &ResultRecord) -> SweepResult<()> {
        let io_err = |path: &Path, source| SweepError::ResultStoreIo {
            path: path.to_path_buf(),
            source,
        };

        if self.file.is_none() {
            let reopened = Self::open(self.path.clone()).await?;
            self.file = reopened.file;
        }
        let Some(file) = self.file.as_mut() else {
            return Err(io_err(
                &self.path,
                std::io::Error::new(ErrorKind::Other, "result log handle unavailable"),
            ));
        };

        let mut line = record.to_line();
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| io_err(&self.path, e))?;
        file.flush().await.map_err(|e| io_err(&self.path, e))?;
        file.sync_data().await.map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }

    async fn read_all(&self) -> SweepResult<Vec<ResultRecord>> {
        Self::read_records(&self.path).await
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(inner: f64, outer: f64, lift: f64) -> ResultRecord {
        ResultRecord {
            inner,
            outer,
            lift,
            drag: 0.03,
            moment: -0.08,
            efficiency: lift / 0.03,
        }
    }

    #[tokio::test]
    async fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convergenceResult.txt");
        let mut store = FileResultStore::open(&path).await.unwrap();

        let first = record(0.00595, 1.905, 0.327_557);
        let second = record(0.1, 0.1, 0.42);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records, vec![first, second]);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn reopening_appends_after_existing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        {
            let mut store = FileResultStore::open(&path).await.unwrap();
            store.append(&record(0.1, 1.0, 0.1)).await.unwrap();
        }
        let mut store = FileResultStore::open(&path).await.unwrap();
        store.append(&record(0.2, 1.0, 0.2)).await.unwrap();

        let records = store.read_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].lift, 0.1);
        assert_eq!(records[1].lift, 0.2);
    }

    #[tokio::test]
    async fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileResultStore::reader(dir.path().join("absent.txt"));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_cuts_unterminated_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.txt");
        std::fs::write(&path, "0.1,1,0.4,0.03,-0.08,13\n0.05,1,0.4").unwrap();

        let _store = FileResultStore::open(&path).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0.1,1,0.4,0.03,-0.08,13\n"
        );
    }

    #[tokio::test]
    async fn open_clears_a_lone_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.txt");
        std::fs::write(&path, "0.05,1,0.4").unwrap();

        let _store = FileResultStore::open(&path).await.unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn reader_opens_lazily_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lazy.txt");
        let mut store = FileResultStore::reader(&path);
        assert!(!path.exists());
        store.append(&record(0.1, 1.0, 0.5)).await.unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[test]
    fn unterminated_tail_is_ignored() {
        let text = "0.1,1,0.4,0.03,-0.08,13\n0.2,1,0.4";
        let records = parse_log(Path::new("log"), text).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "\n0.1,1,0.4,0.03,-0.08,13\n\n0.2,1,0.5,0.03,-0.08,13\n";
        assert_eq!(parse_log(Path::new("log"), text).unwrap().len(), 2);
    }

    #[test]
    fn malformed_complete_line_names_line_number() {
        let text = "0.1,1,0.4,0.03,-0.08,13\n0.2,1,bad,0.03,-0.08,13\n";
        let err = parse_log(Path::new("log"), text).unwrap_err();
        assert!(matches!(err, SweepError::ResultLogParse { line: 2, .. }));
    }
}
