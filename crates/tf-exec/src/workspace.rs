//! Per-run staging area.
//!
//! A [`RunWorkspace`] owns a temporary directory that holds the staged input
//! payload and one output slot per planned step. The directory is deleted when
//! the workspace is dropped, so every exit path of a run reclaims it.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// File name of the staged input payload.
const INPUT_FILE: &str = "input.txt";

/// Temporary directory scoped to one pipeline run.
///
/// # Example
///
/// ```no_run
/// use tf_exec::RunWorkspace;
///
/// # async fn example() -> tf_core::Result<()> {
/// let ws = RunWorkspace::new("3f2a9c1b")?;
/// let input = ws.stage_input("Some text").await?;
/// let out = ws.prepare_slot(0).await?;
/// // ... run a step reading `input` and writing `out` ...
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RunWorkspace {
    temp_dir: TempDir,
}

impl RunWorkspace {
    /// Create the temporary directory. `label` is embedded in its name.
    ///
    /// # Errors
    ///
    /// Returns [`tf_core::Error::Staging`] if the directory cannot be
    /// created (e.g. storage exhaustion).
    pub fn new(label: &str) -> tf_core::Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("textflow-{label}-"))
            .tempdir()
            .map_err(|e| tf_core::Error::Staging(format!("failed to create temp dir: {e}")))?;

        tracing::debug!("Created run workspace at {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the staged input payload.
    pub fn input(&self) -> PathBuf {
        self.temp_dir.path().join(INPUT_FILE)
    }

    /// Path of the output slot for the step at plan position `index`.
    pub fn output_slot(&self, index: usize) -> PathBuf {
        self.temp_dir.path().join(format!("output_{index}.txt"))
    }

    /// Write the input payload into the workspace.
    ///
    /// # Errors
    ///
    /// Returns [`tf_core::Error::Staging`] if the file cannot be written.
    pub async fn stage_input(&self, payload: &str) -> tf_core::Result<PathBuf> {
        let path = self.input();
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| tf_core::Error::Staging(format!("failed to stage input: {e}")))?;
        Ok(path)
    }

    /// Create (or truncate) the output slot at `index` so the step always has
    /// a regular file to write into.
    pub async fn prepare_slot(&self, index: usize) -> std::io::Result<PathBuf> {
        let path = self.output_slot(index);
        tokio::fs::write(&path, b"").await?;
        Ok(path)
    }

    /// Read a payload file back as text.
    pub async fn read(&self, path: &Path) -> std::io::Result<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_live_inside_temp_dir() {
        let ws = RunWorkspace::new("test").unwrap();
        assert!(ws.input().starts_with(ws.temp_dir()));
        assert_eq!(ws.input().file_name().unwrap(), "input.txt");
        assert_eq!(ws.output_slot(2).file_name().unwrap(), "output_2.txt");
        assert!(ws
            .temp_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("textflow-test-"));
    }

    #[tokio::test]
    async fn stage_and_read_back() {
        let ws = RunWorkspace::new("stage").unwrap();
        let input = ws.stage_input("hello world").await.unwrap();
        assert_eq!(ws.read(&input).await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn prepare_slot_creates_empty_file() {
        let ws = RunWorkspace::new("slot").unwrap();
        let slot = ws.prepare_slot(0).await.unwrap();
        assert!(slot.is_file());
        assert_eq!(ws.read(&slot).await.unwrap(), "");
    }

    #[tokio::test]
    async fn drop_removes_directory() {
        let ws = RunWorkspace::new("drop").unwrap();
        ws.stage_input("payload").await.unwrap();
        let dir = ws.temp_dir().to_path_buf();
        assert!(dir.exists());
        drop(ws);
        assert!(!dir.exists());
    }
}
