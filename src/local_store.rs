//! Local materialization store
//!
//! Decompressed reports are stored flat in one destination directory, one file
//! per logical filename. Presence of a file is the only state carried between
//! runs.

use std::io::{self, Write};
use std::path::PathBuf;

/// Suffix of in-progress writes; persisted under the final name once complete
const PARTIAL_SUFFIX: &str = ".partial";

/// Destination directory for decompressed reports
#[derive(Clone, Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Final path for a logical filename
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Whether a file with exactly this name is already materialized
    ///
    /// In-progress writes are not counted; an unreadable entry counts as
    /// absent so the object is fetched again.
    pub async fn exists(&self, name: &str) -> bool {
        match tokio::fs::metadata(self.path_for(name)).await {
            Ok(meta) => meta.is_file(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                tracing::debug!(file = name, error = %e, "cannot stat local file, treating as absent");
                false
            }
        }
    }

    /// Write `contents` under `name`, replacing any existing file
    ///
    /// The content goes to a uniquely named hidden sibling
    /// (`.<name>.<random>.partial`) that is renamed into place once complete.
    /// An interrupted run never leaves a truncated file under the final name,
    /// and concurrent writers of the same name never share a temporary file.
    pub async fn write(&self, name: &str, contents: impl Into<Vec<u8>>) -> io::Result<PathBuf> {
        validate_file_name(name)?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let final_path = self.path_for(name);
        let target = final_path.clone();
        let prefix = format!(".{name}.");
        let contents = contents.into();

        // The temporary file removes itself if any step fails
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut partial = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(PARTIAL_SUFFIX)
                .tempfile_in(&dir)?;
            partial.write_all(&contents)?;
            partial.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(io::Error::other)??;

        Ok(final_path)
    }
}

/// Logical filenames must be a single plain path component
fn validate_file_name(name: &str) -> io::Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name:?} is not a plain file name"),
        ));
    }
    Ok(())
}
