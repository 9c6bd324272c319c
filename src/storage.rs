use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sink a persisted collection is rewritten to, in full, on every change
pub trait Persist {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<F> Persist for F
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self(bytes)
    }
}

/// A collection persisted as a single file
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file content. A file that does not exist yet reads as empty.
    pub fn read_all(&self) -> io::Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Ensure the parent directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

impl Persist for FileStore {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.ensure_dir()?;
        fs::write(&self.path, bytes)
    }
}
