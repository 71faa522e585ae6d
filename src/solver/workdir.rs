use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

const PREFIX: &str = "series_";

/// Per-run scratch directory, removed with everything in it when dropped.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create the first free `series_N` directory under `parent`.
    pub fn create(parent: &Path) -> io::Result<WorkDir> {
        fs::create_dir_all(parent)?;
        let mut n: u64 = 0;
        loop {
            let candidate = parent.join(format!("{}{}", PREFIX, n));
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    let mut dir = WorkDir { path: candidate };
                    dir.path = fs::canonicalize(&dir.path)?;
                    log::debug!("allocated work directory {}", dir.path.display());
                    return Ok(dir);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("removed work directory {}", self.path.display()),
            Err(e) => log::warn!("could not remove {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("avl-bridge-workdir-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn names_are_probed_and_removed() {
        let parent = scratch("probe");
        fs::create_dir_all(parent.join("series_0")).unwrap();

        let first = WorkDir::create(&parent).unwrap();
        assert!(first.path().ends_with("series_1"));
        let second = WorkDir::create(&parent).unwrap();
        assert!(second.path().ends_with("series_2"));

        fs::write(first.join("geometry.avl"), "x").unwrap();
        let (p1, p2) = (first.path().to_path_buf(), second.path().to_path_buf());
        drop(first);
        drop(second);
        assert!(!p1.exists());
        assert!(!p2.exists());

        fs::remove_dir_all(&parent).unwrap();
    }
}
