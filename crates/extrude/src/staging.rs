use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ExtrudeError, Result};

/// A set of files written to temp files first and moved into place together.
///
/// Nothing at the destination changes until `commit`. If any rename fails,
/// the targets already replaced get their previous contents back (or are
/// removed if they did not exist), so a failed export never destroys an
/// earlier good one.
pub struct StagedFiles {
    dir: PathBuf,
    entries: Vec<(NamedTempFile, PathBuf)>,
}

/// What a target held before `commit` replaced it
enum Previous {
    Missing,
    Contents(Vec<u8>),
}

impl StagedFiles {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            entries: Vec::new(),
        }
    }

    /// Write a temp file in the staging directory destined for `target`
    pub fn stage<F>(&mut self, target: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&mut fs::File) -> std::io::Result<()>,
    {
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        write(staged.as_file_mut())?;
        staged.as_file().sync_all()?;
        self.entries.push((staged, target.to_path_buf()));
        Ok(())
    }

    /// Rename every staged file onto its target, in staging order
    pub fn commit(self) -> Result<()> {
        let mut committed: Vec<(PathBuf, Previous)> = Vec::with_capacity(self.entries.len());
        for (staged, target) in self.entries {
            let previous = match fs::read(&target) {
                Ok(bytes) => Previous::Contents(bytes),
                Err(_) => Previous::Missing,
            };
            match staged.persist(&target) {
                Ok(_) => committed.push((target, previous)),
                Err(error) => {
                    warn!(path = %target.display(), error = %error.error, "could not place staged file, rolling back");
                    // Temp files not yet persisted are removed on drop
                    rollback(committed);
                    return Err(ExtrudeError::Persist(error.error));
                }
            }
        }
        Ok(())
    }
}

fn rollback(committed: Vec<(PathBuf, Previous)>) {
    for (target, previous) in committed.into_iter().rev() {
        let restored = match previous {
            Previous::Contents(bytes) => fs::write(&target, bytes),
            Previous::Missing => fs::remove_file(&target),
        };
        match restored {
            Ok(()) => debug!(path = %target.display(), "rolled back"),
            Err(error) => warn!(path = %target.display(), %error, "rollback failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_nothing_lands_before_commit() {
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("a.txt");
        let mut files = StagedFiles::new(dir.path());
        files.stage(&target, |f| f.write_all(b"a")).expect("stage");

        assert!(!target.exists());
        files.commit().expect("commit");
        assert_eq!(fs::read_to_string(&target).expect("read"), "a");
        assert_eq!(leftovers(dir.path()), vec!["a.txt".to_string()]);
    }

    #[test]
    fn test_failed_commit_restores_earlier_targets() {
        let dir = tempfile::tempdir().expect("temp dir");
        let existing = dir.path().join("existing.txt");
        let fresh = dir.path().join("fresh.txt");
        let blocked = dir.path().join("blocked");
        fs::write(&existing, "old").expect("seed");
        fs::create_dir(&blocked).expect("blocker");
        fs::write(blocked.join("keep"), "x").expect("blocker content");

        let mut files = StagedFiles::new(dir.path());
        files.stage(&existing, |f| f.write_all(b"new")).expect("stage");
        files.stage(&fresh, |f| f.write_all(b"new")).expect("stage");
        files.stage(&blocked, |f| f.write_all(b"new")).expect("stage");

        assert!(matches!(files.commit(), Err(ExtrudeError::Persist(_))));
        assert_eq!(fs::read_to_string(&existing).expect("read"), "old");
        assert!(!fresh.exists());

        let mut names = leftovers(dir.path());
        names.sort();
        assert_eq!(names, vec!["blocked".to_string(), "existing.txt".to_string()]);
    }
}
