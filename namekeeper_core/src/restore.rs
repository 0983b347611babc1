//! Restore planning and execution.
//!
//! Restoring runs in two passes. Planning fingerprints the current files,
//! resolves each against the record store, and produces an immutable list of
//! pending moves without touching the filesystem. Execution walks the plan
//! in order and re-checks every destination at the moment of its move, so an
//! earlier move in the same run can turn a later job into a skip.

use crate::error::{Error, Result};
use crate::keeper::Keeper;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A single pending rename inside the managed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveJob {
    src: PathBuf,
    dst: PathBuf,
}

impl MoveJob {
    /// Current path of the file.
    pub fn src(&self) -> &Path {
        &self.src
    }

    /// Path the file will be renamed to.
    pub fn dst(&self) -> &Path {
        &self.dst
    }
}

/// An ordered list of pending renames. Executing consumes the plan.
#[derive(Debug)]
pub struct RestorePlan {
    jobs: Vec<MoveJob>,
}

/// Statistics from executing a restore plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    /// Files renamed to their recorded name.
    pub moved: usize,
    /// Jobs skipped because the destination already existed.
    pub skipped: usize,
}

impl RestorePlan {
    /// The planned jobs, in execution order.
    pub fn jobs(&self) -> &[MoveJob] {
        &self.jobs
    }

    /// Number of planned jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the plan contains no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Execute the plan in order.
    ///
    /// Each destination is checked immediately before its rename; a
    /// destination that exists by then is reported as a possible duplicate
    /// and the job is skipped. A failing rename aborts the remaining jobs;
    /// moves already executed stay applied.
    pub fn execute(self) -> Result<RestoreReport> {
        let mut report = RestoreReport {
            moved: 0,
            skipped: 0,
        };

        for job in self.jobs {
            if job.dst.exists() {
                warn!(
                    "Possible duplicate: {} already exists, skipping {}",
                    job.dst.display(),
                    job.src.display()
                );
                report.skipped += 1;
                continue;
            }

            std::fs::rename(&job.src, &job.dst)
                .map_err(|e| Error::rename(&job.src, &job.dst, e))?;
            info!("Moved {} -> {}", job.src.display(), job.dst.display());
            report.moved += 1;
        }

        Ok(report)
    }
}

impl Keeper {
    /// Plan a restore without changing anything on disk.
    ///
    /// A job is queued for every media file whose fingerprint is recorded
    /// under a different name; files without a record are left alone. Jobs
    /// follow the sorted file enumeration order.
    pub fn plan_restore(&self) -> Result<RestorePlan> {
        let files = self.media_files()?;
        let store = self.load_store()?;

        for name in store.duplicate_names() {
            warn!("Record maps multiple fingerprints to {}", name);
        }

        let mut jobs = Vec::new();
        for file in &files {
            let fingerprint = self.fingerprinter().fingerprint_file(file.path())?;

            let recorded = match store.get(&fingerprint) {
                Some(name) => name,
                None => {
                    debug!("No record for {}", file.name());
                    continue;
                }
            };

            if recorded == file.name() {
                debug!("{} already has its recorded name", file.name());
                continue;
            }

            // Recorded names are validated single path components, so the
            // join stays inside the managed directory.
            jobs.push(MoveJob {
                src: file.path().to_path_buf(),
                dst: self.directory().join(recorded),
            });
        }

        let mut destinations = HashSet::new();
        for job in &jobs {
            if !destinations.insert(&job.dst) {
                warn!("Multiple planned moves target {}", job.dst.display());
            }
        }

        Ok(RestorePlan { jobs })
    }

    /// Restore recorded names: plan, then execute.
    pub fn restore(&self) -> Result<RestoreReport> {
        self.plan_restore()?.execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprinter;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn rename(dir: &TempDir, from: &str, to: &str) {
        std::fs::rename(dir.path().join(from), dir.path().join(to)).unwrap();
    }

    #[test]
    fn test_restore_renames_back() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "clip_001.mkv", b"the clip");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();

        rename(&temp_dir, "clip_001.mkv", "clip_final.mkv");

        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 1,
                skipped: 0
            }
        );
        assert!(temp_dir.path().join("clip_001.mkv").exists());
        assert!(!temp_dir.path().join("clip_final.mkv").exists());
        assert_eq!(
            std::fs::read(temp_dir.path().join("clip_001.mkv")).unwrap(),
            b"the clip"
        );
    }

    #[test]
    fn test_restore_idempotent_at_fixed_point() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "clip_001.mkv", b"the clip");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();

        rename(&temp_dir, "clip_001.mkv", "clip_final.mkv");
        keeper.restore().unwrap();

        // Everything already has its recorded name; nothing to plan.
        let plan = keeper.plan_restore().unwrap();
        assert!(plan.is_empty());

        let report = keeper.restore().unwrap();
        assert_eq!(
            report,
            RestoreReport {
                moved: 0,
                skipped: 0
            }
        );
    }

    #[test]
    fn test_restore_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "a.mkv", b"recorded content");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();

        rename(&temp_dir, "a.mkv", "b.mkv");
        // An unrelated file now occupies the recorded name.
        touch(&temp_dir, "a.mkv", b"squatter");

        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 0,
                skipped: 1
            }
        );
        assert_eq!(
            std::fs::read(temp_dir.path().join("a.mkv")).unwrap(),
            b"squatter"
        );
        assert_eq!(
            std::fs::read(temp_dir.path().join("b.mkv")).unwrap(),
            b"recorded content"
        );
    }

    #[test]
    fn test_restore_leaves_unrecorded_files() {
        let temp_dir = TempDir::new().unwrap();

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();

        touch(&temp_dir, "new_arrival.mkv", b"never recorded");

        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 0,
                skipped: 0
            }
        );
        assert!(temp_dir.path().join("new_arrival.mkv").exists());

        // Restore never records.
        let store = keeper.load_store().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_planning_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "clip_001.mkv", b"the clip");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();
        rename(&temp_dir, "clip_001.mkv", "clip_final.mkv");

        let plan = keeper.plan_restore().unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.jobs()[0].src(),
            temp_dir.path().join("clip_final.mkv")
        );
        assert_eq!(plan.jobs()[0].dst(), temp_dir.path().join("clip_001.mkv"));

        // Still planned only.
        assert!(temp_dir.path().join("clip_final.mkv").exists());
        assert!(!temp_dir.path().join("clip_001.mkv").exists());

        let report = plan.execute().unwrap();
        assert_eq!(report.moved, 1);
        assert!(temp_dir.path().join("clip_001.mkv").exists());
    }

    #[test]
    fn test_restore_shared_fingerprint_moves_one() {
        let temp_dir = TempDir::new().unwrap();

        // 2 chunks of 4 bytes: both files agree on the 8-byte prefix.
        let keeper = Keeper::new(temp_dir.path())
            .unwrap()
            .with_fingerprinter(Fingerprinter::new(4, 2));

        touch(&temp_dir, "aaa.mkv", b"PREFIX__tail-one");
        touch(&temp_dir, "bbb.mkv", b"PREFIX__tail-two");
        keeper.record().unwrap();

        // Neither file carries the recorded name now.
        rename(&temp_dir, "aaa.mkv", "ccc.mkv");

        // Both bbb.mkv and ccc.mkv resolve to aaa.mkv. The first job in
        // enumeration order wins; the second finds its destination taken
        // by the move that just happened.
        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 1,
                skipped: 1
            }
        );
        assert_eq!(
            std::fs::read(temp_dir.path().join("aaa.mkv")).unwrap(),
            b"PREFIX__tail-two"
        );
        assert!(temp_dir.path().join("ccc.mkv").exists());
        assert!(!temp_dir.path().join("bbb.mkv").exists());
    }

    #[test]
    fn test_restore_duplicate_skip_when_original_present() {
        let temp_dir = TempDir::new().unwrap();

        let keeper = Keeper::new(temp_dir.path())
            .unwrap()
            .with_fingerprinter(Fingerprinter::new(4, 2));

        touch(&temp_dir, "aaa.mkv", b"PREFIX__tail-one");
        touch(&temp_dir, "bbb.mkv", b"PREFIX__tail-two");
        keeper.record().unwrap();

        // aaa.mkv already sits at the recorded name; only bbb.mkv plans a
        // move, and it collides with the existing file.
        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 0,
                skipped: 1
            }
        );
        assert!(temp_dir.path().join("aaa.mkv").exists());
        assert!(temp_dir.path().join("bbb.mkv").exists());
    }

    #[test]
    fn test_failed_rename_aborts_remaining_jobs() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "a.mkv", b"first");
        touch(&temp_dir, "b.mkv", b"second");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        keeper.record().unwrap();

        rename(&temp_dir, "a.mkv", "c.mkv");
        rename(&temp_dir, "b.mkv", "d.mkv");

        let plan = keeper.plan_restore().unwrap();
        assert_eq!(plan.len(), 2);

        // First job's source vanishes between planning and execution.
        std::fs::remove_file(temp_dir.path().join("c.mkv")).unwrap();

        let result = plan.execute();
        assert!(matches!(result, Err(Error::Rename { .. })));

        // The second job was abandoned.
        assert!(temp_dir.path().join("d.mkv").exists());
        assert!(!temp_dir.path().join("b.mkv").exists());
    }

    #[test]
    fn test_restore_without_record_file() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "clip.mkv", b"content");

        let keeper = Keeper::new(temp_dir.path()).unwrap();
        let report = keeper.restore().unwrap();

        assert_eq!(
            report,
            RestoreReport {
                moved: 0,
                skipped: 0
            }
        );
        assert!(keeper.record_path().exists());
    }
}
