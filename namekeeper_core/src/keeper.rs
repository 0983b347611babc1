//! The keeper: a managed media directory and its record operations.
//!
//! A [`Keeper`] is scoped to one directory. It enumerates the recognized
//! media files directly inside it, fingerprints them, and merges new
//! fingerprint-to-name pairs into the directory's record file. Restore
//! planning and execution live in the `restore` module.

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprinter;
use crate::record::{RECORD_FILE, RecordStore, validate_name};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// File extensions treated as media files. The match is case-sensitive.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["mkv", "mp4", "avi", "wmv"];

/// A recognized media file directly inside the managed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    path: PathBuf,
    name: String,
}

impl MediaFile {
    /// Full path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename (UTF-8, guaranteed recordable).
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Statistics from a record run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSummary {
    /// Media files scanned.
    pub scanned: usize,
    /// New records added by this run.
    pub added: usize,
    /// Total records after saving.
    pub total: usize,
}

/// A managed media directory.
#[derive(Debug)]
pub struct Keeper {
    directory: PathBuf,
    record_file: String,
    fingerprinter: Fingerprinter,
}

impl Keeper {
    /// Create a keeper for an existing directory.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();

        if !directory.is_dir() {
            return Err(Error::not_a_directory(&directory));
        }

        Ok(Self {
            directory,
            record_file: RECORD_FILE.to_string(),
            fingerprinter: Fingerprinter::default(),
        })
    }

    /// Use a record file name other than the default.
    pub fn with_record_file(mut self, name: impl Into<String>) -> Self {
        self.record_file = name.into();
        self
    }

    /// Use a custom fingerprinter.
    pub fn with_fingerprinter(mut self, fingerprinter: Fingerprinter) -> Self {
        self.fingerprinter = fingerprinter;
        self
    }

    /// The directory this keeper manages.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the record file inside the managed directory.
    pub fn record_path(&self) -> PathBuf {
        self.directory.join(&self.record_file)
    }

    /// The fingerprinter applied to every media file.
    pub fn fingerprinter(&self) -> &Fingerprinter {
        &self.fingerprinter
    }

    /// Load the directory's record store, creating an empty one if missing.
    pub fn load_store(&self) -> Result<RecordStore> {
        RecordStore::load(self.record_path())
    }

    /// Enumerate the media files directly inside the directory.
    ///
    /// Only plain files whose extension is in [`ALLOWED_EXTENSIONS`] are
    /// returned, sorted by filename. Symlinks are never followed, so a link
    /// to a media file is excluded. Hidden files and subdirectories are
    /// skipped silently; files whose names cannot be recorded (non-UTF-8,
    /// containing line breaks or path separators) are skipped with a
    /// warning.
    pub fn media_files(&self) -> Result<Vec<MediaFile>> {
        let walker = ignore::WalkBuilder::new(&self.directory)
            .max_depth(Some(1)) // Only immediate children
            .standard_filters(false) // Media directories are not source trees
            .hidden(true) // Still skip dotfiles
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let entry_path = entry.path();

            // Skip the directory itself
            if entry.depth() == 0 {
                continue;
            }

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let recognized = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext));
            if !recognized {
                continue;
            }

            let name = match entry_path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => {
                    warn!(
                        "Skipping file with a non-UTF-8 name: {}",
                        entry_path.display()
                    );
                    continue;
                }
            };

            if let Err(e) = validate_name(&name) {
                warn!("Skipping {}: {}", entry_path.display(), e);
                continue;
            }

            files.push(MediaFile {
                path: entry_path.to_path_buf(),
                name,
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Record the current files: fingerprint each media file and merge the
    /// pairs into the record file.
    ///
    /// Fingerprints already present keep their recorded name. The store is
    /// saved even when nothing was added, so a missing record file always
    /// comes into existence.
    pub fn record(&self) -> Result<RecordSummary> {
        let files = self.media_files()?;
        let mut store = self.load_store()?;

        let mut added = 0;
        for file in &files {
            let fingerprint = self.fingerprinter.fingerprint_file(file.path())?;

            if store.add(fingerprint, file.name())? {
                debug!("Recorded {} as {}", fingerprint, file.name());
                added += 1;
            } else {
                debug!("Fingerprint already recorded for {}", file.name());
            }
        }

        store.save()?;

        Ok(RecordSummary {
            scanned: files.len(),
            added,
            total: store.len(),
        })
    }
}
