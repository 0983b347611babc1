//! # Namekeeper Core
//!
//! A content-fingerprint-to-filename record for media directories.
//!
//! This library identifies media files by a bounded BLAKE3 fingerprint of
//! their leading bytes, persists a fingerprint-to-name mapping in a flat
//! record file next to the media, and later renames files back to their
//! recorded names no matter what an external tool renamed them to.
//!
//! ## Features
//!
//! - Bounded-prefix fingerprints: hashing cost is capped per file
//! - Flat, line-oriented record file with merge-only updates
//! - A recorded name survives any number of external renames
//! - Restore splits into a pure plan and a collision-checked execution
//! - Never overwrites: an occupied destination skips with a warning
//!
//! ## Example
//!
//! ```no_run
//! use namekeeper_core::Keeper;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Record the current names of the media files in a directory
//! let keeper = Keeper::new("/media/shows")?;
//! let summary = keeper.record()?;
//! println!("Recorded {} new files", summary.added);
//!
//! // After an external tool renamed things, put the names back
//! let report = keeper.restore()?;
//! println!("Restored {} files, skipped {}", report.moved, report.skipped);
//! # Ok(())
//! # }
//! ```

mod error;
mod fingerprint;
mod keeper;
mod record;
mod restore;

pub use error::{Error, Result};
pub use fingerprint::{
    CHUNK_SIZE, DEFAULT_MAX_CHUNKS, FINGERPRINT_SIZE, Fingerprint, Fingerprinter,
};
pub use keeper::{ALLOWED_EXTENSIONS, Keeper, MediaFile, RecordSummary};
pub use record::{LoadStats, RECORD_DELIM, RECORD_FILE, Record, RecordStore};
pub use restore::{MoveJob, RestorePlan, RestoreReport};
