//! Record-file persistence: the fingerprint-to-name mapping.
//!
//! The record file is line-oriented UTF-8 text. Each line pairs a fingerprint
//! with the filename it was first seen under:
//!
//! ```text
//! <64 hex chars>:::::<filename>
//! ```
//!
//! Lines are joined with `\n` and the file carries no trailing newline.
//! Parsing splits on the first delimiter occurrence, so filenames containing
//! the delimiter round-trip. The store keeps insertion order and never
//! overwrites an existing fingerprint.

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default name of the record file inside a managed directory.
pub const RECORD_FILE: &str = "record.txt";

/// Delimiter between fingerprint and filename in a record line.
pub const RECORD_DELIM: &str = ":::::";

/// Check that a name can serve as a recorded filename.
///
/// Rejected: empty names, `.` and `..`, names containing path separators,
/// and names containing newline or carriage return (the record format is
/// line-oriented). Anything else, including names containing the delimiter,
/// is accepted.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_filename(name, "name is empty"));
    }

    if name == "." || name == ".." {
        return Err(Error::invalid_filename(
            name,
            "name must be a real filename",
        ));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::invalid_filename(
            name,
            "name must not contain path separators",
        ));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(Error::invalid_filename(
            name,
            "name must not contain line breaks",
        ));
    }

    Ok(())
}

/// A single fingerprint-to-name record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fingerprint: Fingerprint,
    name: String,
}

impl Record {
    /// Create a record, validating the name.
    pub fn new(fingerprint: Fingerprint, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { fingerprint, name })
    }

    /// The recorded fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// The recorded filename.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serialize the record to a record line.
    pub fn to_line(&self) -> String {
        format!("{}{}{}", self.fingerprint, RECORD_DELIM, self.name)
    }

    /// Parse a record from a record line.
    ///
    /// Splits on the first delimiter; everything after it is the filename,
    /// taken verbatim. The filename must pass [`validate_name`].
    pub fn from_line(line: &str) -> Result<Self> {
        let (hex, name) = line.split_once(RECORD_DELIM).ok_or_else(|| {
            Error::malformed_record(format!("Missing {:?} delimiter: {}", RECORD_DELIM, line))
        })?;

        let fingerprint = Fingerprint::from_hex(hex)
            .map_err(|_| Error::malformed_record(format!("Invalid fingerprint: {}", hex)))?;

        Record::new(fingerprint, name)
    }
}

/// Counters from loading a record file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Well-formed lines parsed (duplicate fingerprints included).
    pub loaded: usize,
    /// Abnormal lines skipped with a warning.
    pub abnormal: usize,
}

/// In-memory fingerprint-to-name mapping backed by a record file.
///
/// Records keep their insertion order; saving writes them back in that order.
/// `add` never replaces an existing fingerprint. When the loaded file maps
/// one fingerprint on several lines, the last line wins while the entry keeps
/// its first position.
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    records: Vec<Record>,
    index: HashMap<Fingerprint, usize>,
    stats: LoadStats,
}

impl RecordStore {
    /// Load the record store at `path`.
    ///
    /// A missing file is created empty and yields an empty store. Any other
    /// read failure is an error; an unreadable record file is never replaced.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Creating empty record file at {}", path.display());
                std::fs::File::create(&path).map_err(|e| Error::load_record(&path, e))?;
                String::new()
            }
            Err(e) => return Err(Error::load_record(&path, e)),
        };

        let mut store = Self {
            path,
            records: Vec::new(),
            index: HashMap::new(),
            stats: LoadStats::default(),
        };

        for line in content.lines() {
            if line.is_empty() {
                continue;
            }

            match Record::from_line(line) {
                Ok(record) => {
                    store.set(record);
                    store.stats.loaded += 1;
                }
                Err(e) => {
                    warn!("Skipping abnormal record line: {}", e);
                    store.stats.abnormal += 1;
                }
            }
        }

        Ok(store)
    }

    /// Insert or replace, keeping the first position on replacement.
    fn set(&mut self, record: Record) {
        match self.index.get(&record.fingerprint) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.fingerprint, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Add a record unless the fingerprint is already present.
    ///
    /// Returns whether the record was inserted. The name is validated either
    /// way; an existing fingerprint keeps its original name.
    pub fn add(&mut self, fingerprint: Fingerprint, name: impl Into<String>) -> Result<bool> {
        let record = Record::new(fingerprint, name)?;

        if self.index.contains_key(&record.fingerprint) {
            return Ok(false);
        }

        self.index.insert(record.fingerprint, self.records.len());
        self.records.push(record);
        Ok(true)
    }

    /// Look up the recorded name for a fingerprint.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.index
            .get(fingerprint)
            .map(|&i| self.records[i].name.as_str())
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the backing record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Counters from the load that produced this store.
    pub fn load_stats(&self) -> LoadStats {
        self.stats
    }

    /// Names recorded under more than one fingerprint, in first-seen order.
    ///
    /// Such names cannot all be restored; every file past the first finds
    /// its destination occupied.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.name.as_str()).or_insert(0) += 1;
        }

        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.name.as_str())
            .filter(|name| counts[name] > 1 && seen.insert(*name))
            .collect()
    }

    /// Persist all records, atomically replacing the record file.
    ///
    /// Records are written in insertion order, one line each, with no
    /// trailing newline.
    pub fn save(&self) -> Result<()> {
        let content = self
            .records
            .iter()
            .map(Record::to_line)
            .collect::<Vec<_>>()
            .join("\n");

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        // Write atomically using tempfile
        let mut temp_file =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::save_record(&self.path, e))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| Error::save_record(&self.path, e))?;
        temp_file
            .flush()
            .map_err(|e| Error::save_record(&self.path, e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| Error::save_record(&self.path, e.error))?;

        info!(
            "Saved {} records to {}",
            self.records.len(),
            self.path.display()
        );
        Ok(())
    }
}
