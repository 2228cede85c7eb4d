//! Recovery log records.
//!
//! The log is an append-only sequence of typed records, each flushed as one
//! sync unit so a restart sees it wholly or not at all. A fresh log starts
//! with the build's version tag; everything after encodes stage progress:
//!
//! ```text
//! 's' start:u64 end:u64              one persisted profile segment
//! 'e'                                profiling finished
//! 'm' left:u64 right:u64 out:u64 size:u64   one executed merge
//! 'x' root:u64                       merging finished; root run id
//! ```
//!
//! Integers are little-endian. A log that ends inside a record, or whose
//! next byte is not one of the four tags, is corrupt; replay never repairs.

use crate::error::{Error, Result};
use crate::io::{AppendFile, SequentialFile};

/// Version tag written as the first record of a fresh log. A working
/// directory written by a different build is refused rather than misread.
pub const VERSION_TAG: &[u8] = b"20260802.0001";

const TAG_PROF_SEGMENT: u8 = b's';
const TAG_PROF_END: u8 = b'e';
const TAG_MERGE: u8 = b'm';
const TAG_MERGE_END: u8 = b'x';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalRecord {
    /// wprof persisted the run covering input bytes `[start, end]`.
    ProfSegment { start: u64, end: u64 },
    /// wprof consumed the whole input.
    ProfEnd,
    /// wmerge merged `left` and `right` into `out` (`size` bytes).
    Merge {
        left: u64,
        right: u64,
        out: u64,
        size: u64,
    },
    /// wmerge finished; `root` names the final run.
    MergeEnd { root: u64 },
}

impl WalRecord {
    /// Append the record to the log. The caller owns the sync boundary.
    pub fn encode(&self, log: &mut AppendFile) -> Result<()> {
        match *self {
            WalRecord::ProfSegment { start, end } => {
                log.write_u8(TAG_PROF_SEGMENT)?;
                log.write_u64(start)?;
                log.write_u64(end)
            }
            WalRecord::ProfEnd => log.write_u8(TAG_PROF_END),
            WalRecord::Merge {
                left,
                right,
                out,
                size,
            } => {
                log.write_u8(TAG_MERGE)?;
                log.write_u64(left)?;
                log.write_u64(right)?;
                log.write_u64(out)?;
                log.write_u64(size)
            }
            WalRecord::MergeEnd { root } => {
                log.write_u8(TAG_MERGE_END)?;
                log.write_u64(root)
            }
        }
    }

    /// Read one record. Truncation and unknown tags are log corruption.
    pub fn decode(log: &mut SequentialFile) -> Result<WalRecord> {
        let tag = log.read_u8().map_err(|e| upgrade(log, e))?;
        let record = match tag {
            TAG_PROF_SEGMENT => WalRecord::ProfSegment {
                start: log.read_u64().map_err(|e| upgrade(log, e))?,
                end: log.read_u64().map_err(|e| upgrade(log, e))?,
            },
            TAG_PROF_END => WalRecord::ProfEnd,
            TAG_MERGE => WalRecord::Merge {
                left: log.read_u64().map_err(|e| upgrade(log, e))?,
                right: log.read_u64().map_err(|e| upgrade(log, e))?,
                out: log.read_u64().map_err(|e| upgrade(log, e))?,
                size: log.read_u64().map_err(|e| upgrade(log, e))?,
            },
            TAG_MERGE_END => WalRecord::MergeEnd {
                root: log.read_u64().map_err(|e| upgrade(log, e))?,
            },
            _ => {
                return Err(Error::LogCorrupt {
                    path: log.path().to_path_buf(),
                })
            }
        };
        Ok(record)
    }
}

/// Write the version tag into a fresh log, as its own sync unit.
pub fn write_version(log: &mut AppendFile) -> Result<()> {
    log.write_cstr(VERSION_TAG)?;
    log.sync()
}

/// Read and verify the version tag of an existing log.
pub fn check_version(log: &mut SequentialFile) -> Result<()> {
    let mut tag = Vec::with_capacity(VERSION_TAG.len());
    log.read_cstr(&mut tag).map_err(|e| upgrade(log, e))?;
    if tag != VERSION_TAG {
        return Err(Error::LogCorrupt {
            path: log.path().to_path_buf(),
        });
    }
    Ok(())
}

fn upgrade(log: &SequentialFile, err: Error) -> Error {
    if err.is_premature_eof() {
        Error::LogCorrupt {
            path: log.path().to_path_buf(),
        }
    } else {
        err
    }
}
